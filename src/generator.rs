use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};
use uuid::Uuid;

use crate::{
    error::{AvatarError, Result},
    gemini::ImageClient,
    logger,
    models::{AvatarResult, GenerationParams, ImageGenerationRequest},
    prompt::PromptTemplate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    WithUsername,
    WithoutUsername,
}

/// Flat task list for a batch. Slot `i`'s with-username task, when present, immediately precedes
/// its without-username task.
pub fn task_plan(quantity: usize, include_username: bool) -> Vec<Variant> {
    let mut plan = Vec::with_capacity(if include_username { quantity * 2 } else { quantity });
    for _ in 0..quantity {
        if include_username {
            plan.push(Variant::WithUsername);
        }
        plan.push(Variant::WithoutUsername);
    }
    plan
}

/// Runs `tasks` concurrently, at most `limit` at a time (all at once when `None`), and returns
/// their outputs in task order. Returns the first error as soon as it happens; outputs of the
/// other tasks are dropped.
pub async fn fan_out<T, Fut>(tasks: Vec<Fut>, limit: Option<usize>) -> Result<Vec<T>>
where
    Fut: Future<Output = Result<T>>,
{
    let total = tasks.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    let limit = limit.unwrap_or(total).clamp(1, total);

    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let in_flight = stream::iter(
        tasks
            .into_iter()
            .enumerate()
            .map(|(index, task)| async move { task.await.map(|value| (index, value)) }),
    )
    .buffer_unordered(limit);
    futures::pin_mut!(in_flight);

    while let Some((index, value)) = in_flight.try_next().await? {
        slots[index] = Some(value);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| {
                AvatarError::InternalError(format!("task {} finished without a result", index))
            })
        })
        .collect()
}

/// Regroups the flat image list into avatar slots by walking `plan` in the order it was built.
pub fn pair_results(images: Vec<String>, plan: &[Variant]) -> Result<Vec<AvatarResult>> {
    if images.len() != plan.len() {
        return Err(AvatarError::InternalError(format!(
            "expected {} images, got {}",
            plan.len(),
            images.len()
        )));
    }

    let mut results = Vec::new();
    let mut with_username = None;
    for (variant, image) in plan.iter().zip(images) {
        match variant {
            Variant::WithUsername => with_username = Some(image),
            Variant::WithoutUsername => results.push(AvatarResult {
                with_username: with_username.take(),
                without_username: image,
            }),
        }
    }
    Ok(results)
}

#[derive(Clone)]
pub struct AvatarGenerator {
    client: ImageClient,
    template: PromptTemplate,
    max_concurrency: Option<usize>,
}

impl AvatarGenerator {
    pub fn new(client: ImageClient) -> Self {
        Self {
            client,
            template: PromptTemplate::default(),
            max_concurrency: None,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit;
        self
    }

    /// Generates `quantity` avatars. Either every image call succeeds or the whole batch fails.
    pub async fn generate(&self, params: &GenerationParams) -> Result<Vec<AvatarResult>> {
        params.validate()?;

        let batch_id = Uuid::new_v4().to_string();
        let _timer = logger::timer(&format!("avatar batch {}", batch_id));

        let prompts = self.template.render_pair(
            &params.user_name,
            &params.dark_light,
            &params.ideas,
            &params.text_languages,
        );
        let plan = task_plan(params.quantity, params.include_username);

        log::info!(
            "[batch {}] dispatching {} image request(s) for {} avatar(s), {} reference image(s)",
            batch_id,
            plan.len(),
            params.quantity,
            params.example_images.len()
        );

        let tasks: Vec<_> = plan
            .iter()
            .map(|variant| {
                let prompt = match variant {
                    Variant::WithUsername => &prompts.with_username,
                    Variant::WithoutUsername => &prompts.without_username,
                };
                let request = ImageGenerationRequest::new(prompt.clone())
                    .with_images(params.example_images.clone());
                let client = &self.client;
                async move { client.generate(request).await.map(|r| r.data_uri()) }
            })
            .collect();

        let images = fan_out(tasks, self.max_concurrency).await.map_err(|e| {
            log::error!("[batch {}] failed: {}", batch_id, e);
            e
        })?;

        let results = pair_results(images, &plan)?;
        log::info!("[batch {}] generated {} avatar(s)", batch_id, results.len());
        Ok(results)
    }
}
