pub mod backend;
pub mod image_client;

#[cfg(test)]
pub(crate) mod stub;

use std::sync::Arc;

use crate::{
    config::Config,
    editor::ImageEditor,
    error::Result,
    generator::AvatarGenerator,
    models::{AvatarResult, GenerationParams, ImageFile},
    prompt::PromptTemplate,
};

pub use backend::{ContentBackend, HttpBackend};
pub use image_client::ImageClient;

/// Entry point wiring one backend into the image client and both workflows.
#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
    generator: AvatarGenerator,
    editor: ImageEditor,
}

impl GeminiClient {
    /// Builds an HTTP-backed client. Fails when no API key is configured.
    pub fn new(config: Config) -> Result<Self> {
        let backend = HttpBackend::new(&config.gemini)?;
        log::debug!("Gemini client ready for model {}", config.gemini.model);
        Ok(Self::with_backend(Arc::new(backend), config))
    }

    /// Builds a client on top of any backend, e.g. a stub in tests.
    pub fn with_backend(backend: Arc<dyn ContentBackend>, config: Config) -> Self {
        let image_client = ImageClient::new(backend, config.gemini.model.clone());
        let generator = AvatarGenerator::new(image_client.clone())
            .with_max_concurrency(config.max_concurrency);
        let editor = ImageEditor::new(image_client.clone());

        Self {
            image_client,
            generator,
            editor,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.generator = self.generator.with_template(template);
        self
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn generator(&self) -> &AvatarGenerator {
        &self.generator
    }

    pub fn editor(&self) -> &ImageEditor {
        &self.editor
    }

    pub async fn generate_avatars(&self, params: &GenerationParams) -> Result<Vec<AvatarResult>> {
        self.generator.generate(params).await
    }

    pub async fn edit_image(&self, image: Option<&ImageFile>, instruction: &str) -> Result<String> {
        self.editor.edit(image, instruction).await
    }
}
