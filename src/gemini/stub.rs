use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use super::backend::ContentBackend;
use crate::{
    error::{AvatarError, Result},
    models::{Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part},
};

type Reply = Box<dyn Fn(usize, &GenerateContentRequest) -> (Duration, Result<GenerateContentResponse>) + Send + Sync>;

/// In-memory backend. The reply closure gets the zero-based call number and the request.
pub(crate) struct StubBackend {
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateContentRequest>>,
    reply: Reply,
}

impl StubBackend {
    pub fn new(
        reply: impl Fn(usize, &GenerateContentRequest) -> (Duration, Result<GenerateContentResponse>)
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        }
    }

    pub fn fixed_image(mime_type: &'static str, data: &'static str) -> Self {
        Self::new(move |_, _| (Duration::ZERO, Ok(image_response(mime_type, data))))
    }

    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_, _| (Duration::ZERO, Err(AvatarError::RequestError(message.into()))))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentBackend for StubBackend {
    async fn generate_content(
        &self,
        _model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let (delay, reply) = (self.reply)(n, request);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

pub(crate) fn image_response(mime_type: &str, data: &str) -> GenerateContentResponse {
    response_with_parts(vec![Part::inline(mime_type, data)])
}

pub(crate) fn response_with_parts(parts: Vec<Part>) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".into()),
                parts,
            }),
            finish_reason: Some("STOP".into()),
        }],
    }
}

/// Text of the first text part of a recorded request.
pub(crate) fn prompt_of(request: &GenerateContentRequest) -> String {
    request
        .contents
        .iter()
        .flat_map(|c| c.parts.iter())
        .find_map(|p| match p {
            Part::Text { text } => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_default()
}
