use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};

use crate::{
    config::GeminiConfig,
    error::{AvatarError, Result},
    models::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse},
};

/// Transport for a single `generateContent` exchange.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AvatarError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn build_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        let mut key = header::HeaderValue::from_str(&self.api_key)
            .map_err(|_| AvatarError::ConfigError("API key is not a valid header value".into()))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }
}

#[async_trait]
impl ContentBackend for HttpBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .headers(self.build_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| AvatarError::RequestError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AvatarError::ResponseError(e.to_string()))?;

        if !status.is_success() {
            log::debug!("Gemini returned {}: {}", status, body);
            return Err(AvatarError::ApiError {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| AvatarError::ResponseError(e.to_string()))
    }
}

/// Upstream error message from an error body, or the raw body when it is not the usual envelope.
pub(crate) fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => body.trim().to_string(),
    }
}
