use std::sync::Arc;

use super::backend::ContentBackend;
use crate::{
    config::DEFAULT_MODEL,
    error::{AvatarError, Result},
    models::{
        Content, GenerateContentRequest, GenerationConfig, ImageGenerationRequest,
        ImageGenerationResponse, Modality, Part, PartOrder,
    },
};

/// One prompt plus reference images in, exactly one image out.
#[derive(Clone)]
pub struct ImageClient {
    backend: Arc<dyn ContentBackend>,
    model: String,
}

impl ImageClient {
    pub fn new(backend: Arc<dyn ContentBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            (DEFAULT_MODEL, "Gemini 2.5 Flash Image", "Google"),
            (
                "gemini-2.5-flash-image-preview",
                "Gemini 2.5 Flash Image (preview)",
                "Google",
            ),
        ]
    }

    /// All parts go into one request so the model conditions on them jointly.
    pub fn build_request(request: &ImageGenerationRequest) -> GenerateContentRequest {
        let prompt = Part::text(request.prompt.clone());
        let images = request
            .images
            .iter()
            .map(|img| Part::inline(img.mime_type.clone(), img.base64.clone()));

        let parts: Vec<Part> = match request.order {
            PartOrder::PromptFirst => std::iter::once(prompt).chain(images).collect(),
            PartOrder::ImagesFirst => images.chain(std::iter::once(prompt)).collect(),
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec![Modality::Image],
            },
        }
    }

    pub async fn generate(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        let payload = Self::build_request(&request);

        log::debug!(
            "Requesting image from {} ({} reference image(s), prompt {} chars)",
            self.model,
            request.images.len(),
            request.prompt.len()
        );

        let response = self.backend.generate_content(&self.model, &payload).await?;

        let inline = response.first_inline_image().ok_or_else(|| {
            log::warn!("{} returned no inline image", self.model);
            AvatarError::NoImageGenerated
        })?;

        log::debug!(
            "Received {} image ({} base64 chars)",
            inline.mime_type,
            inline.data.len()
        );

        Ok(ImageGenerationResponse {
            image_data: inline.data.clone(),
            mime_type: inline.mime_type.clone(),
            model: self.model.clone(),
        })
    }
}
