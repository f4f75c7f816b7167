use serde::{Deserialize, Serialize};

use super::common::{DataUri, ImageFile};

/// Where the text part goes relative to the attached images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOrder {
    #[default]
    PromptFirst,
    ImagesFirst,
}

#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub images: Vec<ImageFile>,
    pub order: PartOrder,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
            order: PartOrder::PromptFirst,
        }
    }

    pub fn with_images(mut self, images: Vec<ImageFile>) -> Self {
        self.images = images;
        self
    }

    pub fn with_order(mut self, order: PartOrder) -> Self {
        self.order = order;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationResponse {
    pub image_data: String, // Base64 encoded
    pub mime_type: String,
    pub model: String,
}

impl ImageGenerationResponse {
    pub fn data_uri(&self) -> String {
        DataUri::new(&self.mime_type, &self.image_data).to_string()
    }
}
