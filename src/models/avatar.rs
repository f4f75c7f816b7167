use serde::{Deserialize, Serialize};

use super::common::ImageFile;
use crate::error::{AvatarError, Result};

/// Upload limit for reference images.
pub const MAX_EXAMPLE_IMAGES: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub user_name: String,
    pub dark_light: String,
    pub ideas: String,
    #[serde(default)]
    pub example_images: Vec<ImageFile>,
    pub quantity: usize,
    pub include_username: bool,
    #[serde(default)]
    pub text_languages: Vec<String>,
}

impl GenerationParams {
    pub fn validate(&self) -> Result<()> {
        if self.quantity < 1 {
            return Err(AvatarError::ValidationError(
                "Number of avatars must be at least 1.".into(),
            ));
        }
        if self.example_images.len() > MAX_EXAMPLE_IMAGES {
            return Err(AvatarError::ValidationError(format!(
                "At most {} example images can be attached, got {}.",
                MAX_EXAMPLE_IMAGES,
                self.example_images.len()
            )));
        }
        Ok(())
    }
}

/// One avatar slot. `with_username` is `None` iff the request did not ask for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResult {
    pub with_username: Option<String>,
    pub without_username: String,
}
