use crate::{
    error::{AvatarError, Result},
    gemini::ImageClient,
    logger,
    models::{ImageFile, ImageGenerationRequest, PartOrder},
};

const MISSING_INPUT: &str = "Please upload an image and provide an editing instruction.";

#[derive(Clone)]
pub struct ImageEditor {
    client: ImageClient,
}

impl ImageEditor {
    pub fn new(client: ImageClient) -> Self {
        Self { client }
    }

    /// Applies `instruction` to `image` and returns the edited image as a data URI.
    ///
    /// Fails without calling the API when the image or the instruction is missing.
    pub async fn edit(&self, image: Option<&ImageFile>, instruction: &str) -> Result<String> {
        let image = match image {
            Some(image) if !image.base64.is_empty() => image,
            _ => return Err(AvatarError::ValidationError(MISSING_INPUT.into())),
        };
        if instruction.trim().is_empty() {
            return Err(AvatarError::ValidationError(MISSING_INPUT.into()));
        }

        let _timer = logger::timer(&format!("edit {}", image.name));
        log::info!("Editing {} ({})", image.name, image.mime_type);

        let request = ImageGenerationRequest::new(instruction)
            .with_images(vec![image.clone()])
            .with_order(PartOrder::ImagesFirst);

        let response = self.client.generate(request).await.map_err(|e| match e {
            AvatarError::NoImageGenerated => AvatarError::NoEditedImage,
            other => other,
        })?;
        Ok(response.data_uri())
    }
}
