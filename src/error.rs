use thiserror::Error;

/// Shown when an error carries no usable message.
pub const FALLBACK_MESSAGE: &str = "An unknown error occurred.";
/// Fallback for the editing flow.
pub const EDIT_FALLBACK_MESSAGE: &str = "An unknown error occurred during editing.";

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("No image generated from API")]
    NoImageGenerated,
    #[error("No edited image generated from API.")]
    NoEditedImage,
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Decode error: {0}")]
    DecodeError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed user input, raised before any network call.
    Validation,
    /// The upstream call succeeded but produced no image.
    EmptyResult,
    /// Anything else from the call stack.
    Transport,
}

impl AvatarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AvatarError::ValidationError(_) | AvatarError::DecodeError(_) => ErrorKind::Validation,
            AvatarError::NoImageGenerated | AvatarError::NoEditedImage => ErrorKind::EmptyResult,
            _ => ErrorKind::Transport,
        }
    }

    /// Single user-visible message for this error.
    pub fn user_message(&self) -> String {
        self.user_message_or(FALLBACK_MESSAGE)
    }

    /// Like [`user_message`](Self::user_message), with a caller-chosen fallback.
    pub fn user_message_or(&self, fallback: &str) -> String {
        let detail = match self {
            AvatarError::ConfigError(msg)
            | AvatarError::ValidationError(msg)
            | AvatarError::RequestError(msg)
            | AvatarError::ResponseError(msg)
            | AvatarError::SerializationError(msg)
            | AvatarError::DecodeError(msg)
            | AvatarError::InternalError(msg) => msg.as_str(),
            AvatarError::ApiError { message, .. } => message.as_str(),
            AvatarError::NoImageGenerated | AvatarError::NoEditedImage | AvatarError::Io(_) => "",
        };

        match self {
            AvatarError::NoImageGenerated | AvatarError::NoEditedImage | AvatarError::Io(_) => {
                self.to_string()
            }
            _ if detail.trim().is_empty() => fallback.to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for AvatarError {
    fn from(e: serde_json::Error) -> Self {
        AvatarError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AvatarError>;
