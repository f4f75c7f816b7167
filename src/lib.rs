//! Avatar generation and single-image editing on top of the Gemini image API.
//!
//! ```no_run
//! use avatargen::{Config, GeminiClient, GenerationParams};
//!
//! # async fn run() -> avatargen::Result<()> {
//! let client = GeminiClient::new(Config::from_env())?;
//! let avatars = client
//!     .generate_avatars(&GenerationParams {
//!         user_name: "cheevh".into(),
//!         dark_light: "dark, minimal".into(),
//!         ideas: "electronics, networking".into(),
//!         example_images: Vec::new(),
//!         quantity: 2,
//!         include_username: true,
//!         text_languages: vec!["en".into()],
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod ingest;
pub mod logger;
pub mod models;
pub mod prompt;

pub use config::{Config, GeminiConfig};
pub use editor::ImageEditor;
pub use error::{AvatarError, ErrorKind, Result};
pub use gemini::{ContentBackend, GeminiClient, HttpBackend, ImageClient};
pub use generator::AvatarGenerator;
pub use models::*;
pub use prompt::{PromptPair, PromptTemplate};
