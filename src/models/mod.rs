pub mod avatar;
pub mod common;
pub mod image;
pub mod wire;

pub use avatar::*;
pub use common::*;
pub use image::*;
pub use wire::*;
