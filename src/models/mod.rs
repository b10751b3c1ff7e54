pub mod content;
pub mod gemini;
pub mod image;
pub mod relay;

pub use content::*;
pub use image::*;
pub use relay::*;
