//! Seasonwatch Computer Vision Library
//!
//! Region-gated template matching for recognizing fixed UI signs in captured
//! screen frames.

pub mod detection;
pub mod rect;
pub mod template;

// Re-export commonly used types
pub use detection::{Detection, GateConfig, GateSpec, SignConfig, SignDetector};
pub use rect::{NormalizedRect, PixelRect};
pub use template::{Template, TemplateError, TemplateStore};
