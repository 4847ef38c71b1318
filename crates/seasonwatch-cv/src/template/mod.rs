//! Reference templates and the correlation matcher.

pub mod loader;
pub mod matcher;

pub use loader::{TemplateError, TemplateStore};
pub use matcher::{match_score, UNMATCHABLE};

use image::GrayImage;
use std::sync::Arc;

/// A named single-channel reference image.
///
/// Immutable once built; clones share the underlying pixels.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: Arc<GrayImage>,
}

impl Template {
    pub fn new(name: impl Into<String>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            image: Arc::new(image),
        }
    }

    pub(crate) fn from_shared(name: impl Into<String>, image: Arc<GrayImage>) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
