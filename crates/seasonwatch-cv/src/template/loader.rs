//! Template loading and the shared decoded-image cache.

use super::Template;
use dashmap::DashMap;
use image::GrayImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Failure to produce a usable reference template.
///
/// Any of these is a configuration error surfaced at detector construction:
/// initialization aborts and nothing retries the load.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to decode template {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("template {0} decoded to an empty image")]
    Empty(PathBuf),
}

/// Keyed arena of decoded grayscale templates.
///
/// Loading is insert-if-absent: the first decode for a path wins and every
/// later lookup shares the same immutable image. The store may be reached
/// from more than one detector construction path, so the cache is a
/// concurrent map.
#[derive(Debug, Default)]
pub struct TemplateStore {
    cache: DashMap<PathBuf, Arc<GrayImage>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a template by path, hitting the cache when possible.
    ///
    /// The template is named after the file stem.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Template, TemplateError> {
        let path = path.as_ref();
        let name = template_name(path);

        if let Some(cached) = self.cache.get(path) {
            return Ok(Template::from_shared(name, Arc::clone(cached.value())));
        }

        let decoded = decode_gray(path)?;
        let shared = self
            .cache
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(decoded))
            .value()
            .clone();

        Ok(Template::from_shared(name, shared))
    }

    /// Number of distinct templates held by the store.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn template_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn decode_gray(path: &Path) -> Result<GrayImage, TemplateError> {
    if !path.exists() {
        return Err(TemplateError::NotFound(path.to_path_buf()));
    }

    let gray = image::open(path)
        .map_err(|source| TemplateError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();

    if gray.width() == 0 || gray.height() == 0 {
        return Err(TemplateError::Empty(path.to_path_buf()));
    }

    Ok(gray)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_construction_error() {
        let store = TemplateStore::new();
        let err = store.load("/nonexistent/tpl_confirm.png").unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
        assert!(store.is_empty());
    }
}
