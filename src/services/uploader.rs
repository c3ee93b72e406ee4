//! Collaborator seams of the upload session.
//!
//! The session never talks to YouTube, a terminal or the filesystem for
//! templates directly. It is handed:
//! - an [`Uploader`] that performs the actual upload,
//! - a [`Confirmer`] asked before each upload in interactive mode,
//! - a [`TemplateLoader`] that supplies the description template text.

use crate::models::{UploadError, UploadItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use camino::Utf8Path;
use std::fs;

/// Uploads one video and returns its YouTube video id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, item: &UploadItem) -> Result<String, UploadError>;
}

/// Operator decision for one item in interactive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Proceed,
    Skip,
    Abort,
}

/// Asks the operator whether to upload an item.
///
/// Implementations may take as long as they like; the session keeps watching
/// for run cancellation while waiting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, item: &UploadItem) -> Confirmation;
}

/// Supplies the raw description template for a path.
pub trait TemplateLoader: Send + Sync {
    fn load(&self, path: &Utf8Path) -> Result<String>;
}

/// Reads templates from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplateLoader;

impl TemplateLoader for FsTemplateLoader {
    fn load(&self, path: &Utf8Path) -> Result<String> {
        let template = fs::read_to_string(path)
            .with_context(|| format!("Failed to read description template: {}", path))?;
        tracing::debug!("Loaded description template from {} ({} bytes)", path, template.len());
        Ok(template)
    }
}

/// Returns the same template text regardless of path.
#[derive(Debug, Clone, Default)]
pub struct InlineTemplate(pub String);

impl InlineTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }
}

impl TemplateLoader for InlineTemplate {
    fn load(&self, _path: &Utf8Path) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_fs_template_loader() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("description.txt")).unwrap();
        fs::write(&path, "Subscribe for more!\n").unwrap();

        assert_eq!(FsTemplateLoader.load(&path).unwrap(), "Subscribe for more!\n");

        let err = FsTemplateLoader.load(&path.with_file_name("missing.txt")).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_inline_template() {
        let loader = InlineTemplate::new("fixed");
        assert_eq!(loader.load(Utf8Path::new("anything.txt")).unwrap(), "fixed");
    }
}
