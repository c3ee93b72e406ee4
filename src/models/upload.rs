use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use thiserror::Error;

/// A media file found in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: Utf8PathBuf,

    /// File name without its final extension (`my_song` for `my_song.mp4`)
    pub base_name: String,
}

impl DiscoveredFile {
    /// Build from a path, deriving the base name from the file stem.
    ///
    /// Returns `None` for paths without a file name.
    pub fn from_path(path: impl Into<Utf8PathBuf>) -> Option<Self> {
        let path = path.into();
        let base_name = path.file_stem()?.to_string();
        Some(Self { path, base_name })
    }

    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.base_name.as_str())
    }
}

/// Everything the uploader needs for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub file: DiscoveredFile,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<Utf8PathBuf>,
    pub category_id: String,
    pub keywords: Vec<String>,
}

impl UploadItem {
    pub fn video_path(&self) -> &Utf8Path {
        &self.file.path
    }
}

/// Why an item was not uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DryRun,
    OperatorDeclined,
    RunAborted,
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::DryRun => "dry run",
            SkipReason::OperatorDeclined => "operator declined",
            SkipReason::RunAborted => "run aborted",
            SkipReason::Cancelled => "cancelled",
        };
        f.write_str(reason)
    }
}

/// Whether retrying the upload later could succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    Transient,
    Permanent,
}

impl fmt::Display for UploadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadErrorKind::Transient => f.write_str("transient"),
            UploadErrorKind::Permanent => f.write_str("permanent"),
        }
    }
}

/// Failure reported by an [`Uploader`](crate::services::Uploader).
///
/// The session records both kinds as a failed item and moves on; retrying is
/// the uploader's business.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} upload failure: {message}")]
pub struct UploadError {
    pub kind: UploadErrorKind,
    pub message: String,
}

impl UploadError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: UploadErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: UploadErrorKind::Permanent,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == UploadErrorKind::Transient
    }
}

/// Final result for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Uploaded; carries the video id reported by the uploader
    Uploaded(String),
    Skipped(SkipReason),
    Failed(UploadError),
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, UploadOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UploadOutcome::Failed(_))
    }

    pub fn video_id(&self) -> Option<&str> {
        match self {
            UploadOutcome::Uploaded(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Uploaded(id) => write!(f, "uploaded ({})", id),
            UploadOutcome::Skipped(reason) => write!(f, "skipped ({})", reason),
            UploadOutcome::Failed(err) => write!(f, "failed ({})", err),
        }
    }
}

/// Outcome paired with the file it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub file: DiscoveredFile,
    pub outcome: UploadOutcome,
}

/// Result of a whole run, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub uploaded_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    pub outcomes: Vec<ItemResult>,
}

impl RunSummary {
    pub fn from_results(outcomes: Vec<ItemResult>) -> Self {
        let mut summary = Self::default();
        for result in &outcomes {
            match result.outcome {
                UploadOutcome::Uploaded(_) => summary.uploaded_count += 1,
                UploadOutcome::Skipped(_) => summary.skipped_count += 1,
                UploadOutcome::Failed(_) => summary.failed_count += 1,
            }
        }
        summary.outcomes = outcomes;
        summary
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// True when no item failed. Skipped items do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failed_count == 0
    }

    pub fn uploaded_video_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|r| r.outcome.video_id())
            .collect()
    }

    /// Count of items skipped for a specific reason.
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.outcomes
            .iter()
            .filter(|r| r.outcome == UploadOutcome::Skipped(reason))
            .count()
    }

    /// One-line summary for status bars and completion dialogs.
    pub fn summary(&self) -> String {
        if self.outcomes.is_empty() {
            return "No videos to upload".to_string();
        }

        let mut parts = vec![format!("Videos uploaded: {}", self.uploaded_count)];
        if self.skipped_count > 0 {
            parts.push(format!("{} skipped", self.skipped_count));
        }
        if self.failed_count > 0 {
            parts.push(format!("{} failed", self.failed_count));
        }
        parts.join(", ")
    }
}
