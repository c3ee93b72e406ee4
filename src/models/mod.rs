//! Data models for ytbulk.
//!
//! - [`RunConfig`]: validated, immutable snapshot of one run's settings, built via [`RunConfigBuilder`]
//! - [`UploadSettings`]: the persisted settings document (`ytbulk.yaml`) the builder is fed from
//! - [`RuleSet`]: ordered literal find/replace rules for titles, descriptions and thumbnail names
//! - [`DiscoveredFile`], [`UploadItem`], [`UploadOutcome`], [`RunSummary`]: per-run upload data
//! - [`UploadError`]: failure reported by an uploader, recorded in [`UploadOutcome::Failed`]
//! - [`ProgressEvent`] and [`Severity`]: what the upload worker reports to observers
//!
//! Nothing here is shared between runs. A `RunConfig` is owned by exactly one
//! [`UploadSession`](crate::services::UploadSession); items and outcomes live
//! only as long as that session.

pub mod config;
pub mod event;
pub mod rules;
pub mod run_config;
pub mod upload;

pub use config::{UploadSettings, split_list};
pub use event::{ProgressEvent, Severity};
pub use rules::{Rule, RuleSet};
pub use run_config::{ConfigError, RunConfig, RunConfigBuilder, normalize_extension};
pub use upload::{
    DiscoveredFile, ItemResult, RunSummary, SkipReason, UploadError, UploadErrorKind, UploadItem,
    UploadOutcome,
};
