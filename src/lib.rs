// ytbulk - bulk YouTube upload orchestration
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides the command line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::RunMetrics;
pub use models::{ProgressEvent, RunConfig, RunSummary, Severity, UploadSettings};
pub use services::{RunError, RunHandle, UploadSession};
pub use ui::{ProgressReceiver, ProgressSender, progress_channel};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
