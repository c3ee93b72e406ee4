use crate::state::ItemPhase;
use camino::Utf8PathBuf;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity of a progress event, ordered from least to most severe.
///
/// Also used as the run's minimum log level: events below it are never
/// emitted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl Severity {
    /// Directive for `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error => "error",
        }
    }

    pub fn level(&self) -> tracing::Level {
        match self {
            Severity::Debug => tracing::Level::DEBUG,
            Severity::Info => tracing::Level::INFO,
            Severity::Warning => tracing::Level::WARN,
            Severity::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level {0:?} (expected debug, info, warning or error)")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// A structured log/progress record flowing from the upload worker to an
/// observer.
///
/// Events are created once and never modified; the observer decides how long
/// to keep them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub severity: Severity,
    pub timestamp: DateTime<Local>,
    pub message: String,

    /// Media file the event refers to, if any
    pub path: Option<Utf8PathBuf>,

    /// Phase the item entered, for per-item state changes
    pub phase: Option<ItemPhase>,

    /// `(position, total)` with a 1-based position; `(0, total)` at run start
    pub progress: Option<(usize, usize)>,
}

impl ProgressEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            timestamp: Local::now(),
            message: message.into(),
            path: None,
            phase: None,
            progress: None,
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_phase(mut self, phase: ItemPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_progress(mut self, position: usize, total: usize) -> Self {
        self.progress = Some((position, total));
        self
    }
}

/// Renders as `2024-05-01 12:00:00 - INFO - message`.
impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.severity,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_severity_parsing() {
        assert_eq!("warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("WARN".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!(" Debug ".parse::<Severity>(), Ok(Severity::Debug));
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_filter_directive() {
        assert_eq!(Severity::Warning.as_filter(), "warn");
        assert_eq!(Severity::Error.level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_event_display() {
        let event = ProgressEvent::warning("No thumbnail found").with_path("/videos/a.mp4");
        let rendered = event.to_string();

        assert!(rendered.ends_with(" - WARNING - No thumbnail found"));
        assert_eq!(event.path.as_deref(), Some(camino::Utf8Path::new("/videos/a.mp4")));
    }
}
