// Console observer and terminal confirmer
//
// Renders progress events and the final summary on stdout, and asks the
// operator about each upload when the run is interactive.

use crate::models::{ProgressEvent, RunSummary, Severity, UploadItem, UploadOutcome};
use crate::services::{Confirmation, Confirmer};
use async_trait::async_trait;
use colored::Colorize;
use dialoguer::Select;

/// Menu entries, in the order of [`choice_to_confirmation`].
pub const CHOICES: [&str; 3] = ["Upload", "Skip", "Abort run"];

/// Print one event, coloured by severity.
pub fn print_event(event: &ProgressEvent) {
    let line = event.to_string();
    let line = match event.severity {
        Severity::Debug => line.dimmed(),
        Severity::Info => line.normal(),
        Severity::Warning => line.yellow(),
        Severity::Error => line.red(),
    };
    println!("{}", line);
}

/// Print the per-file table and the one-line summary.
pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "Upload summary".bold());

    for result in &summary.outcomes {
        let status = match &result.outcome {
            UploadOutcome::Uploaded(id) => format!("uploaded ({})", id).green(),
            UploadOutcome::Skipped(reason) => format!("skipped ({})", reason).yellow(),
            UploadOutcome::Failed(err) => format!("failed: {}", err).red(),
        };
        println!("  {}  {}", result.file.file_name(), status);
    }

    let line = summary.summary();
    if summary.is_success() {
        println!("{}", line.green().bold());
    } else {
        println!("{}", line.red().bold());
    }
}

/// Prompt text shown for one item.
pub fn describe_item(item: &UploadItem) -> String {
    let thumbnail = item
        .thumbnail
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "none".to_string());

    format!(
        "Upload {}?\n  title:     {}\n  thumbnail: {}\n  category:  {}\n  keywords:  {}",
        item.file.file_name(),
        item.title,
        thumbnail,
        item.category_id,
        item.keywords.join(", ")
    )
}

pub fn choice_to_confirmation(index: usize) -> Confirmation {
    match index {
        0 => Confirmation::Proceed,
        1 => Confirmation::Skip,
        _ => Confirmation::Abort,
    }
}

/// Asks on the terminal with an arrow-key menu.
///
/// A prompt that cannot be shown (no TTY, closed stdin) aborts the run
/// rather than uploading unconfirmed.
///
/// The menu runs on a blocking thread. When the run is cancelled while the
/// menu is open, the session stops waiting but the thread stays parked on
/// the terminal until the runtime shuts down.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmer;

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, item: &UploadItem) -> Confirmation {
        let prompt = describe_item(item);

        let answer = tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt(prompt)
                .items(&CHOICES)
                .default(0)
                .interact()
        })
        .await;

        match answer {
            Ok(Ok(index)) => choice_to_confirmation(index),
            Ok(Err(e)) => {
                tracing::warn!("Confirmation prompt failed, aborting run: {}", e);
                Confirmation::Abort
            }
            Err(e) => {
                tracing::error!("Confirmation prompt task failed: {}", e);
                Confirmation::Abort
            }
        }
    }
}
