//! ytbulk - bulk YouTube upload orchestration
//!
//! Main entry point for the command line front end.
//!
//! # Overview
//!
//! This binary drives one upload run per invocation. It initializes:
//! - Configuration loading ([`ConfigManager`]) plus command line overrides
//! - Logging infrastructure (file rotation + optional console output)
//! - Tokio async runtime (the upload session runs on a worker)
//! - The console observer on the main thread
//!
//! # Execution Flow
//!
//! 1. Load `ytbulk.yaml` (or `--config`), layered with `YTBULK__*` variables
//! 2. Apply flag overrides and validate into a `RunConfig`
//! 3. Initialize logging → logs/ytbulk.<date>
//! 4. Spawn the upload session; Ctrl-C requests cancellation
//! 5. Print progress events until the session finishes
//! 6. Print the summary; exit non-zero if any upload failed
//!
//! # Upload engine
//!
//! ytbulk does not talk to YouTube itself. Each video is handed to the
//! configured `upload_command`, which receives the metadata in `YTBULK_*`
//! environment variables and prints the new video id. Dry runs need no
//! command.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use camino::Utf8PathBuf;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use ytbulk::config::SETTINGS_FILE_NAME;
use ytbulk::logging::{self, LogFormat};
use ytbulk::models::UploadItem;
use ytbulk::services::{CommandUploader, UploadError, Uploader};
use ytbulk::ui::{TerminalConfirmer, print_event, print_summary};
use ytbulk::{
    APP_NAME, ConfigManager, Severity, UploadSession, UploadSettings, VERSION, progress_channel,
};

/// Grace period for runtime tasks after a normal finish.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A terminal prompt interrupted by Ctrl-C never returns, so waiting on it
/// only delays exit.
const CANCELLED_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(200);

/// Bulk-upload a directory of videos with templated titles, descriptions and thumbnails.
#[derive(Parser, Debug)]
#[command(name = "ytbulk", version, about)]
struct Cli {
    /// Settings file
    #[arg(short, long, value_name = "FILE", default_value = SETTINGS_FILE_NAME)]
    config: Utf8PathBuf,

    /// Write a settings file with every default and exit
    #[arg(long)]
    init: bool,

    /// Directory to upload from
    #[arg(short, long, value_name = "DIR")]
    source_dir: Option<Utf8PathBuf>,

    /// Maximum number of videos in this run
    #[arg(short = 'n', long, value_name = "N")]
    batch_limit: Option<usize>,

    /// Resolve metadata and report, but upload nothing
    #[arg(long)]
    dry_run: bool,

    /// Upload without asking about each video
    #[arg(long)]
    non_interactive: bool,

    /// Minimum severity of reported events (debug, info, warning, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<Severity>,

    /// Shell command that uploads one video and prints its id
    #[arg(long, value_name = "COMMAND")]
    upload_command: Option<String>,

    /// Directory for rolling log files
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: Utf8PathBuf,

    /// Write log files as JSON lines
    #[arg(long)]
    json_log: bool,

    /// Also write the log to stderr
    #[arg(long)]
    log_console: bool,
}

impl Cli {
    fn apply_overrides(&self, settings: &mut UploadSettings) {
        if let Some(ref dir) = self.source_dir {
            settings.source_directory = dir.clone();
        }
        if let Some(limit) = self.batch_limit {
            settings.upload_batch_limit = limit;
        }
        if self.dry_run {
            settings.dry_run = true;
        }
        if self.non_interactive {
            settings.interactive = false;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
        if let Some(ref command) = self.upload_command {
            settings.upload_command = Some(command.clone());
        }
    }
}

/// Stand-in for dry runs without an upload command. Never called.
struct UnconfiguredUploader;

#[async_trait]
impl Uploader for UnconfiguredUploader {
    async fn upload(&self, _item: &UploadItem) -> Result<String, UploadError> {
        Err(UploadError::permanent("No upload command configured"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_manager = ConfigManager::for_file(cli.config.clone());

    if cli.init {
        config_manager.write_default_settings()?;
        println!("Wrote default settings to {}", config_manager.settings_path());
        return Ok(());
    }

    let mut settings = config_manager.load_settings()?;
    cli.apply_overrides(&mut settings);

    let format = if cli.json_log {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    let _guard = logging::setup_logging_with_console(
        &cli.log_dir,
        APP_NAME,
        settings.log_level,
        cli.log_console,
        format,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config = settings
        .to_run_config()
        .with_context(|| format!("Invalid settings in {}", config_manager.settings_path()))?;

    let uploader: Arc<dyn Uploader> = match settings.upload_command {
        Some(ref command) => Arc::new(
            CommandUploader::new(command.clone(), Duration::from_secs(settings.upload_timeout_secs))
                .with_client_secrets(settings.client_secrets_file.clone()),
        ),
        None if config.dry_run() => Arc::new(UnconfiguredUploader),
        None => bail!(
            "No upload command configured; set upload_command in {} or pass --upload-command",
            config_manager.settings_path()
        ),
    };

    // The session runs on a worker; the main thread renders progress
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("ytbulk-worker")
        .build()?;

    let (events, mut progress) = progress_channel();

    let mut session = UploadSession::new(config, uploader, events);
    if session.config().interactive() {
        session = session.with_confirmer(Arc::new(TerminalConfirmer));
    }

    let handle = session.spawn(runtime.handle());

    let run_cancel = handle.cancel_signal();
    let cancel = handle.cancel_signal();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling upload run");
            cancel.cancel();
        }
    });

    // Ends when the session finishes and drops its sender
    while let Some(event) = progress.blocking_recv() {
        print_event(&event);
    }

    let result = runtime.block_on(handle.join());

    // A cancelled prompt leaves its blocking thread parked on the terminal
    let shutdown_timeout = if run_cancel.is_cancelled() {
        CANCELLED_SHUTDOWN_TIMEOUT
    } else {
        SHUTDOWN_TIMEOUT
    };
    runtime.shutdown_timeout(shutdown_timeout);

    let summary = result?;
    print_summary(&summary);

    tracing::info!("Upload run finished: {}", summary.summary());

    if !summary.is_success() {
        bail!("{} upload(s) failed", summary.failed_count);
    }

    Ok(())
}
