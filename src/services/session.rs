use crate::metrics::RunMetrics;
use crate::models::{
    ConfigError, DiscoveredFile, ItemResult, ProgressEvent, RunConfig, RunSummary, Severity,
    SkipReason, UploadOutcome,
};
use crate::services::discovery::{self, DiscoveryError};
use crate::services::naming;
use crate::services::uploader::{Confirmation, Confirmer, FsTemplateLoader, TemplateLoader, Uploader};
use crate::state::{ItemPhase, ItemTracker};
use crate::ui::bridge::ProgressSender;
use camino::Utf8PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Errors that stop a run before any item is processed.
///
/// Everything that goes wrong after discovery (failed uploads, operator
/// aborts, cancellation) ends up in the [`RunSummary`] instead.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    DirectoryNotFound(#[from] DiscoveryError),

    #[error("Upload worker stopped unexpectedly: {0}")]
    WorkerStopped(#[from] tokio::task::JoinError),
}

/// What processing one item produced, and whether the rest of the run stops.
struct ItemFlow {
    outcome: UploadOutcome,
    halt: Option<SkipReason>,
}

/// One upload run over a source directory.
///
/// The session owns its [`RunConfig`] and the worker end of the progress
/// bridge. Items are processed strictly one after another:
///
/// 1. discover files (fatal on a missing directory)
/// 2. per file: resolve metadata, optionally ask the operator, upload
/// 3. return a [`RunSummary`] with one outcome per discovered file
///
/// A failed upload never stops the run. An operator abort or a cancellation
/// marks the current and all remaining items as skipped and returns the
/// partial summary.
///
/// # Cancellation
///
/// The session watches a `tokio::sync::watch` channel. Sending `true` is
/// noticed between items, while waiting for the operator, and during an
/// upload (the uploader future is dropped). An upload that has already
/// finished when the cancel is seen is kept as uploaded. Dropping the sender
/// without sending `true` does not cancel.
pub struct UploadSession {
    config: RunConfig,
    uploader: Arc<dyn Uploader>,
    confirmer: Option<Arc<dyn Confirmer>>,
    templates: Arc<dyn TemplateLoader>,
    events: ProgressSender,
    metrics: Arc<RunMetrics>,
}

impl UploadSession {
    /// Create a session that reads its description template from disk.
    pub fn new(config: RunConfig, uploader: Arc<dyn Uploader>, events: ProgressSender) -> Self {
        Self {
            config,
            uploader,
            confirmer: None,
            templates: Arc::new(FsTemplateLoader),
            events,
            metrics: Arc::new(RunMetrics::new()),
        }
    }

    /// Required when the config is interactive (unless it is also a dry run).
    pub fn with_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = Some(confirmer);
        self
    }

    pub fn with_template_loader(mut self, loader: Arc<dyn TemplateLoader>) -> Self {
        self.templates = loader;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<RunMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Shared handle to this run's counters.
    pub fn metrics(&self) -> Arc<RunMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the session on `handle` and return a handle for cancelling and
    /// joining it.
    pub fn spawn(self, handle: &tokio::runtime::Handle) -> RunHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = handle.spawn(self.run(cancel_rx));

        RunHandle {
            cancel: CancelSignal(Arc::new(cancel_tx)),
            task,
        }
    }

    /// Process the whole batch.
    pub async fn run(self, mut cancel_rx: watch::Receiver<bool>) -> Result<RunSummary, RunError> {
        let config = &self.config;

        tracing::info!(
            "Starting upload run: source={}, batch_limit={}, dry_run={}, interactive={}",
            config.source_directory(),
            config.batch_limit(),
            config.dry_run(),
            config.interactive()
        );
        self.emit(ProgressEvent::info(format!(
            "Starting upload run for {}",
            config.source_directory()
        )));
        if config.dry_run() {
            self.emit(ProgressEvent::info("Dry run enabled, nothing will be uploaded"));
        }

        // Dry runs never reach the confirmation step
        if config.interactive() && !config.dry_run() && self.confirmer.is_none() {
            return Err(self.fatal(ConfigError::MissingConfirmer.into()));
        }

        let template = match self.templates.load(config.description_template()) {
            Ok(template) => template,
            Err(e) => {
                let err = ConfigError::TemplateUnavailable {
                    path: config.description_template().to_path_buf(),
                    reason: format!("{:#}", e),
                };
                return Err(self.fatal(err.into()));
            }
        };

        let files = match discovery::discover(
            config.source_directory(),
            config.input_extensions(),
            config.batch_limit(),
        ) {
            Ok(files) => files,
            Err(e) => return Err(self.fatal(e.into())),
        };

        let total = files.len();
        if total == 0 {
            let extensions: Vec<&str> = config.input_extensions().iter().map(String::as_str).collect();
            self.emit(ProgressEvent::warning(format!(
                "No files with extensions {} found in {}",
                extensions.join(" "),
                config.source_directory()
            )));
            let summary = RunSummary::default();
            self.emit(ProgressEvent::info(format!("Upload complete! {}", summary.summary())));
            return Ok(summary);
        }

        self.emit(
            ProgressEvent::info(format!(
                "Found {} file(s) to process (batch limit {})",
                total,
                config.batch_limit()
            ))
            .with_progress(0, total),
        );

        let thumbnails = self.thumbnail_candidates();

        let mut results = Vec::with_capacity(total);
        let mut halt: Option<SkipReason> = None;

        for (index, file) in files.into_iter().enumerate() {
            let position = index + 1;

            if halt.is_none() && is_cancelled(&cancel_rx) {
                self.emit(ProgressEvent::warning(format!(
                    "Run cancelled, skipping the remaining {} file(s)",
                    total - index
                )));
                halt = Some(SkipReason::Cancelled);
            }

            let outcome = match halt {
                Some(reason) => self.skip_unstarted(&file, reason, position, total),
                None => {
                    let flow = self
                        .process_item(&file, position, total, &template, &thumbnails, &mut cancel_rx)
                        .await;
                    halt = flow.halt;
                    flow.outcome
                }
            };

            self.record(&outcome);
            results.push(ItemResult { file, outcome });
        }

        let summary = RunSummary::from_results(results);
        let severity = if summary.is_success() {
            Severity::Info
        } else {
            Severity::Warning
        };
        self.emit(ProgressEvent::new(
            severity,
            format!("Upload complete! {}", summary.summary()),
        ));
        self.metrics.log_summary();

        Ok(summary)
    }

    async fn process_item(
        &self,
        file: &DiscoveredFile,
        position: usize,
        total: usize,
        template: &str,
        thumbnails: &[Utf8PathBuf],
        cancel_rx: &mut watch::Receiver<bool>,
    ) -> ItemFlow {
        let config = &self.config;
        let mut tracker = ItemTracker::new(file.path.clone());

        self.transition(&mut tracker, ItemPhase::Resolving, position, total);
        let item = naming::build_upload_item(config, file, template, thumbnails);

        self.emit(
            ProgressEvent::info(format!(
                "[{}/{}] {} -> \"{}\"",
                position,
                total,
                file.file_name(),
                item.title
            ))
            .with_path(file.path.clone())
            .with_progress(position, total),
        );
        match item.thumbnail {
            Some(ref thumbnail) => {
                self.emit(ProgressEvent::debug(format!("Using thumbnail {}", thumbnail)).with_path(file.path.clone()))
            }
            None => self.emit(
                ProgressEvent::debug(format!("No thumbnail found for {}", file.file_name()))
                    .with_path(file.path.clone()),
            ),
        }
        for problem in naming::check_limits(&item) {
            self.emit(
                ProgressEvent::warning(format!("{}: {}", file.file_name(), problem))
                    .with_path(file.path.clone()),
            );
        }

        if config.dry_run() {
            self.emit(
                ProgressEvent::info(format!("Dry run, not uploading {}", file.file_name()))
                    .with_path(file.path.clone()),
            );
            return self.finish(&mut tracker, UploadOutcome::Skipped(SkipReason::DryRun), None, position, total);
        }

        if let (true, Some(confirmer)) = (config.interactive(), self.confirmer.as_ref()) {
            self.transition(&mut tracker, ItemPhase::AwaitingConfirmation, position, total);

            let decision = match until_cancelled(confirmer.confirm(&item), cancel_rx).await {
                Some(decision) => decision,
                None => return self.cancelled(&mut tracker, position, total),
            };

            match decision {
                Confirmation::Proceed => {}
                Confirmation::Skip => {
                    self.emit(
                        ProgressEvent::info(format!("Operator declined {}", file.file_name()))
                            .with_path(file.path.clone()),
                    );
                    return self.finish(
                        &mut tracker,
                        UploadOutcome::Skipped(SkipReason::OperatorDeclined),
                        None,
                        position,
                        total,
                    );
                }
                Confirmation::Abort => {
                    self.emit(
                        ProgressEvent::warning(format!(
                            "Operator aborted the run at {}, skipping the remaining {} file(s)",
                            file.file_name(),
                            total - position + 1
                        ))
                        .with_path(file.path.clone()),
                    );
                    return self.finish(
                        &mut tracker,
                        UploadOutcome::Skipped(SkipReason::RunAborted),
                        Some(SkipReason::RunAborted),
                        position,
                        total,
                    );
                }
            }
        }

        self.transition(&mut tracker, ItemPhase::Uploading, position, total);
        self.emit(
            ProgressEvent::info(format!("Uploading {}", file.file_name()))
                .with_path(file.path.clone())
                .with_progress(position, total),
        );

        let started = Instant::now();
        let result = match until_cancelled(self.uploader.upload(&item), cancel_rx).await {
            Some(result) => result,
            None => return self.cancelled(&mut tracker, position, total),
        };
        self.metrics.record_upload_time(started.elapsed());

        match result {
            Ok(video_id) => {
                self.emit(
                    ProgressEvent::info(format!(
                        "Uploaded {} (video id {})",
                        file.file_name(),
                        video_id
                    ))
                    .with_path(file.path.clone()),
                );
                self.finish(&mut tracker, UploadOutcome::Uploaded(video_id), None, position, total)
            }
            Err(e) => {
                self.emit(
                    ProgressEvent::error(format!("Failed to upload {}: {}", file.file_name(), e))
                        .with_path(file.path.clone()),
                );
                self.finish(&mut tracker, UploadOutcome::Failed(e), None, position, total)
            }
        }
    }

    /// Outcome for an item reached after the run was halted.
    fn skip_unstarted(
        &self,
        file: &DiscoveredFile,
        reason: SkipReason,
        position: usize,
        total: usize,
    ) -> UploadOutcome {
        let mut tracker = ItemTracker::new(file.path.clone());
        self.finish(&mut tracker, UploadOutcome::Skipped(reason), None, position, total)
            .outcome
    }

    fn cancelled(&self, tracker: &mut ItemTracker, position: usize, total: usize) -> ItemFlow {
        self.emit(
            ProgressEvent::warning(format!(
                "Run cancelled while processing {}, skipping the remaining {} file(s)",
                tracker.path(),
                total - position + 1
            ))
            .with_path(tracker.path().to_path_buf()),
        );
        self.finish(
            tracker,
            UploadOutcome::Skipped(SkipReason::Cancelled),
            Some(SkipReason::Cancelled),
            position,
            total,
        )
    }

    fn transition(&self, tracker: &mut ItemTracker, next: ItemPhase, position: usize, total: usize) {
        match tracker.advance(next) {
            Ok(()) => self.emit(
                ProgressEvent::debug(format!("{} is {}", tracker.path(), next))
                    .with_path(tracker.path().to_path_buf())
                    .with_phase(next)
                    .with_progress(position, total),
            ),
            Err(e) => tracing::error!("{}", e),
        }
    }

    fn finish(
        &self,
        tracker: &mut ItemTracker,
        outcome: UploadOutcome,
        halt: Option<SkipReason>,
        position: usize,
        total: usize,
    ) -> ItemFlow {
        if let Err(e) = tracker.finish(outcome.clone()) {
            tracing::error!("{}", e);
        }

        if let Some(recorded) = tracker.outcome() {
            self.emit(
                ProgressEvent::debug(format!("{} {}", tracker.path(), recorded))
                    .with_path(tracker.path().to_path_buf())
                    .with_phase(ItemPhase::Done)
                    .with_progress(position, total),
            );
        }

        ItemFlow { outcome, halt }
    }

    fn record(&self, outcome: &UploadOutcome) {
        match outcome {
            UploadOutcome::Uploaded(_) => self.metrics.record_uploaded(),
            UploadOutcome::Skipped(_) => self.metrics.record_skipped(),
            UploadOutcome::Failed(_) => self.metrics.record_failed(),
        }
    }

    /// Files in the source directory that may serve as thumbnails.
    fn thumbnail_candidates(&self) -> Vec<Utf8PathBuf> {
        if self.config.thumbnail_extensions().is_empty() {
            return Vec::new();
        }

        match discovery::list_files(self.config.source_directory()) {
            Ok(files) => files,
            Err(e) => {
                self.emit(ProgressEvent::warning(format!(
                    "Could not list thumbnail candidates: {}",
                    e
                )));
                Vec::new()
            }
        }
    }

    /// Log a run-stopping error and report it to the observer.
    fn fatal(&self, err: RunError) -> RunError {
        self.emit(ProgressEvent::error(err.to_string()));
        err
    }

    /// Log the event and forward it to the observer if it meets the run's
    /// minimum severity.
    fn emit(&self, event: ProgressEvent) {
        match event.severity {
            Severity::Debug => tracing::debug!("{}", event.message),
            Severity::Info => tracing::info!("{}", event.message),
            Severity::Warning => tracing::warn!("{}", event.message),
            Severity::Error => tracing::error!("{}", event.message),
        }

        if event.severity < self.config.log_level() {
            return;
        }

        let delivered = self.events.emit(event);
        self.metrics.record_event(delivered);
    }
}

fn is_cancelled(cancel_rx: &watch::Receiver<bool>) -> bool {
    *cancel_rx.borrow()
}

/// Resolves once cancellation is requested; never resolves if the sender is
/// dropped without requesting it.
async fn wait_for_cancel(cancel_rx: &mut watch::Receiver<bool>) {
    let sender_gone = cancel_rx.wait_for(|cancelled| *cancelled).await.is_err();
    if sender_gone {
        std::future::pending::<()>().await;
    }
}

/// Race `work` against cancellation.
///
/// Returns `None` if cancellation wins. Work that has completed by the time
/// the cancel is seen still counts, so a finished upload is never reported
/// as cancelled.
async fn until_cancelled<F: Future>(
    work: F,
    cancel_rx: &mut watch::Receiver<bool>,
) -> Option<F::Output> {
    tokio::pin!(work);

    tokio::select! {
        biased;
        output = &mut work => return Some(output),
        _ = wait_for_cancel(cancel_rx) => {}
    }

    // One last poll for work that finished alongside the cancel
    tokio::select! {
        biased;
        output = &mut work => Some(output),
        _ = std::future::ready(()) => None,
    }
}

/// Cloneable trigger for cancelling a spawned run.
#[derive(Debug, Clone)]
pub struct CancelSignal(Arc<watch::Sender<bool>>);

impl CancelSignal {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

/// Handle to a session running on a tokio worker.
///
/// Dropping the handle detaches the run; it keeps going to completion.
#[derive(Debug)]
pub struct RunHandle {
    cancel: CancelSignal,
    task: JoinHandle<Result<RunSummary, RunError>>,
}

impl RunHandle {
    /// Request cancellation. Remaining items are reported as skipped.
    pub fn cancel(&self) {
        tracing::info!("Upload run cancellation requested");
        self.cancel.cancel();
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to finish.
    pub async fn join(self) -> Result<RunSummary, RunError> {
        self.task.await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UploadError;
    use crate::services::uploader::{InlineTemplate, MockConfirmer, MockUploader};
    use crate::ui::bridge::progress_channel;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(names: &[&str]) -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
        (temp_dir, dir)
    }

    fn session(config: RunConfig, uploader: MockUploader) -> UploadSession {
        let (tx, _rx) = progress_channel();
        UploadSession::new(config, Arc::new(uploader), tx)
            .with_template_loader(Arc::new(InlineTemplate::new("Description")))
    }

    #[tokio::test]
    async fn test_uploads_every_file_in_order() {
        let (_temp, dir) = fixture(&["b.mp4", "a.mp4"]);
        let config = RunConfig::builder(&dir).build().unwrap();

        let mut uploader = MockUploader::new();
        let mut seq = mockall::Sequence::new();
        uploader
            .expect_upload()
            .withf(|item| item.title == "a")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("id-a".to_string()));
        uploader
            .expect_upload()
            .withf(|item| item.title == "b")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("id-b".to_string()));

        let (_tx, rx) = watch::channel(false);
        let summary = session(config, uploader).run(rx).await.unwrap();

        assert_eq!(summary.uploaded_count, 2);
        assert_eq!(summary.uploaded_video_ids(), vec!["id-a", "id-b"]);
    }

    #[tokio::test]
    async fn test_dry_run_never_calls_uploader() {
        let (_temp, dir) = fixture(&["a.mp4", "b.mov"]);
        let config = RunConfig::builder(&dir).dry_run(true).interactive(true).build().unwrap();

        let mut uploader = MockUploader::new();
        uploader.expect_upload().never();

        let (_tx, rx) = watch::channel(false);
        let summary = session(config, uploader).run(rx).await.unwrap();

        assert_eq!(summary.skipped_for(SkipReason::DryRun), 2);
        assert_eq!(summary.total(), 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_run() {
        let (_temp, dir) = fixture(&["a.mp4", "b.mp4", "c.mp4"]);
        let config = RunConfig::builder(&dir).build().unwrap();

        let mut uploader = MockUploader::new();
        uploader.expect_upload().times(3).returning(|item| {
            if item.title == "a" {
                Err(UploadError::transient("connection reset"))
            } else {
                Ok(format!("id-{}", item.title))
            }
        });

        let (_tx, rx) = watch::channel(false);
        let summary = session(config, uploader).run(rx).await.unwrap();

        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.uploaded_count, 2);
        assert!(summary.outcomes[0].outcome.is_failed());
    }

    #[tokio::test]
    async fn test_interactive_requires_confirmer() {
        let (_temp, dir) = fixture(&["a.mp4"]);
        let config = RunConfig::builder(&dir).interactive(true).build().unwrap();

        let (_tx, rx) = watch::channel(false);
        let err = session(config, MockUploader::new()).run(rx).await.unwrap_err();

        assert!(matches!(err, RunError::InvalidConfig(ConfigError::MissingConfirmer)));
    }

    #[tokio::test]
    async fn test_operator_skip_and_abort() {
        let (_temp, dir) = fixture(&["a.mp4", "b.mp4", "c.mp4", "d.mp4"]);
        let config = RunConfig::builder(&dir).interactive(true).build().unwrap();

        let mut confirmer = MockConfirmer::new();
        confirmer.expect_confirm().times(3).returning(|item| match item.title.as_str() {
            "a" => Confirmation::Proceed,
            "b" => Confirmation::Skip,
            _ => Confirmation::Abort,
        });

        let mut uploader = MockUploader::new();
        uploader
            .expect_upload()
            .times(1)
            .returning(|_| Ok("id-a".to_string()));

        let (_tx, rx) = watch::channel(false);
        let summary = session(config, uploader)
            .with_confirmer(Arc::new(confirmer))
            .run(rx)
            .await
            .unwrap();

        let outcomes: Vec<_> = summary.outcomes.iter().map(|r| r.outcome.clone()).collect();
        assert_eq!(
            outcomes,
            vec![
                UploadOutcome::Uploaded("id-a".to_string()),
                UploadOutcome::Skipped(SkipReason::OperatorDeclined),
                UploadOutcome::Skipped(SkipReason::RunAborted),
                UploadOutcome::Skipped(SkipReason::RunAborted),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (_temp, dir) = fixture(&["a.mp4", "b.mp4"]);
        let config = RunConfig::builder(&dir).build().unwrap();

        let mut uploader = MockUploader::new();
        uploader.expect_upload().never();

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let summary = session(config, uploader).run(rx).await.unwrap();
        assert_eq!(summary.skipped_for(SkipReason::Cancelled), 2);
    }

    #[tokio::test]
    async fn test_dropped_cancel_sender_does_not_cancel() {
        let (_temp, dir) = fixture(&["a.mp4"]);
        let config = RunConfig::builder(&dir).build().unwrap();

        let mut uploader = MockUploader::new();
        uploader.expect_upload().times(1).returning(|_| Ok("id".to_string()));

        let (tx, rx) = watch::channel(false);
        drop(tx);

        let summary = session(config, uploader).run(rx).await.unwrap();
        assert_eq!(summary.uploaded_count, 1);
    }

    #[tokio::test]
    async fn test_until_cancelled_prefers_finished_work() {
        let (_tx, mut rx) = watch::channel(true);

        assert_eq!(until_cancelled(async { 7 }, &mut rx).await, Some(7));
        assert_eq!(until_cancelled(std::future::pending::<u8>(), &mut rx).await, None);
    }

    #[tokio::test]
    async fn test_missing_template_is_invalid_config() {
        let (_temp, dir) = fixture(&["a.mp4"]);
        let config = RunConfig::builder(&dir)
            .description_template(dir.join("missing.txt"))
            .build()
            .unwrap();

        let (tx, _rx) = progress_channel();
        let session = UploadSession::new(config, Arc::new(MockUploader::new()), tx);

        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let err = session.run(cancel_rx).await.unwrap_err();
        assert!(matches!(
            err,
            RunError::InvalidConfig(ConfigError::TemplateUnavailable { .. })
        ));
    }
}
