// Run metrics
//
// Lightweight counters for one upload run. The session writes them; an
// observer may read them at any time through a shared Arc.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Per-run counters.
///
/// Uses atomic operations so the observer can poll them while the worker
/// updates them, without locks.
#[derive(Debug)]
pub struct RunMetrics {
    /// Videos uploaded successfully
    pub items_uploaded: AtomicUsize,

    /// Videos whose upload failed
    pub items_failed: AtomicUsize,

    /// Videos skipped (dry run, declined, aborted, cancelled)
    pub items_skipped: AtomicUsize,

    /// Time spent inside the uploader, in milliseconds
    pub total_upload_time_ms: AtomicU64,

    /// Progress events delivered to the bridge
    pub events_emitted: AtomicU64,

    /// Progress events discarded because the observer had gone away
    pub events_undelivered: AtomicU64,

    start_time: Instant,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            items_uploaded: AtomicUsize::new(0),
            items_failed: AtomicUsize::new(0),
            items_skipped: AtomicUsize::new(0),
            total_upload_time_ms: AtomicU64::new(0),
            events_emitted: AtomicU64::new(0),
            events_undelivered: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_uploaded(&self) {
        self.items_uploaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.items_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.items_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record time spent in one uploader call, successful or not.
    pub fn record_upload_time(&self, duration: Duration) {
        self.total_upload_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record the result of one bridge emit.
    pub fn record_event(&self, delivered: bool) {
        if delivered {
            self.events_emitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.events_undelivered.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Items finished so far, whatever their outcome.
    pub fn items_processed(&self) -> usize {
        self.items_uploaded.load(Ordering::Relaxed)
            + self.items_failed.load(Ordering::Relaxed)
            + self.items_skipped.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average uploader time per attempted upload, in milliseconds.
    pub fn avg_upload_time_ms(&self) -> f64 {
        let total = self.total_upload_time_ms.load(Ordering::Relaxed);
        let attempts = self.items_uploaded.load(Ordering::Relaxed)
            + self.items_failed.load(Ordering::Relaxed);
        if attempts > 0 {
            total as f64 / attempts as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Upload Run Metrics ===");
        tracing::info!("Elapsed: {:.2}s", self.elapsed().as_secs_f64());
        tracing::info!(
            "Videos: {} uploaded, {} failed, {} skipped",
            self.items_uploaded.load(Ordering::Relaxed),
            self.items_failed.load(Ordering::Relaxed),
            self.items_skipped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Upload time: {:.2}s (avg: {:.2}ms per attempt)",
            self.total_upload_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_upload_time_ms()
        );
        tracing::info!(
            "Progress events: {} delivered, {} undelivered",
            self.events_emitted.load(Ordering::Relaxed),
            self.events_undelivered.load(Ordering::Relaxed)
        );
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}
