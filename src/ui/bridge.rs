// ProgressBridge - one-way event channel from the upload worker to an observer
//
// The upload session runs on a tokio worker; whatever renders progress (a
// terminal, a GUI event loop) runs elsewhere. The bridge is the only thing
// both sides touch.
//
// Policy: unbounded queue. emit() never blocks and never drops an event, so
// the session's progress does not depend on how fast the observer drains.
// Events are delivered in emission order, exactly once.

use crate::models::ProgressEvent;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

/// Create a connected sender/receiver pair.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, ProgressReceiver { rx })
}

/// Worker side of the bridge.
///
/// Deliberately not `Clone`: a session owns the only sender, and the channel
/// closes when the session finishes.
#[derive(Debug)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    /// Queue an event for the observer.
    ///
    /// Returns `false` if the observer has gone away; the event is discarded
    /// and the worker carries on.
    pub fn emit(&self, event: ProgressEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                tracing::debug!("Progress observer gone, dropping event: {}", event.message);
                false
            }
        }
    }

    /// True once the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Observer side of the bridge.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Wait for the next event. `None` once the session has finished and
    /// every queued event has been delivered.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for non-async observer threads.
    ///
    /// Panics if called from inside a tokio runtime.
    pub fn blocking_recv(&mut self) -> Option<ProgressEvent> {
        self.rx.blocking_recv()
    }

    /// Next queued event, without waiting.
    pub fn try_recv(&mut self) -> Option<ProgressEvent> {
        self.rx.try_recv().ok()
    }

    /// Everything queued right now, in emission order.
    ///
    /// Suited to UI frame ticks: call once per frame and render the batch.
    pub fn drain(&mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Hand every event to `handler` on a dedicated thread until the session
    /// finishes.
    ///
    /// The thread exits once the sender is dropped and the queue is empty;
    /// join the returned handle to wait for the last event to be handled.
    pub fn forward_to_thread<F>(mut self, mut handler: F) -> JoinHandle<()>
    where
        F: FnMut(ProgressEvent) + Send + 'static,
    {
        std::thread::spawn(move || {
            tracing::debug!("Progress forwarding thread started");

            while let Some(event) = self.rx.blocking_recv() {
                handler(event);
            }

            tracing::debug!("Progress forwarding thread terminated");
        })
    }
}
