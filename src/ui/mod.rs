// UI module - everything between the upload worker and a human
//
// This module contains:
// - ProgressBridge: one-way event channel from the worker to an observer
// - Console: terminal rendering of events and summaries, and the terminal confirmer

pub mod bridge;
pub mod console;

pub use bridge::{ProgressReceiver, ProgressSender, progress_channel};
pub use console::{TerminalConfirmer, print_event, print_summary};
