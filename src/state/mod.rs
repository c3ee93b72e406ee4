// Item state machine
//
// Tracks each upload item through its phases and rejects transitions the
// session must never make. Owned by the session; nothing here is shared.

use crate::models::UploadOutcome;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use thiserror::Error;

/// Phase of a single upload item.
///
/// ```text
/// Pending -> Resolving -> (AwaitingConfirmation) -> Uploading -> Done
/// ```
///
/// Any phase before `Done` may jump straight to `Done` (dry run, operator
/// skip, abort, cancellation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemPhase {
    Pending,
    Resolving,
    AwaitingConfirmation,
    Uploading,
    Done,
}

impl ItemPhase {
    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: ItemPhase) -> bool {
        use ItemPhase::*;

        matches!(
            (self, next),
            (Pending, Resolving)
                | (Resolving, AwaitingConfirmation)
                | (Resolving, Uploading)
                | (AwaitingConfirmation, Uploading)
                | (Pending | Resolving | AwaitingConfirmation | Uploading, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == ItemPhase::Done
    }
}

impl fmt::Display for ItemPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemPhase::Pending => "pending",
            ItemPhase::Resolving => "resolving",
            ItemPhase::AwaitingConfirmation => "awaiting confirmation",
            ItemPhase::Uploading => "uploading",
            ItemPhase::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid transition for {path}: {from} -> {to}")]
pub struct TransitionError {
    pub path: Utf8PathBuf,
    pub from: ItemPhase,
    pub to: ItemPhase,
}

/// Phase tracker for one item.
#[derive(Debug, Clone)]
pub struct ItemTracker {
    path: Utf8PathBuf,
    phase: ItemPhase,
    outcome: Option<UploadOutcome>,
}

impl ItemTracker {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            phase: ItemPhase::Pending,
            outcome: None,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn phase(&self) -> ItemPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<&UploadOutcome> {
        self.outcome.as_ref()
    }

    /// Move to a non-terminal phase.
    pub fn advance(&mut self, next: ItemPhase) -> Result<(), TransitionError> {
        if next.is_terminal() || !self.phase.can_advance_to(next) {
            return Err(self.invalid(next));
        }
        self.phase = next;
        Ok(())
    }

    /// Move to `Done`, recording the outcome.
    pub fn finish(&mut self, outcome: UploadOutcome) -> Result<(), TransitionError> {
        if !self.phase.can_advance_to(ItemPhase::Done) {
            return Err(self.invalid(ItemPhase::Done));
        }
        self.phase = ItemPhase::Done;
        self.outcome = Some(outcome);
        Ok(())
    }

    fn invalid(&self, to: ItemPhase) -> TransitionError {
        TransitionError {
            path: self.path.clone(),
            from: self.phase,
            to,
        }
    }
}
