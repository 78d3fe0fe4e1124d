//! Single-assignment resolution slots.
//!
//! A logical request is awaited through a pair of halves created by
//! [`pending`]: the caller suspends on [`PendingResolution`] while the
//! performer that owns the request holds a [`ResolutionSlot`] and writes the
//! outcome into it at most once.
//!
//! The slot is a first-writer-wins cell: the sending half is consumed on the
//! first write and an explicit state tag records what happened, so a losing
//! branch of a race (grace timer vs. delegate event) degrades to a no-op
//! rather than overwriting the result. Abandoning the slot without a write
//! surfaces to the awaiting caller as [`LocationError::Cancelled`], never as
//! a silent hang.

use crate::error::{LocationError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;

/// What has happened to a slot so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No outcome written yet.
    Pending,
    /// An outcome (success or failure) was delivered to the caller.
    Resolved,
    /// The slot was abandoned without an outcome.
    Cancelled,
}

struct SlotInner<T> {
    state: SlotState,
    tx: Option<oneshot::Sender<Result<T>>>,
}

/// Writing half of a resolution pair. Cloneable; all clones share the same
/// single-assignment cell.
pub struct ResolutionSlot<T> {
    inner: Arc<Mutex<SlotInner<T>>>,
}

impl<T> Clone for ResolutionSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Awaiting half of a resolution pair, consumed by the dispatcher's caller.
pub struct PendingResolution<T> {
    rx: oneshot::Receiver<Result<T>>,
}

/// Creates a linked slot/awaiter pair.
pub fn pending<T>() -> (ResolutionSlot<T>, PendingResolution<T>) {
    let (tx, rx) = oneshot::channel();
    let slot = ResolutionSlot {
        inner: Arc::new(Mutex::new(SlotInner {
            state: SlotState::Pending,
            tx: Some(tx),
        })),
    };
    (slot, PendingResolution { rx })
}

impl<T> ResolutionSlot<T> {
    /// Delivers a success outcome.
    ///
    /// Returns `true` if this call was the first writer; `false` if the slot
    /// was already resolved or cancelled (the value is discarded).
    pub fn resolve(&self, value: T) -> bool {
        self.finish(Ok(value))
    }

    /// Delivers a failure outcome through the same exactly-once path.
    pub fn fail(&self, error: LocationError) -> bool {
        self.finish(Err(error))
    }

    /// Abandons the slot without an outcome. The awaiting caller observes
    /// [`LocationError::Cancelled`]. No-op if already resolved.
    pub fn abandon(&self) {
        let mut inner = self.inner.lock();
        if inner.tx.take().is_some() {
            inner.state = SlotState::Cancelled;
        }
    }

    /// Current state of the cell.
    pub fn state(&self) -> SlotState {
        self.inner.lock().state
    }

    /// Whether no outcome has been written yet.
    pub fn is_pending(&self) -> bool {
        self.state() == SlotState::Pending
    }

    fn finish(&self, outcome: Result<T>) -> bool {
        let mut inner = self.inner.lock();
        match inner.tx.take() {
            Some(tx) => {
                inner.state = SlotState::Resolved;
                // The caller may already have walked away; delivery failure
                // still consumes the cell.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

impl<T> PendingResolution<T> {
    /// Suspends until the slot is written or abandoned.
    pub async fn outcome(self) -> Result<T> {
        match self.rx.await {
            Ok(outcome) => outcome,
            // Every slot clone dropped (or abandoned) without a write.
            Err(_) => Err(LocationError::Cancelled),
        }
    }
}
