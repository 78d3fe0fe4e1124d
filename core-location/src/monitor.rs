//! # Foreground/Background Monitor
//!
//! Tracks whether the host process has lost and regained foreground focus
//! since monitoring started.
//!
//! ## Overview
//!
//! The monitor owns two independent edge-triggered latches, one per
//! lifecycle transition:
//!
//! - "resigned active" - the process lost foreground focus at least once
//! - "became active" - the process (re)gained foreground focus at least once
//!
//! Each latch flips true on the *first* occurrence of its signal within the
//! current monitoring session and then stops observing; later occurrences
//! are not processed. Restarting the session resets both latches to false.
//! These are latches over a session, not live foreground-state values.
//!
//! The authorization performer uses the pair to fingerprint a system
//! permission dialog: the dialog steals focus ("resigned active") and gives
//! it back once dismissed ("became active").
//!
//! ## Teardown
//!
//! `stop_monitoring` and `Drop` cancel the in-flight observation tasks
//! synchronously (fire-and-forget, no await required); any task suspended in
//! an observation method unblocks with the latch value it last saw.

use bridge_traits::lifecycle::{LifecycleSignal, LifecycleSignalSource};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Monitors host foreground/background transitions as one-shot latches.
pub struct ForegroundMonitor {
    signals: Arc<dyn LifecycleSignalSource>,
    session: Mutex<Option<MonitorSession>>,
}

struct MonitorSession {
    token: CancellationToken,
    resigned: watch::Receiver<bool>,
    became_active: watch::Receiver<bool>,
}

impl ForegroundMonitor {
    /// Creates a monitor over the given signal source. Monitoring does not
    /// start until [`start_monitoring`](Self::start_monitoring) is called.
    pub fn new(signals: Arc<dyn LifecycleSignalSource>) -> Self {
        Self {
            signals,
            session: Mutex::new(None),
        }
    }

    /// Begins a monitoring session.
    ///
    /// If a session is already running it is cancelled first and both
    /// latches reset to false.
    pub fn start_monitoring(&self) {
        let mut session = self.session.lock();
        if let Some(prior) = session.take() {
            prior.token.cancel();
        }

        let token = CancellationToken::new();
        let resigned = Self::watch_signal(
            Arc::clone(&self.signals),
            LifecycleSignal::WillResignActive,
            token.clone(),
        );
        let became_active = Self::watch_signal(
            Arc::clone(&self.signals),
            LifecycleSignal::DidBecomeActive,
            token.clone(),
        );

        *session = Some(MonitorSession {
            token,
            resigned,
            became_active,
        });
    }

    /// Ends the current monitoring session, cancelling both observations.
    ///
    /// Safe to call when not running. Synchronous: callers never need to
    /// await the cancellation.
    pub fn stop_monitoring(&self) {
        if let Some(session) = self.session.lock().take() {
            session.token.cancel();
        }
    }

    /// Instantaneous read of the "resigned active" latch.
    pub fn has_resigned_active(&self) -> bool {
        self.session
            .lock()
            .as_ref()
            .map(|session| *session.resigned.borrow())
            .unwrap_or(false)
    }

    /// Instantaneous read of the "became active" latch.
    pub fn has_become_active(&self) -> bool {
        self.session
            .lock()
            .as_ref()
            .map(|session| *session.became_active.borrow())
            .unwrap_or(false)
    }

    /// Suspends until the "resigned active" latch is set, returning `true`.
    ///
    /// Returns `false` without suspending when monitoring is not running,
    /// and unblocks with `false` if the session is torn down before the
    /// signal fires.
    pub async fn observe_resigned_active(&self) -> bool {
        let rx = self
            .session
            .lock()
            .as_ref()
            .map(|session| session.resigned.clone());
        Self::observe(rx).await
    }

    /// Suspends until the "became active" latch is set; see
    /// [`observe_resigned_active`](Self::observe_resigned_active).
    pub async fn observe_became_active(&self) -> bool {
        let rx = self
            .session
            .lock()
            .as_ref()
            .map(|session| session.became_active.clone());
        Self::observe(rx).await
    }

    async fn observe(rx: Option<watch::Receiver<bool>>) -> bool {
        let Some(mut rx) = rx else {
            return false;
        };
        if rx.wait_for(|latched| *latched).await.is_ok() {
            true
        } else {
            // Session torn down before the signal fired.
            *rx.borrow()
        }
    }

    /// Spawns the observation task for one signal and returns the latch it
    /// feeds. The task consumes exactly the first occurrence, then drops the
    /// subscription.
    fn watch_signal(
        source: Arc<dyn LifecycleSignalSource>,
        signal: LifecycleSignal,
        token: CancellationToken,
    ) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            let mut stream = tokio::select! {
                _ = token.cancelled() => return,
                subscribed = source.subscribe(signal) => match subscribed {
                    Ok(stream) => stream,
                    Err(error) => {
                        // Host cannot observe this transition; the latch
                        // stays false for the whole session.
                        debug!(?signal, %error, "lifecycle signal unavailable");
                        return;
                    }
                },
            };

            tokio::select! {
                _ = token.cancelled() => {}
                occurrence = stream.next() => {
                    if occurrence.is_some() {
                        let _ = tx.send(true);
                    }
                }
            }
        });
        rx
    }
}

impl Drop for ForegroundMonitor {
    fn drop(&mut self) {
        self.stop_monitoring();
    }
}
