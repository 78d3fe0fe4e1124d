//! # Authorization Performer
//!
//! Resolves "what is the current authorization status" exactly once, even
//! though the platform may answer with a stale cached echo, a fresh user
//! decision, or nothing at all.
//!
//! ## The disambiguation heuristic
//!
//! Shortly after a listener attaches, platforms re-report the *cached*
//! authorization status through the same delegate callback that carries
//! fresh decisions. The two are told apart by focus timing: a real
//! permission dialog steals foreground focus from the app, a cached echo
//! does not. The performer therefore races two branches:
//!
//! - **Grace branch**: sleep a short interval (the `dialog_grace` tunable,
//!   300 ms by default). If the app never resigned active focus by then, no
//!   dialog appeared and no fresh decision is coming — resolve with the
//!   baseline status captured at construction.
//! - **Event branch**: on an `AuthorizationChange` whose status is a real
//!   decision (anything but `NotDetermined`): if the app did resign focus, a
//!   dialog was up — wait until the app becomes active again (dialog fully
//!   dismissed) before resolving with the event's status; otherwise resolve
//!   immediately.
//!
//! Whichever branch runs first wins the slot's first-writer-wins cell and
//! neutralizes the other; either way the performer deregisters itself
//! through its weak registry handle afterwards.

use crate::correlation::PerformerRegistry;
use crate::monitor::ForegroundMonitor;
use crate::performers::{LocationPerformer, PerformerId, RequestKind};
use crate::resolution::ResolutionSlot;
use bridge_traits::lifecycle::LifecycleSignalSource;
use bridge_traits::provider::{AuthorizationStatus, EventKind, ProviderEvent};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const INTERESTS: &[EventKind] = &[EventKind::AuthorizationChange];

/// Performer answering one authorization-status request.
pub struct AuthorizationPerformer {
    id: PerformerId,
    /// Status known before the fresh request was issued; the answer when no
    /// dialog appears. `NotDetermined` is a legitimate baseline.
    baseline: AuthorizationStatus,
    dialog_grace: Duration,
    monitor: Arc<ForegroundMonitor>,
    slot: Mutex<Option<ResolutionSlot<AuthorizationStatus>>>,
    registry: Weak<PerformerRegistry>,
    /// Cancelled by whichever branch claims resolution first, and by
    /// `cancel()`.
    race: CancellationToken,
}

impl AuthorizationPerformer {
    /// Creates a performer with the baseline status and the lifecycle source
    /// the focus heuristic observes.
    pub fn new(
        baseline: AuthorizationStatus,
        dialog_grace: Duration,
        signals: Arc<dyn LifecycleSignalSource>,
        registry: Weak<PerformerRegistry>,
    ) -> Self {
        Self {
            id: PerformerId::new(),
            baseline,
            dialog_grace,
            monitor: Arc::new(ForegroundMonitor::new(signals)),
            slot: Mutex::new(None),
            registry,
            race: CancellationToken::new(),
        }
    }

    /// Attaches the resolution slot the caller is awaiting and immediately
    /// begins the start sequence (focus monitoring plus the grace timer).
    pub fn link_resolution(self: &Arc<Self>, slot: ResolutionSlot<AuthorizationStatus>) {
        *self.slot.lock() = Some(slot);
        self.start();
    }

    /// Starts focus monitoring and spawns the grace branch.
    fn start(self: &Arc<Self>) {
        self.monitor.start_monitoring();

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = this.race.cancelled() => {
                    // The event branch claimed resolution (and owns monitor
                    // teardown), or the performer was cancelled outright.
                }
                _ = sleep(this.dialog_grace) => {
                    if this.monitor.has_resigned_active() {
                        // Focus was lost: a permission dialog is plausibly on
                        // screen, so a fresh decision may still arrive. Leave
                        // resolution to the event branch.
                        debug!(id = %this.id, "focus lost within grace; awaiting fresh decision");
                        return;
                    }
                    debug!(
                        id = %this.id,
                        baseline = %this.baseline,
                        "no focus change within grace; answering with baseline"
                    );
                    this.monitor.stop_monitoring();
                    this.finish(this.baseline);
                }
            }
        });
    }

    /// Writes `status` into the slot (first writer wins) and deregisters.
    /// Deregistration happens even when the slot was already consumed.
    fn finish(&self, status: AuthorizationStatus) {
        match self.slot.lock().take() {
            Some(slot) => {
                if !slot.resolve(status) {
                    debug!(id = %self.id, "authorization slot already consumed");
                }
            }
            None => debug!(id = %self.id, "no resolution slot linked"),
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.deregister(self.id);
        }
    }
}

impl LocationPerformer for AuthorizationPerformer {
    fn id(&self) -> PerformerId {
        self.id
    }

    fn kind(&self) -> RequestKind {
        RequestKind::Authorization
    }

    fn interests(&self) -> &[EventKind] {
        INTERESTS
    }

    fn on_event(&self, event: &ProviderEvent) {
        let ProviderEvent::AuthorizationChange { status } = event else {
            return;
        };
        if !status.is_determined() {
            // Not a terminal user decision; never resolve on it.
            debug!(id = %self.id, "ignoring not_determined authorization echo");
            return;
        }

        // This branch owns resolution now; neutralize the grace timer.
        self.race.cancel();

        let status = *status;
        let monitor = Arc::clone(&self.monitor);
        let slot = self.slot.lock().clone();
        let registry = self.registry.clone();
        let id = self.id;
        tokio::spawn(async move {
            if monitor.has_resigned_active() {
                // A dialog stole focus; wait for it to be fully dismissed so
                // the caller resumes into a foregrounded app.
                monitor.observe_became_active().await;
            }
            monitor.stop_monitoring();

            match slot {
                Some(slot) => {
                    if !slot.resolve(status) {
                        debug!(%id, "authorization slot already consumed");
                    }
                }
                None => debug!(%id, "no resolution slot linked"),
            }
            if let Some(registry) = registry.upgrade() {
                registry.deregister(id);
            }
        });
    }

    fn cancel(&self) {
        self.race.cancel();
        self.monitor.stop_monitoring();
    }
}
