//! # Location Manager
//!
//! Request dispatcher bridging the provider's delegate event stream to
//! suspend-style request/response calls.
//!
//! ## Overview
//!
//! The `LocationManager` turns "ask the platform and wait for whichever
//! delegate callback answers" into a single awaited call. Per request it:
//!
//! 1. Creates the matching performer and a resolution slot pair
//! 2. Supersedes any in-flight request of the same kind (the prior caller
//!    observes `Cancelled`)
//! 3. Registers the performer in the correlation registry, links the slot
//!    (which starts the performer), and triggers the provider
//! 4. Suspends the caller on the slot until the performer resolves it, the
//!    hard resolution timeout elapses, or the caller walks away
//! 5. Deregisters and cancels the performer on every exit path
//!
//! A background pump task pulls the provider's event stream and fans each
//! event through the registry; it is the only intake point for delegate
//! events.
//!
//! ## Cancellation
//!
//! Dropping the future returned by a request method cancels it: an RAII
//! guard deregisters and cancels the performer, so an abandoned request
//! never leaks a registered performer. Dropping the manager itself cancels
//! the pump and every in-flight request.
//!
//! ## Usage
//!
//! ```ignore
//! use core_location::{LocationManager, ManagerConfig};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     provider: Arc<dyn bridge_traits::LocationProvider>,
//! #     signals: Arc<dyn bridge_traits::LifecycleSignalSource>,
//! # ) -> core_location::Result<()> {
//! let manager = LocationManager::new(provider, signals);
//!
//! let status = manager.request_authorization().await?;
//! println!("authorization: {status}");
//!
//! let fix = manager.request_location().await?;
//! println!("at {}, {}", fix.latitude, fix.longitude);
//! # Ok(())
//! # }
//! ```

use crate::config::ManagerConfig;
use crate::correlation::PerformerRegistry;
use crate::error::{LocationError, Result};
use crate::performers::{
    AuthorizationPerformer, CurrentLocationPerformer, LocationPerformer, PerformerId, RequestKind,
};
use crate::resolution::{self, PendingResolution};
use bridge_traits::lifecycle::LifecycleSignalSource;
use bridge_traits::provider::{AuthorizationStatus, LocationFix, LocationProvider};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

/// One in-flight logical request, tracked for supersede and shutdown.
struct InFlight {
    id: PerformerId,
    performer: Arc<dyn LocationPerformer>,
    /// Abandons the request's slot so its caller observes `Cancelled`.
    abandon: Box<dyn Fn() + Send + Sync>,
}

/// Dispatcher turning delegate callbacks into awaited request outcomes.
pub struct LocationManager {
    provider: Arc<dyn LocationProvider>,
    signals: Arc<dyn LifecycleSignalSource>,
    registry: Arc<PerformerRegistry>,
    config: ManagerConfig,
    in_flight: Mutex<HashMap<RequestKind, InFlight>>,
    pump: CancellationToken,
}

impl LocationManager {
    /// Creates a manager with the default configuration and starts the
    /// event pump.
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        signals: Arc<dyn LifecycleSignalSource>,
    ) -> Self {
        Self::with_config(provider, signals, ManagerConfig::default())
    }

    /// Creates a manager with an explicit configuration.
    pub fn with_config(
        provider: Arc<dyn LocationProvider>,
        signals: Arc<dyn LifecycleSignalSource>,
        config: ManagerConfig,
    ) -> Self {
        let manager = Self {
            provider,
            signals,
            registry: Arc::new(PerformerRegistry::new()),
            config,
            in_flight: Mutex::new(HashMap::new()),
            pump: CancellationToken::new(),
        };
        manager.spawn_event_pump();
        manager
    }

    /// Snapshot of the provider's cached authorization status.
    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.provider.authorization_status()
    }

    /// Number of performers currently registered. Zero when no request is
    /// in flight.
    pub fn active_performers(&self) -> usize {
        self.registry.len()
    }

    /// Requests the current authorization status and suspends until it is
    /// known.
    ///
    /// The result is either a fresh user decision (reported by the platform
    /// after a permission dialog) or, when no dialog appears within the
    /// configured grace interval, the status that was already in effect.
    ///
    /// # Errors
    ///
    /// - `LocationError::Cancelled` - superseded by a newer request or the
    ///   manager shut down
    /// - `LocationError::ResolutionTimeout` - the hard fallback bound
    ///   elapsed without any resolution
    /// - `LocationError::Bridge` - the provider rejected the trigger call
    #[instrument(skip(self))]
    pub async fn request_authorization(&self) -> Result<AuthorizationStatus> {
        let baseline = self.provider.authorization_status();
        debug!(%baseline, "authorization requested");

        let performer = Arc::new(AuthorizationPerformer::new(
            baseline,
            self.config.dialog_grace,
            Arc::clone(&self.signals),
            Arc::downgrade(&self.registry),
        ));
        let (slot, pending) = resolution::pending();

        self.admit(RequestKind::Authorization, performer.clone(), {
            let slot = slot.clone();
            Box::new(move || slot.abandon())
        });
        // Link before registering: an event dispatched to a slotless
        // performer could deregister it without resolving anything.
        performer.link_resolution(slot);
        self.registry.register(performer.clone());

        let _guard = RequestGuard {
            manager: self,
            kind: RequestKind::Authorization,
            id: performer.id(),
            performer: performer.clone(),
        };
        self.provider.request_authorization().await?;
        self.await_resolution(pending).await
    }

    /// Requests a single location fix and suspends until the provider
    /// reports one (or a failure).
    ///
    /// # Errors
    ///
    /// - `LocationError::Provider` - the platform failed to produce a fix
    /// - `LocationError::Cancelled` / `ResolutionTimeout` / `Bridge` - as
    ///   for [`request_authorization`](Self::request_authorization)
    #[instrument(skip(self))]
    pub async fn request_location(&self) -> Result<LocationFix> {
        let performer = Arc::new(CurrentLocationPerformer::new(Arc::downgrade(
            &self.registry,
        )));
        let (slot, pending) = resolution::pending();

        self.admit(RequestKind::CurrentLocation, performer.clone(), {
            let slot = slot.clone();
            Box::new(move || slot.abandon())
        });
        performer.link_resolution(slot);
        self.registry.register(performer.clone());

        let _guard = RequestGuard {
            manager: self,
            kind: RequestKind::CurrentLocation,
            id: performer.id(),
            performer: performer.clone(),
        };
        self.provider.request_location().await?;
        self.await_resolution(pending).await
    }

    /// Tears down the pump and every in-flight request. Suspended callers
    /// observe `Cancelled`. Called automatically on drop.
    pub fn shutdown(&self) {
        self.pump.cancel();

        let drained: Vec<InFlight> = {
            let mut in_flight = self.in_flight.lock();
            in_flight.drain().map(|(_, entry)| entry).collect()
        };
        for entry in drained {
            self.registry.deregister(entry.id);
            entry.performer.cancel();
            (entry.abandon)();
        }
        for performer in self.registry.drain() {
            performer.cancel();
        }
    }

    /// Tracks a new in-flight request, superseding any prior request of the
    /// same kind: the prior performer is deregistered and cancelled and its
    /// caller observes `Cancelled`.
    fn admit(
        &self,
        kind: RequestKind,
        performer: Arc<dyn LocationPerformer>,
        abandon: Box<dyn Fn() + Send + Sync>,
    ) {
        let entry = InFlight {
            id: performer.id(),
            performer,
            abandon,
        };
        let prior = self.in_flight.lock().insert(kind, entry);
        if let Some(prior) = prior {
            warn!(%kind, prior = %prior.id, "superseding in-flight request");
            self.registry.deregister(prior.id);
            prior.performer.cancel();
            (prior.abandon)();
        }
    }

    /// Removes the in-flight entry for `kind` if it still belongs to `id`
    /// (a superseding request may have replaced it already).
    fn settle(&self, kind: RequestKind, id: PerformerId) {
        let mut in_flight = self.in_flight.lock();
        if in_flight.get(&kind).map(|entry| entry.id) == Some(id) {
            in_flight.remove(&kind);
        }
    }

    /// Awaits the slot, bounded by the configured hard resolution timeout.
    async fn await_resolution<T>(&self, pending: PendingResolution<T>) -> Result<T> {
        match self.config.resolution_timeout {
            Some(bound) => match tokio::time::timeout(bound, pending.outcome()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(?bound, "request hit hard resolution timeout");
                    Err(LocationError::ResolutionTimeout { timeout: bound })
                }
            },
            None => pending.outcome().await,
        }
    }

    /// Spawns the pump feeding provider events into the registry.
    fn spawn_event_pump(&self) {
        let provider = Arc::clone(&self.provider);
        let registry = Arc::clone(&self.registry);
        let token = self.pump.clone();

        tokio::spawn(async move {
            let mut stream = tokio::select! {
                _ = token.cancelled() => return,
                subscribed = provider.subscribe_events() => match subscribed {
                    Ok(stream) => stream,
                    Err(error) => {
                        warn!(%error, "provider event stream unavailable; requests can only resolve via grace or timeout");
                        return;
                    }
                },
            };

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = stream.next() => match event {
                        Some(event) => {
                            trace!(kind = ?event.kind(), "dispatching provider event");
                            registry.dispatch(&event);
                        }
                        None => {
                            debug!("provider event stream ended");
                            break;
                        }
                    },
                }
            }
        });
    }
}

impl Drop for LocationManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Cleans up a request on every exit path: normal resolution (where both
/// steps are no-ops), timeout, and caller abandonment.
struct RequestGuard<'a> {
    manager: &'a LocationManager,
    kind: RequestKind,
    id: PerformerId,
    performer: Arc<dyn LocationPerformer>,
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.manager.registry.deregister(self.id);
        self.performer.cancel();
        self.manager.settle(self.kind, self.id);
    }
}
