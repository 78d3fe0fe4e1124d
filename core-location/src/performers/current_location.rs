//! One-shot location fix performer.
//!
//! Resolves "give me one location fix" from the first matching delegate
//! event: a batch of fixes answers with the most recent one, a failure
//! answers with a provider error through the same exactly-once slot path.
//! No focus heuristic is involved; fixes carry no cached-echo ambiguity.

use crate::correlation::PerformerRegistry;
use crate::error::LocationError;
use crate::performers::{LocationPerformer, PerformerId, RequestKind};
use crate::resolution::ResolutionSlot;
use bridge_traits::provider::{EventKind, LocationFix, ProviderEvent};
use parking_lot::Mutex;
use std::sync::Weak;
use tracing::debug;

const INTERESTS: &[EventKind] = &[EventKind::LocationUpdate, EventKind::LocationFailure];

/// Performer answering one current-location request.
pub struct CurrentLocationPerformer {
    id: PerformerId,
    slot: Mutex<Option<ResolutionSlot<LocationFix>>>,
    registry: Weak<PerformerRegistry>,
}

impl CurrentLocationPerformer {
    pub fn new(registry: Weak<PerformerRegistry>) -> Self {
        Self {
            id: PerformerId::new(),
            slot: Mutex::new(None),
            registry,
        }
    }

    /// Attaches the resolution slot the caller is awaiting. There is no
    /// start sequence: the first matching event settles the request.
    pub fn link_resolution(&self, slot: ResolutionSlot<LocationFix>) {
        *self.slot.lock() = Some(slot);
    }

    fn finish(&self, outcome: Result<LocationFix, LocationError>) {
        match self.slot.lock().take() {
            Some(slot) => {
                let delivered = match outcome {
                    Ok(fix) => slot.resolve(fix),
                    Err(error) => slot.fail(error),
                };
                if !delivered {
                    debug!(id = %self.id, "location slot already consumed");
                }
            }
            None => debug!(id = %self.id, "no resolution slot linked"),
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.deregister(self.id);
        }
    }
}

impl LocationPerformer for CurrentLocationPerformer {
    fn id(&self) -> PerformerId {
        self.id
    }

    fn kind(&self) -> RequestKind {
        RequestKind::CurrentLocation
    }

    fn interests(&self) -> &[EventKind] {
        INTERESTS
    }

    fn on_event(&self, event: &ProviderEvent) {
        match event {
            ProviderEvent::LocationUpdate { fixes } => match fixes.last() {
                Some(fix) => self.finish(Ok(*fix)),
                // Platforms should not report empty batches; wait for a
                // real one.
                None => debug!(id = %self.id, "ignoring empty fix batch"),
            },
            ProviderEvent::LocationFailure { message } => {
                self.finish(Err(LocationError::Provider(message.clone())));
            }
            ProviderEvent::AuthorizationChange { .. } => {}
        }
    }

    fn cancel(&self) {
        // Nothing running in the background; the dispatcher handles slot
        // abandonment.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution;

    fn fix(latitude: f64) -> LocationFix {
        LocationFix {
            latitude,
            longitude: 8.54,
            timestamp_ms: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_resolves_with_most_recent_fix() {
        let performer = CurrentLocationPerformer::new(Weak::new());
        let (slot, pending) = resolution::pending();
        performer.link_resolution(slot);

        performer.on_event(&ProviderEvent::LocationUpdate {
            fixes: vec![fix(47.37), fix(47.38)],
        });

        let resolved = pending.outcome().await.unwrap();
        assert_eq!(resolved.latitude, 47.38);
    }

    #[tokio::test]
    async fn test_failure_resolves_with_provider_error() {
        let performer = CurrentLocationPerformer::new(Weak::new());
        let (slot, pending) = resolution::pending();
        performer.link_resolution(slot);

        performer.on_event(&ProviderEvent::LocationFailure {
            message: "kCLErrorLocationUnknown".to_string(),
        });

        match pending.outcome().await {
            Err(LocationError::Provider(message)) => {
                assert_eq!(message, "kCLErrorLocationUnknown");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_event_is_ignored() {
        let performer = CurrentLocationPerformer::new(Weak::new());
        let (slot, pending) = resolution::pending();
        performer.link_resolution(slot);

        performer.on_event(&ProviderEvent::LocationUpdate {
            fixes: vec![fix(47.37)],
        });
        performer.on_event(&ProviderEvent::LocationFailure {
            message: "late".to_string(),
        });

        assert_eq!(pending.outcome().await.unwrap().latitude, 47.37);
    }

    #[tokio::test]
    async fn test_empty_batch_leaves_request_pending() {
        let performer = CurrentLocationPerformer::new(Weak::new());
        let (slot, pending) = resolution::pending();
        performer.link_resolution(slot.clone());

        performer.on_event(&ProviderEvent::LocationUpdate { fixes: vec![] });
        assert!(slot.is_pending());

        performer.on_event(&ProviderEvent::LocationUpdate {
            fixes: vec![fix(47.4)],
        });
        assert_eq!(pending.outcome().await.unwrap().latitude, 47.4);
    }
}
