//! # Performer Registry
//!
//! Correlation table between provider delegate events and the performers
//! waiting on them.
//!
//! ## Overview
//!
//! Every in-flight performer is registered here under its stable identity
//! together with its declared interest set. When the provider reports an
//! event, [`dispatch`](PerformerRegistry::dispatch) fans it out to every
//! registered performer whose interest set contains the event's kind — and
//! nothing else. The registry is a pure fan-out step: it never awaits a
//! performer and makes no ordering guarantee between them.
//!
//! Entries are removed by the dispatcher (or by the performer itself through
//! its weak handle) as soon as the request resolves or is cancelled, so the
//! table never keeps a performer alive past its intended lifetime.

use crate::performers::{LocationPerformer, PerformerId};
use bridge_traits::provider::ProviderEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Identity-keyed table of live performers with interest-filtered fan-out.
#[derive(Default)]
pub struct PerformerRegistry {
    entries: Mutex<HashMap<PerformerId, Arc<dyn LocationPerformer>>>,
}

impl PerformerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a performer keyed by its identity.
    ///
    /// An identity collision replaces the prior entry; the caller is
    /// responsible for having cancelled the replaced performer first.
    pub fn register(&self, performer: Arc<dyn LocationPerformer>) {
        let id = performer.id();
        let kind = performer.kind();
        if self.entries.lock().insert(id, performer).is_some() {
            debug!(%id, %kind, "replaced performer with colliding identity");
        } else {
            trace!(%id, %kind, "registered performer");
        }
    }

    /// Removes the entry for `id`. No-op when absent.
    pub fn deregister(&self, id: PerformerId) {
        if self.entries.lock().remove(&id).is_some() {
            trace!(%id, "deregistered performer");
        }
    }

    /// Delivers `event` to every registered performer whose interest set
    /// contains the event's kind, in unspecified order.
    ///
    /// Performers are invoked outside the table lock and never awaited;
    /// anything async a performer needs to do happens on tasks it spawns
    /// itself.
    pub fn dispatch(&self, event: &ProviderEvent) {
        let kind = event.kind();
        let interested: Vec<Arc<dyn LocationPerformer>> = self
            .entries
            .lock()
            .values()
            .filter(|performer| performer.wants(kind))
            .cloned()
            .collect();

        trace!(?kind, performers = interested.len(), "dispatching event");
        for performer in interested {
            performer.on_event(event);
        }
    }

    /// Removes and returns every entry; used on manager shutdown so each
    /// performer can be cancelled.
    pub fn drain(&self) -> Vec<Arc<dyn LocationPerformer>> {
        self.entries.lock().drain().map(|(_, p)| p).collect()
    }

    /// Number of currently registered performers.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no performer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performers::RequestKind;
    use bridge_traits::provider::{AuthorizationStatus, EventKind};

    struct RecordingPerformer {
        id: PerformerId,
        interests: Vec<EventKind>,
        seen: Mutex<Vec<ProviderEvent>>,
    }

    impl RecordingPerformer {
        fn new(interests: Vec<EventKind>) -> Arc<Self> {
            Arc::new(Self {
                id: PerformerId::new(),
                interests,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen_count(&self) -> usize {
            self.seen.lock().len()
        }
    }

    impl LocationPerformer for RecordingPerformer {
        fn id(&self) -> PerformerId {
            self.id
        }

        fn kind(&self) -> RequestKind {
            RequestKind::Authorization
        }

        fn interests(&self) -> &[EventKind] {
            &self.interests
        }

        fn on_event(&self, event: &ProviderEvent) {
            self.seen.lock().push(event.clone());
        }

        fn cancel(&self) {}
    }

    fn auth_event() -> ProviderEvent {
        ProviderEvent::AuthorizationChange {
            status: AuthorizationStatus::Denied,
        }
    }

    #[test]
    fn test_dispatch_respects_interest_sets() {
        let registry = PerformerRegistry::new();
        let auth = RecordingPerformer::new(vec![EventKind::AuthorizationChange]);
        let fixes = RecordingPerformer::new(vec![
            EventKind::LocationUpdate,
            EventKind::LocationFailure,
        ]);
        registry.register(auth.clone());
        registry.register(fixes.clone());

        registry.dispatch(&auth_event());
        registry.dispatch(&ProviderEvent::LocationFailure {
            message: "denied".to_string(),
        });

        assert_eq!(auth.seen_count(), 1);
        assert_eq!(fixes.seen_count(), 1);
    }

    #[test]
    fn test_dispatch_with_no_interested_performers_is_noop() {
        let registry = PerformerRegistry::new();
        registry.dispatch(&auth_event());

        let fixes = RecordingPerformer::new(vec![EventKind::LocationUpdate]);
        registry.register(fixes.clone());
        registry.dispatch(&auth_event());
        assert_eq!(fixes.seen_count(), 0);
    }

    #[test]
    fn test_deregister_absent_id_is_noop() {
        let registry = PerformerRegistry::new();
        registry.deregister(PerformerId::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_colliding_identity_replaces() {
        let registry = PerformerRegistry::new();
        let first = RecordingPerformer::new(vec![EventKind::AuthorizationChange]);
        // Second performer with the same identity.
        let second = Arc::new(RecordingPerformer {
            id: first.id,
            interests: vec![EventKind::AuthorizationChange],
            seen: Mutex::new(Vec::new()),
        });

        registry.register(first.clone());
        registry.register(second.clone());
        assert_eq!(registry.len(), 1);

        registry.dispatch(&auth_event());
        assert_eq!(first.seen_count(), 0);
        assert_eq!(second.seen_count(), 1);
    }

    #[test]
    fn test_drain_empties_registry() {
        let registry = PerformerRegistry::new();
        registry.register(RecordingPerformer::new(vec![EventKind::AuthorizationChange]));
        registry.register(RecordingPerformer::new(vec![EventKind::LocationUpdate]));

        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert!(registry.is_empty());
    }
}
