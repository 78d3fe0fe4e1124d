//! Request performers.
//!
//! A performer mediates one in-flight logical request between the awaiting
//! caller and the provider's delegate event stream: it declares which event
//! kinds it cares about, decides when an incoming event (or the absence of
//! one) answers the request, and writes that answer into its resolution slot
//! exactly once.
//!
//! Performers are owned by the [`LocationManager`](crate::manager::LocationManager)
//! and receive events through the
//! [`PerformerRegistry`](crate::correlation::PerformerRegistry); they hold
//! only a weak handle back to the registry so an abandoned performer can
//! never keep its owner alive.

use bridge_traits::provider::{EventKind, ProviderEvent};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod authorization;
pub mod current_location;

pub use authorization::AuthorizationPerformer;
pub use current_location::CurrentLocationPerformer;

/// Unique identity of a performer, stable for its lifetime.
///
/// # Examples
///
/// ```
/// use core_location::performers::PerformerId;
///
/// let id = PerformerId::new();
/// assert_ne!(id, PerformerId::new());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerformerId(Uuid);

impl PerformerId {
    /// Create a new random performer ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PerformerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PerformerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The logical request kind a performer answers.
///
/// At most one performer per kind is in flight at a time; issuing a new
/// request of the same kind supersedes the previous performer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// "What is the current authorization status?"
    Authorization,
    /// "Give me one location fix."
    CurrentLocation,
}

impl RequestKind {
    /// Stable identifier string, used for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Authorization => "authorization",
            RequestKind::CurrentLocation => "current_location",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A performer mediating one in-flight logical request.
///
/// `on_event` is a synchronous entry point: the registry fans events out
/// without awaiting anyone, and a performer that needs to do async work in
/// response (e.g. wait for a lifecycle signal) spawns it internally.
pub trait LocationPerformer: Send + Sync {
    /// Stable identity for registration and deregistration.
    fn id(&self) -> PerformerId;

    /// The request kind this performer answers.
    fn kind(&self) -> RequestKind;

    /// The non-empty set of event kinds this performer wants delivered.
    fn interests(&self) -> &[EventKind];

    /// Whether an event of `kind` should be delivered to this performer.
    fn wants(&self, kind: EventKind) -> bool {
        self.interests().contains(&kind)
    }

    /// Deliver one provider event. Must not assume any dispatch order
    /// relative to other performers.
    fn on_event(&self, event: &ProviderEvent);

    /// Tear down background work. Never force-resolves the slot; slot
    /// abandonment is the dispatcher's responsibility. Idempotent.
    fn cancel(&self);
}
