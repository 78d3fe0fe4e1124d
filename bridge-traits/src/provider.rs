//! Location Provider Capability
//!
//! Abstracts the platform's delegate-based location service.
//!
//! The host owns the real location bindings (permission prompts, GPS fixes)
//! and reports everything that happens through a single stream of
//! [`ProviderEvent`]s. The core never talks to the platform API directly: it
//! asks the provider to kick off an operation (`request_authorization`,
//! `request_location`) and then waits for the matching event to come back on
//! the stream. Delegate callbacks may repeat, arrive out of order relative to
//! the request, or never arrive at all — correlating them back to the caller
//! is the core's job, not the provider's.
//!
//! # Platform Notes
//!
//! - **iOS/macOS**: CLLocationManager delegate callbacks
//! - **Android**: FusedLocationProviderClient listeners
//! - **Desktop**: GeoClue or CoreLocation shims (often permission-less)
//!
//! # Example
//!
//! ```ignore
//! use bridge_traits::provider::{LocationProvider, ProviderEvent};
//!
//! async fn pump(provider: &dyn LocationProvider) -> bridge_traits::error::Result<()> {
//!     let mut events = provider.subscribe_events().await?;
//!     while let Some(event) = events.next().await {
//!         println!("provider reported: {}", event.description());
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Platform authorization status for location access.
///
/// Mirrors the platform permission model. `NotDetermined` is the only value
/// with privileged meaning to the core: it marks a status that is not a
/// terminal user decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    /// The user has not yet been asked.
    NotDetermined,
    /// Access is blocked by policy (parental controls, MDM) and the user
    /// cannot change it.
    Restricted,
    /// The user explicitly declined.
    Denied,
    /// Access granted at all times, including in the background.
    AuthorizedAlways,
    /// Access granted while the app is in use.
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    /// Whether this status reflects a decision the user (or policy) has
    /// actually made, as opposed to the never-asked default.
    pub fn is_determined(&self) -> bool {
        !matches!(self, AuthorizationStatus::NotDetermined)
    }

    /// Stable identifier string, used for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationStatus::NotDetermined => "not_determined",
            AuthorizationStatus::Restricted => "restricted",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::AuthorizedAlways => "authorized_always",
            AuthorizationStatus::AuthorizedWhenInUse => "authorized_when_in_use",
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single location fix as reported by the platform.
///
/// Deliberately minimal: accuracy classes, heading, and speed are host
/// concerns and stay on the host side of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Degrees, WGS84.
    pub latitude: f64,
    /// Degrees, WGS84.
    pub longitude: f64,
    /// When the platform produced the fix, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

/// Discriminant for [`ProviderEvent`], used as the interest key during
/// event fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    AuthorizationChange,
    LocationUpdate,
    LocationFailure,
}

/// An event reported by the platform location delegate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ProviderEvent {
    /// The authorization status changed (or was re-reported).
    ///
    /// Platforms echo the *cached* status shortly after a listener attaches,
    /// so receiving this event does not by itself mean the user just made a
    /// decision.
    AuthorizationChange {
        /// The status now in effect.
        status: AuthorizationStatus,
    },
    /// One or more location fixes were produced.
    LocationUpdate {
        /// Fixes in the order the platform reported them; the last entry is
        /// the most recent.
        fixes: Vec<LocationFix>,
    },
    /// The platform failed to produce a fix.
    LocationFailure {
        /// Platform-reported reason.
        message: String,
    },
}

impl ProviderEvent {
    /// The interest key this event is dispatched under.
    pub fn kind(&self) -> EventKind {
        match self {
            ProviderEvent::AuthorizationChange { .. } => EventKind::AuthorizationChange,
            ProviderEvent::LocationUpdate { .. } => EventKind::LocationUpdate,
            ProviderEvent::LocationFailure { .. } => EventKind::LocationFailure,
        }
    }

    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            ProviderEvent::AuthorizationChange { .. } => "Authorization status changed",
            ProviderEvent::LocationUpdate { .. } => "Location fixes received",
            ProviderEvent::LocationFailure { .. } => "Location fetch failed",
        }
    }
}

/// Location provider capability trait
///
/// Implemented once per platform. All methods are cheap triggers: the
/// results of `request_authorization` and `request_location` arrive later as
/// [`ProviderEvent`]s on the stream returned by `subscribe_events`, never as
/// return values.
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    /// Snapshot of the currently cached authorization status.
    ///
    /// This is the baseline a fresh authorization request starts from; it
    /// may legitimately be `NotDetermined`.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the platform to request location authorization from the user.
    ///
    /// May or may not present a system dialog; the outcome (fresh decision
    /// or cached echo) is reported as an `AuthorizationChange` event.
    async fn request_authorization(&self) -> Result<()>;

    /// Ask the platform for a single location fix.
    ///
    /// The fix (or failure) is reported as a `LocationUpdate` /
    /// `LocationFailure` event.
    async fn request_location(&self) -> Result<()>;

    /// Subscribe to the delegate event stream.
    ///
    /// Events emitted before the subscription are not replayed.
    async fn subscribe_events(&self) -> Result<Box<dyn ProviderEventStream>>;
}

/// Stream of provider delegate events.
#[async_trait::async_trait]
pub trait ProviderEventStream: Send {
    /// Get the next delegate event.
    ///
    /// Returns `None` when the provider shuts the stream down.
    async fn next(&mut self) -> Option<ProviderEvent>;
}
