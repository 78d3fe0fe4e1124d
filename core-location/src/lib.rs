//! # Location Platform Core
//!
//! Bridges a callback/delegate-based platform location API to async/await
//! request-response calls: one request, one resolved result, even though the
//! platform answers through repeated, unordered, or absent delegate
//! callbacks.
//!
//! # Architecture
//!
//! - [`manager::LocationManager`] - dispatcher: one awaited call per logical
//!   request, with supersede, cancellation, and hard-timeout handling
//! - [`correlation::PerformerRegistry`] - fans provider events out to the
//!   performers interested in them
//! - [`performers`] - per-request decision logic (authorization status,
//!   current location fix)
//! - [`monitor::ForegroundMonitor`] - foreground/background latches backing
//!   the fresh-decision-vs-cached-echo heuristic
//! - [`resolution`] - first-writer-wins single-assignment slots
//!
//! Platform capabilities (the real location bindings and lifecycle
//! notifications) are injected through the `bridge-traits` crate.
//!
//! # Examples
//!
//! ```ignore
//! use core_location::LocationManager;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     provider: Arc<dyn bridge_traits::LocationProvider>,
//! #     signals: Arc<dyn bridge_traits::LifecycleSignalSource>,
//! # ) -> core_location::Result<()> {
//! let manager = LocationManager::new(provider, signals);
//! let status = manager.request_authorization().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod correlation;
pub mod error;
pub mod manager;
pub mod monitor;
pub mod performers;
pub mod resolution;

// Re-export commonly used types
pub use config::ManagerConfig;
pub use error::{LocationError, Result};
pub use manager::LocationManager;
pub use performers::{PerformerId, RequestKind};
