//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the location core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be implemented differently per platform:
//!
//! - [`LocationProvider`](provider::LocationProvider) - Delegate-based
//!   location service: authorization and fix requests plus the event stream
//!   their results come back on
//! - [`LifecycleSignalSource`](lifecycle::LifecycleSignalSource) - Host
//!   foreground/background transition signals
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations should convert platform-specific errors to
//! `BridgeError` and provide actionable messages.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks. Implementations must ensure thread safety.

pub mod error;
pub mod lifecycle;
pub mod provider;

pub use error::BridgeError;

// Re-export commonly used types
pub use lifecycle::{LifecycleSignal, LifecycleSignalSource, LifecycleSignalStream};
pub use provider::{
    AuthorizationStatus, EventKind, LocationFix, LocationProvider, ProviderEvent,
    ProviderEventStream,
};
