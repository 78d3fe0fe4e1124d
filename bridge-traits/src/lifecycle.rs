//! Application Lifecycle Signals
//!
//! Exposes the host process's foreground/background transitions to the core.
//!
//! The core uses these two signals to tell a fresh user permission decision
//! apart from a cached one: a system permission dialog steals foreground
//! focus, so "the app resigned active and later became active again" is the
//! fingerprint of a dialog having been shown.
//!
//! # Platform Support
//!
//! - **iOS**: `willResignActiveNotification` / `didBecomeActiveNotification`
//! - **Android**: Activity `onPause` / `onResume`
//! - **Desktop**: window focus events (often a no-op source)
//!
//! # Example
//!
//! ```ignore
//! use bridge_traits::lifecycle::{LifecycleSignal, LifecycleSignalSource};
//!
//! async fn wait_for_resign(source: &dyn LifecycleSignalSource) -> bridge_traits::error::Result<()> {
//!     let mut stream = source.subscribe(LifecycleSignal::WillResignActive).await?;
//!     stream.next().await;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A host-process lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleSignal {
    /// The process is about to lose foreground focus.
    WillResignActive,
    /// The process (re)gained foreground focus.
    DidBecomeActive,
}

/// Lifecycle signal source trait
///
/// Each subscription is independent: subscribing to `WillResignActive` must
/// not consume or affect `DidBecomeActive` deliveries. Signals may repeat for
/// the lifetime of a subscription; consumers decide how many occurrences
/// they care about.
#[async_trait::async_trait]
pub trait LifecycleSignalSource: Send + Sync {
    /// Subscribe to occurrences of one lifecycle signal.
    ///
    /// Returns `BridgeError::NotAvailable` on hosts that cannot observe the
    /// transition (e.g. headless processes).
    async fn subscribe(&self, signal: LifecycleSignal) -> Result<Box<dyn LifecycleSignalStream>>;
}

/// Stream of occurrences of a single lifecycle signal.
#[async_trait::async_trait]
pub trait LifecycleSignalStream: Send {
    /// Wait for the next occurrence.
    ///
    /// Returns `None` when the source shuts the stream down.
    async fn next(&mut self) -> Option<LifecycleSignal>;
}
