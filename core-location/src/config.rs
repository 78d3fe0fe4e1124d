//! # Manager Configuration
//!
//! Tunables for the location manager, constructed through a validating
//! builder.
//!
//! ## Overview
//!
//! Two durations control the dispatcher's behavior:
//!
//! - `dialog_grace` - how long an authorization request waits for the app to
//!   lose foreground focus before concluding that no system permission
//!   dialog appeared and the cached status is the answer. The 300 ms default
//!   is a heuristic tied to platform dialog-presentation timing, not derived
//!   from any system signal; hosts on slow devices may need to raise it.
//! - `resolution_timeout` - hard upper bound on how long any request may
//!   stay suspended. Protects against providers that never emit an event on
//!   platforms where the feature is unavailable. `None` disables the bound
//!   and restores an indefinite wait.
//!
//! ## Usage
//!
//! ```
//! use core_location::config::ManagerConfig;
//! use std::time::Duration;
//!
//! let config = ManagerConfig::builder()
//!     .dialog_grace(Duration::from_millis(500))
//!     .resolution_timeout(Some(Duration::from_secs(30)))
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::{LocationError, Result};
use std::time::Duration;

/// Default grace interval before a cached authorization status is treated as
/// the answer (no dialog appeared).
pub const DEFAULT_DIALOG_GRACE: Duration = Duration::from_millis(300);

/// Default hard bound on request resolution (1 minute).
pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`LocationManager`](crate::manager::LocationManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Grace interval the authorization performer waits for a focus loss.
    pub dialog_grace: Duration,

    /// Hard fallback bound on every request await; `None` means unbounded.
    pub resolution_timeout: Option<Duration>,
}

impl ManagerConfig {
    /// Creates a builder pre-populated with defaults.
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            dialog_grace: DEFAULT_DIALOG_GRACE,
            resolution_timeout: Some(DEFAULT_RESOLUTION_TIMEOUT),
        }
    }
}

/// Builder for [`ManagerConfig`] with fail-fast validation.
#[derive(Debug, Clone, Default)]
pub struct ManagerConfigBuilder {
    dialog_grace: Option<Duration>,
    resolution_timeout: Option<Option<Duration>>,
}

impl ManagerConfigBuilder {
    /// Sets the dialog grace interval. Must be non-zero.
    pub fn dialog_grace(mut self, grace: Duration) -> Self {
        self.dialog_grace = Some(grace);
        self
    }

    /// Sets (or with `None`, disables) the hard resolution bound.
    pub fn resolution_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.resolution_timeout = Some(timeout);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// - `LocationError::Config` - a zero `dialog_grace`, or a
    ///   `resolution_timeout` that does not leave room for the grace
    ///   interval to expire.
    pub fn build(self) -> Result<ManagerConfig> {
        let defaults = ManagerConfig::default();
        let config = ManagerConfig {
            dialog_grace: self.dialog_grace.unwrap_or(defaults.dialog_grace),
            resolution_timeout: self
                .resolution_timeout
                .unwrap_or(defaults.resolution_timeout),
        };

        if config.dialog_grace.is_zero() {
            return Err(LocationError::Config(
                "dialog_grace must be non-zero; the grace branch is what keeps \
                 cached-status requests from hanging"
                    .to_string(),
            ));
        }

        if let Some(bound) = config.resolution_timeout {
            if bound <= config.dialog_grace {
                return Err(LocationError::Config(format!(
                    "resolution_timeout ({bound:?}) must exceed dialog_grace \
                     ({:?}), otherwise every authorization request times out",
                    config.dialog_grace
                )));
            }
        }

        Ok(config)
    }
}
