use bridge_traits::BridgeError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Request cancelled before a result was delivered")]
    Cancelled,

    #[error("Location provider failure: {0}")]
    Provider(String),

    #[error("No resolution within {timeout:?}")]
    ResolutionTimeout { timeout: Duration },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, LocationError>;
