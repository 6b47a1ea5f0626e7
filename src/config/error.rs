//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("max_connections must be at least 1")]
    InvalidMaxConnections,

    #[error("max_subscriptions_per_client must be at least 1")]
    InvalidMaxSubscriptions,

    #[error("channel_capacity must be between 1 and {max}")]
    InvalidChannelCapacity { max: usize },

    #[error("keep_alive_secs must not exceed {max}")]
    InvalidKeepAlive { max: u64 },
}
