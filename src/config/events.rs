//! Event stream configuration
//!
//! Limits on live SSE connections. Nothing in the wire protocol bounds
//! these, so they are set here explicitly.

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::sse::ConnectionSettings;

use super::error::ValidationError;

/// Largest per-client frame buffer accepted.
pub const MAX_CHANNEL_CAPACITY: usize = 4096;

/// Longest keep-alive interval accepted, in seconds.
pub const MAX_KEEP_ALIVE_SECS: u64 = 300;

/// SSE connection limits and tuning
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Concurrent connections admitted before new ones get 503
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Topics a single client may subscribe to
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions_per_client: usize,

    /// Frames queued per client before it is dropped as too slow
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Seconds between keep-alive comments on idle streams (0 disables)
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl EventsConfig {
    /// Per-connection settings for the connection manager
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            channel_capacity: self.channel_capacity,
            max_subscriptions: self.max_subscriptions_per_client,
            keep_alive: (self.keep_alive_secs > 0)
                .then(|| Duration::from_secs(self.keep_alive_secs)),
        }
    }

    /// Validate event stream configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_connections == 0 {
            return Err(ValidationError::InvalidMaxConnections);
        }
        if self.max_subscriptions_per_client == 0 {
            return Err(ValidationError::InvalidMaxSubscriptions);
        }
        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(ValidationError::InvalidChannelCapacity {
                max: MAX_CHANNEL_CAPACITY,
            });
        }
        if self.keep_alive_secs > MAX_KEEP_ALIVE_SECS {
            return Err(ValidationError::InvalidKeepAlive {
                max: MAX_KEEP_ALIVE_SECS,
            });
        }
        Ok(())
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            max_subscriptions_per_client: default_max_subscriptions(),
            channel_capacity: default_channel_capacity(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

fn default_max_connections() -> usize {
    10_000
}

fn default_max_subscriptions() -> usize {
    256
}

fn default_channel_capacity() -> usize {
    64
}

fn default_keep_alive_secs() -> u64 {
    15
}
