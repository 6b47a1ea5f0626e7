//! Connection lifecycle: admission and deregistration.
//!
//! ```text
//! Admitted ──► Active ──► Closed
//!    │            │          ▲
//!    │ handshake  │ frames   │ body dropped (client left)
//!    ▼            ▼          │ or write failure
//! ```
//!
//! Admission returns the response body stream. That stream owns a
//! [`Registration`] guard; when the HTTP layer drops the body (peer hung up,
//! server shutting down) the guard removes the client from the registry in
//! the same call, so the registry never holds an entry whose body is gone.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::domain::events::{SubscribeQuery, SubscriptionError, SubscriptionSet};
use crate::domain::foundation::ClientId;

use super::frame::Frame;
use super::registry::{ClientRegistry, Connection, RegistryError};
use super::transport::Transport;

/// Per-connection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Event frames buffered per client before it counts as too slow. The
    /// handshake does not count against this.
    pub channel_capacity: usize,
    /// Upper bound on topics a single client may subscribe to.
    pub max_subscriptions: usize,
    /// Interval between keep-alive comments; `None` disables them.
    pub keep_alive: Option<Duration>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            max_subscriptions: 256,
            keep_alive: Some(Duration::from_secs(15)),
        }
    }
}

/// Why a client could not be admitted. Nothing is left in the registry.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to queue handshake frame")]
    Handshake,
}

/// Body of an SSE response: encoded frames until the connection closes.
pub type EventStream = BoxStream<'static, Result<Bytes, Infallible>>;

/// A freshly admitted client.
pub struct Admission {
    pub client_id: ClientId,
    pub stream: EventStream,
}

impl std::fmt::Debug for Admission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admission")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Removes its client from the registry when dropped.
struct Registration {
    client_id: ClientId,
    registry: Arc<ClientRegistry>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(&self.client_id);
    }
}

/// Admits clients and wires their transports into the registry.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    registry: Arc<ClientRegistry>,
    settings: ConnectionSettings,
}

impl ConnectionManager {
    pub fn new(registry: Arc<ClientRegistry>, settings: ConnectionSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Canonical subscription set for a subscribe request.
    ///
    /// `all` replaces any explicit entries with the wildcard.
    pub fn subscriptions_for(
        &self,
        query: &SubscribeQuery,
    ) -> Result<SubscriptionSet, SubscriptionError> {
        query.to_subscriptions(self.settings.max_subscriptions)
    }

    /// Registers a new client and returns its response body.
    ///
    /// The handshake is queued before the client becomes visible to
    /// broadcasts, so it is always the first frame on the wire.
    pub fn admit(&self, subscriptions: SubscriptionSet) -> Result<Admission, AdmissionError> {
        self.admit_as(ClientId::new(), subscriptions)
    }

    fn admit_as(
        &self,
        client_id: ClientId,
        subscriptions: SubscriptionSet,
    ) -> Result<Admission, AdmissionError> {
        // One extra slot so the handshake never eats into the event buffer.
        let (transport, receiver) =
            Transport::channel(self.settings.channel_capacity.saturating_add(1));
        let handshake = Frame::handshake(&client_id).map_err(|_| AdmissionError::Handshake)?;
        transport
            .write(handshake)
            .map_err(|_| AdmissionError::Handshake)?;

        let topic_count = subscriptions.len();
        let wildcard = subscriptions.is_wildcard();
        let connection = Arc::new(Connection::new(client_id, subscriptions, transport));

        if let Err(e) = self.registry.insert(connection) {
            tracing::warn!(client_id = %client_id, error = %e, "SSE admission refused");
            return Err(e.into());
        }

        tracing::info!(
            client_id = %client_id,
            topics = topic_count,
            wildcard,
            active_connections = self.registry.count(),
            "SSE client connected"
        );

        let registration = Registration {
            client_id,
            registry: self.registry.clone(),
        };

        Ok(Admission {
            client_id,
            stream: frame_stream(receiver, self.settings.keep_alive, registration),
        })
    }
}

struct StreamState {
    receiver: mpsc::Receiver<Frame>,
    keep_alive: Option<Interval>,
    _registration: Registration,
}

fn frame_stream(
    receiver: mpsc::Receiver<Frame>,
    keep_alive: Option<Duration>,
    registration: Registration,
) -> EventStream {
    let keep_alive = keep_alive.filter(|d| !d.is_zero()).map(|period| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    let state = StreamState {
        receiver,
        keep_alive,
        _registration: registration,
    };

    stream::unfold(state, |mut state| async move {
        let frame = match state.keep_alive.as_mut() {
            Some(interval) => tokio::select! {
                frame = state.receiver.recv() => frame,
                _ = interval.tick() => Some(Frame::keep_alive()),
            },
            None => state.receiver.recv().await,
        }?;
        Some((Ok::<_, Infallible>(frame.into_bytes()), state))
    })
    .boxed()
}
