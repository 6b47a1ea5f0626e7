//! Client registry - the live set of SSE connections.
//!
//! # Thread Safety
//!
//! A single `std::sync::RwLock` guards the map. Broadcasts take the read lock
//! only long enough to clone the `Arc` handles out ([`ClientRegistry::snapshot`])
//! and write to transports after releasing it, so a broadcast to thousands of
//! clients never holds up admissions or disconnects. The lock is never held
//! across an `.await`, which lets [`ClientRegistry::remove`] run synchronously
//! from a `Drop` impl the moment a response body is torn down.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use crate::domain::events::SubscriptionSet;
use crate::domain::foundation::{ClientId, Timestamp};

use super::frame::Frame;
use super::transport::{Transport, TransportError};

/// Registry mutations that were refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Client id already registered: {0}")]
    DuplicateClientId(ClientId),

    #[error("Connection limit reached ({limit})")]
    CapacityExceeded { limit: usize },
}

/// One active subscriber.
#[derive(Debug)]
pub struct Connection {
    id: ClientId,
    subscriptions: SubscriptionSet,
    transport: Transport,
    connected_at: Timestamp,
}

impl Connection {
    pub fn new(id: ClientId, subscriptions: SubscriptionSet, transport: Transport) -> Self {
        Self {
            id,
            subscriptions,
            transport,
            connected_at: Timestamp::now(),
        }
    }

    pub fn id(&self) -> &ClientId {
        &self.id
    }

    pub fn subscriptions(&self) -> &SubscriptionSet {
        &self.subscriptions
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    pub(crate) fn write(&self, frame: Frame) -> Result<(), TransportError> {
        self.transport.write(frame)
    }

    fn close(&self) -> bool {
        self.transport.close()
    }
}

/// Process-wide map of client id to connection.
#[derive(Debug)]
pub struct ClientRegistry {
    connections: RwLock<HashMap<ClientId, Arc<Connection>>>,
    max_connections: usize,
}

impl ClientRegistry {
    /// Creates a registry admitting at most `max_connections` clients.
    pub fn new(max_connections: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            max_connections,
        }
    }

    /// Creates a registry with no practical connection limit.
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    /// Adds a connection.
    ///
    /// Refuses (never overwrites) an id that is already present, and refuses
    /// once the limit is reached. On error the registry is unchanged.
    pub fn insert(&self, connection: Arc<Connection>) -> Result<(), RegistryError> {
        let mut connections = self.write();

        if connections.contains_key(connection.id()) {
            return Err(RegistryError::DuplicateClientId(*connection.id()));
        }
        if connections.len() >= self.max_connections {
            return Err(RegistryError::CapacityExceeded {
                limit: self.max_connections,
            });
        }

        connections.insert(*connection.id(), connection);
        Ok(())
    }

    /// Removes a connection and releases its transport.
    ///
    /// Removing an absent id is a no-op; disconnect races are expected.
    /// Returns whether an entry was removed.
    pub fn remove(&self, id: &ClientId) -> bool {
        let removed = self.write().remove(id);

        match removed {
            Some(connection) => {
                connection.close();
                tracing::info!(
                    client_id = %id,
                    connected_for_secs = connection.connected_at().elapsed().as_secs(),
                    "SSE client disconnected"
                );
                true
            }
            None => false,
        }
    }

    /// Removes every connection, ending their response streams.
    ///
    /// Used at shutdown so open streams do not hold the server up.
    pub fn drain(&self) -> usize {
        let drained = std::mem::take(&mut *self.write());
        for connection in drained.values() {
            connection.close();
        }
        if !drained.is_empty() {
            tracing::info!(connections = drained.len(), "SSE clients drained");
        }
        drained.len()
    }

    /// Point-in-time copy of all live connections.
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.read().values().cloned().collect()
    }

    /// Number of live connections.
    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn contains(&self, id: &ClientId) -> bool {
        self.read().contains_key(id)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ClientId, Arc<Connection>>> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ClientId, Arc<Connection>>> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::unbounded()
    }
}
