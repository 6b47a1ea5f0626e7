//! Server-Sent Events fan-out for real-time stream updates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  Write-path collaborator                             │
//! │   REST handlers │ PublishChainEventHandler (indexer)                 │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ EventPublisher::publish
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Broadcaster                                   │
//! │   - Encodes the frame once                                           │
//! │   - Filters the registry snapshot with the topic matcher             │
//! │   - Drops connections whose transport rejects the write              │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      ClientRegistry                                  │
//! │   client-a {"42"}    client-b {"user:GABC"}    client-c {"*"}        │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     ▲
//!                                     │ admit / remove
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    ConnectionManager                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`frame`] - SSE wire encoding
//! - [`transport`] - Per-connection bounded, close-once write half
//! - [`registry`] - Live connection map
//! - [`broadcaster`] - Fan-out engine, implements `EventPublisher`
//! - [`lifecycle`] - Admission and drop-driven deregistration

pub mod broadcaster;
pub mod frame;
pub mod lifecycle;
pub mod registry;
pub mod transport;

pub use broadcaster::Broadcaster;
pub use frame::Frame;
pub use lifecycle::{Admission, AdmissionError, ConnectionManager, ConnectionSettings, EventStream};
pub use registry::{ClientRegistry, Connection, RegistryError};
pub use transport::{Transport, TransportError};
