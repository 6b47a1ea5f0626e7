//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `EventPublisher` - Port the write path uses to fan out domain events

mod event_publisher;

pub use event_publisher::{DeliveryReport, EventPublisher, PublishError};
