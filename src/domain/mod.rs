//! Domain layer - topics, subscriptions, and shared primitives.
//!
//! Pure types with no I/O. The adapters layer owns connections and transports.

pub mod events;
pub mod foundation;
