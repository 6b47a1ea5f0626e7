//! Adapters - Implementations of port interfaces.
//!
//! - `sse` - In-process Server-Sent Events fan-out
//! - `http` - axum routes exposing the event stream

pub mod http;
pub mod sse;

pub use sse::{Broadcaster, ClientRegistry, ConnectionManager};
