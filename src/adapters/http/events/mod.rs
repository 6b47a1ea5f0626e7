//! Events HTTP adapter module.
//!
//! Exposes the live SSE subscription endpoint and connection stats.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, StatsResponse};
pub use handlers::{EventsApiError, EventsAppState};
pub use routes::events_routes;
