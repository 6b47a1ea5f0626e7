//! HTTP adapters - REST and SSE endpoints.
//!
//! [`router`] assembles every area's routes behind the shared middleware
//! stack (request tracing, CORS, header timeout).

pub mod events;
pub mod health;

pub use events::{events_routes, EventsAppState};
pub use health::{health_routes, HealthState};

use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Builds the application router.
///
/// The timeout bounds how long a handler may take to produce response
/// headers; an open event stream is not cut off by it.
pub fn router(events: EventsAppState, health: HealthState, server: &ServerConfig) -> Router {
    Router::new()
        .merge(health_routes(health))
        .merge(events_routes(events))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([axum::http::Method::GET])
}
