//! HTTP handlers for event endpoints.
//!
//! `subscribe` validates the query before anything is allocated, then hands
//! the admitted client's frame stream to axum as a streaming body.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Json, RawQuery, State};
use axum::http::header::{self, HeaderName};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::sse::{AdmissionError, ConnectionManager, RegistryError};
use crate::domain::events::{SubscribeQuery, SubscriptionError};
use crate::domain::foundation::Timestamp;

use super::dto::{ErrorResponse, StatsResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Error Type
// ════════════════════════════════════════════════════════════════════════════════

/// Events API error that implements IntoResponse.
#[derive(Debug)]
pub enum EventsApiError {
    BadRequest(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for EventsApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            EventsApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            EventsApiError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::service_unavailable(msg),
            ),
            EventsApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal(msg))
            }
        };
        (status, Json(error)).into_response()
    }
}

impl From<SubscriptionError> for EventsApiError {
    fn from(error: SubscriptionError) -> Self {
        EventsApiError::BadRequest(error.to_string())
    }
}

impl From<AdmissionError> for EventsApiError {
    fn from(error: AdmissionError) -> Self {
        match error {
            AdmissionError::Registry(RegistryError::CapacityExceeded { .. }) => {
                EventsApiError::Unavailable("Too many live connections, retry later".to_string())
            }
            AdmissionError::Registry(RegistryError::DuplicateClientId(_)) => {
                EventsApiError::Internal("Could not allocate a client id".to_string())
            }
            AdmissionError::Handshake => {
                EventsApiError::Internal("Could not open event stream".to_string())
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the events endpoints.
#[derive(Clone)]
pub struct EventsAppState {
    pub connections: Arc<ConnectionManager>,
}

impl EventsAppState {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /events/subscribe - Open a live event stream
///
/// Query: `streams`, `users` (repeatable, `[]` suffix accepted) and `all`.
pub async fn subscribe(
    State(state): State<EventsAppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, EventsApiError> {
    let query = SubscribeQuery::parse(query.as_deref())?;
    let subscriptions = state.connections.subscriptions_for(&query)?;
    let admission = state.connections.admit(subscriptions)?;

    tracing::debug!(client_id = %admission.client_id, "SSE stream opened");

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(admission.stream),
    )
        .into_response())
}

/// GET /events/stats - Current connection count
pub async fn stats(State(state): State<EventsAppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        active_connections: state.connections.registry().count(),
        timestamp: Timestamp::now().to_iso8601(),
    })
}
