//! HTTP routes for event endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{stats, subscribe, EventsAppState};

/// Creates the events router with all routes.
pub fn events_routes(state: EventsAppState) -> Router {
    Router::new()
        // GET /events/subscribe?streams=42&users=GABC&all=false
        .route("/events/subscribe", get(subscribe))
        // GET /events/stats
        .route("/events/stats", get(stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use futures::StreamExt;
    use tower::ServiceExt;

    use crate::adapters::sse::{ClientRegistry, ConnectionManager, ConnectionSettings};

    fn test_app(max_connections: usize) -> (Router, Arc<ClientRegistry>) {
        let registry = Arc::new(ClientRegistry::new(max_connections));
        let manager = ConnectionManager::new(
            registry.clone(),
            ConnectionSettings {
                keep_alive: None,
                ..Default::default()
            },
        );
        let app = events_routes(EventsAppState::new(Arc::new(manager)));
        (app, registry)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn subscribe_returns_event_stream_headers() {
        let (app, registry) = test_app(10);

        let response = app
            .oneshot(get_request("/events/subscribe?streams=42"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(headers["x-accel-buffering"], "no");
        assert_eq!(registry.count(), 1);
    }

    #[tokio::test]
    async fn first_frame_is_the_handshake() {
        let (app, registry) = test_app(10);

        let response = app
            .oneshot(get_request("/events/subscribe?all=true"))
            .await
            .unwrap();
        let mut body = response.into_body().into_data_stream();
        let first = body.next().await.unwrap().unwrap();
        let text = String::from_utf8(first.to_vec()).unwrap();

        let client_id = registry.snapshot()[0].id().to_string();
        assert!(text.starts_with("data: "));
        assert!(text.contains("\"type\":\"connected\""));
        assert!(text.contains(&client_id));
    }

    #[tokio::test]
    async fn dropping_the_response_deregisters() {
        let (app, registry) = test_app(10);

        let response = app
            .oneshot(get_request("/events/subscribe?users=GABC"))
            .await
            .unwrap();
        assert_eq!(registry.count(), 1);

        drop(response);
        assert_eq!(registry.count(), 0);
    }

    #[tokio::test]
    async fn invalid_all_flag_is_rejected_before_admission() {
        let (app, registry) = test_app(10);

        let response = app
            .oneshot(get_request("/events/subscribe?all=yes"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(registry.count(), 0);
        let body = json_body(response).await;
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn full_registry_answers_service_unavailable() {
        let (app, registry) = test_app(1);

        let first = app
            .clone()
            .oneshot(get_request("/events/subscribe?all=true"))
            .await
            .unwrap();
        let second = app
            .oneshot(get_request("/events/subscribe?all=true"))
            .await
            .unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(registry.count(), 1);
    }

    #[tokio::test]
    async fn stats_reports_active_connections() {
        let (app, _registry) = test_app(10);

        let _open = app
            .clone()
            .oneshot(get_request("/events/subscribe?streams=1"))
            .await
            .unwrap();
        let response = app.oneshot(get_request("/events/stats")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["activeConnections"], 1);
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
