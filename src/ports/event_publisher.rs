//! EventPublisher port - Interface the write path uses to announce events.
//!
//! The write-path collaborator (REST handlers, the chain indexer) calls this
//! after a domain write commits. It never learns which clients are connected
//! or whether delivery succeeded for any of them. The in-process SSE
//! broadcaster is the only adapter today; a shared pub/sub backend would slot
//! in behind the same trait.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::events::user_topic;

/// Outcome of a single fan-out, for observability only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    /// Connections whose subscriptions matched.
    pub matched: usize,
    /// Frames handed to a transport.
    pub delivered: usize,
    /// Matched connections whose transport rejected the frame (now removed).
    pub failed: usize,
}

/// Caller mistakes that prevent a publish. Subscriber failures never show up
/// here.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Event name must be non-empty and free of line breaks: {0:?}")]
    InvalidEventName(String),

    #[error("Failed to serialize event payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Port for best-effort fan-out of domain events to live subscribers.
///
/// Implementations must:
/// - return once frames are handed off, never wait on subscribers
/// - isolate per-subscriber failures from the caller
/// - serialize the payload once per call
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `payload` under `event_name` to everything subscribed to `topic`.
    async fn publish(
        &self,
        event_name: &str,
        topic: &str,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError>;

    /// Publish once to every subscriber matching at least one of `topics`.
    ///
    /// A subscriber matching several topics still receives a single frame.
    async fn publish_to_any(
        &self,
        event_name: &str,
        topics: &[String],
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError>;

    /// Publish against a literal stream id.
    async fn publish_to_topic(
        &self,
        topic_id: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError> {
        self.publish(event_name, topic_id, payload).await
    }

    /// Publish against the `user:<key>` topic.
    async fn publish_to_user(
        &self,
        user_key: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError> {
        self.publish(event_name, &user_topic(user_key), payload)
            .await
    }
}
