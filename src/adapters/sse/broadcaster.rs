//! Broadcast engine - fans one event out to every matching connection.
//!
//! # Event Flow
//!
//! ```text
//! publish(event, topic, payload)
//!          │
//!          ▼
//!   encode frame once
//!          │
//!          ▼
//!   registry snapshot  ──►  Topic Matcher per connection
//!          │
//!          ▼
//!   try_send to each match ──► failure: log + remove(id)
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::events::{user_topic, SubscriptionSet};
use crate::domain::foundation::ClientId;
use crate::ports::{DeliveryReport, EventPublisher, PublishError};

use super::frame::Frame;
use super::registry::ClientRegistry;
use super::transport::TransportError;

/// In-process SSE implementation of [`EventPublisher`].
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<ClientRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Delivers `payload` as `event_name` to every subscriber of `topic`.
    pub fn publish(
        &self,
        event_name: &str,
        topic: &str,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError> {
        let frame = Frame::event(event_name, payload)?;
        let report = self.deliver(&frame, |subs| subs.matches(topic));

        tracing::debug!(
            event = event_name,
            topic,
            matched = report.matched,
            delivered = report.delivered,
            failed = report.failed,
            "Event published"
        );
        Ok(report)
    }

    /// Target is the literal stream id.
    pub fn publish_to_topic(
        &self,
        topic_id: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError> {
        self.publish(event_name, topic_id, payload)
    }

    /// Target is `user:<user_key>`.
    pub fn publish_to_user(
        &self,
        user_key: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError> {
        self.publish(event_name, &user_topic(user_key), payload)
    }

    /// One frame per connection matching any of `topics`.
    pub fn publish_to_any(
        &self,
        event_name: &str,
        topics: &[String],
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError> {
        let frame = Frame::event(event_name, payload)?;
        let report = self.deliver(&frame, |subs| subs.matches_any(topics));

        tracing::debug!(
            event = event_name,
            topics = ?topics,
            matched = report.matched,
            delivered = report.delivered,
            failed = report.failed,
            "Event published to multiple topics"
        );
        Ok(report)
    }

    fn deliver<F>(&self, frame: &Frame, is_match: F) -> DeliveryReport
    where
        F: Fn(&SubscriptionSet) -> bool,
    {
        let mut report = DeliveryReport::default();
        let mut failed: Vec<(ClientId, TransportError)> = Vec::new();

        // Registry lock released here; writes below run lock-free.
        for connection in self.registry.snapshot() {
            if !is_match(connection.subscriptions()) {
                continue;
            }
            report.matched += 1;

            match connection.write(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => failed.push((*connection.id(), e)),
            }
        }

        report.failed = failed.len();
        for (client_id, error) in failed {
            tracing::warn!(
                client_id = %client_id,
                error = %error,
                "Write to SSE client failed, dropping connection"
            );
            self.registry.remove(&client_id);
        }

        report
    }
}

#[async_trait]
impl EventPublisher for Broadcaster {
    async fn publish(
        &self,
        event_name: &str,
        topic: &str,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError> {
        Broadcaster::publish(self, event_name, topic, payload)
    }

    async fn publish_to_any(
        &self,
        event_name: &str,
        topics: &[String],
        payload: &serde_json::Value,
    ) -> Result<DeliveryReport, PublishError> {
        Broadcaster::publish_to_any(self, event_name, topics, payload)
    }
}
