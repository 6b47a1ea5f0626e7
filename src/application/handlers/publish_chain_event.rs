//! PublishChainEventHandler - turns indexed on-chain stream events into
//! live notifications.
//!
//! The indexer decodes contract events and hands them here after persisting
//! them. Each event is published once, against the stream's own topic and
//! the `user:<key>` topics of the parties involved, so a dashboard watching
//! either the stream or its own account sees it exactly once.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::events::{user_topic, StreamEventKind};
use crate::ports::{DeliveryReport, EventPublisher, PublishError};

/// Payload of `stream.created`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCreated {
    pub stream_id: u64,
    pub sender: String,
    pub recipient: String,
    pub token_address: String,
    /// Token base units per second, decimal string (i128 on chain).
    pub rate_per_second: String,
    pub deposited_amount: String,
    pub start_time: u64,
    pub transaction_hash: String,
}

/// Payload of `stream.topped_up`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamToppedUp {
    pub stream_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub amount: String,
    pub new_balance: String,
    pub transaction_hash: String,
    pub timestamp: u64,
}

/// Payload of `stream.withdrawn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamWithdrawn {
    pub stream_id: u64,
    pub recipient: String,
    pub amount: String,
    pub transaction_hash: String,
    pub timestamp: u64,
}

/// Payload of `stream.cancelled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCancelled {
    pub stream_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_withdrawn: Option<String>,
    pub refunded_amount: String,
    pub transaction_hash: String,
    pub timestamp: u64,
}

/// Payload of `stream.completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCompleted {
    pub stream_id: u64,
    pub total_streamed: String,
    pub timestamp: u64,
}

/// Stream event as produced by the chain indexer, tagged by `eventType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainEvent {
    Created(StreamCreated),
    ToppedUp(StreamToppedUp),
    Withdrawn(StreamWithdrawn),
    Cancelled(StreamCancelled),
    Completed(StreamCompleted),
}

impl ChainEvent {
    pub fn kind(&self) -> StreamEventKind {
        match self {
            ChainEvent::Created(_) => StreamEventKind::Created,
            ChainEvent::ToppedUp(_) => StreamEventKind::ToppedUp,
            ChainEvent::Withdrawn(_) => StreamEventKind::Withdrawn,
            ChainEvent::Cancelled(_) => StreamEventKind::Cancelled,
            ChainEvent::Completed(_) => StreamEventKind::Completed,
        }
    }

    pub fn stream_id(&self) -> u64 {
        match self {
            ChainEvent::Created(e) => e.stream_id,
            ChainEvent::ToppedUp(e) => e.stream_id,
            ChainEvent::Withdrawn(e) => e.stream_id,
            ChainEvent::Cancelled(e) => e.stream_id,
            ChainEvent::Completed(e) => e.stream_id,
        }
    }

    /// Account keys named by the event, without duplicates.
    pub fn parties(&self) -> Vec<&str> {
        let candidates: [Option<&str>; 2] = match self {
            ChainEvent::Created(e) => [Some(e.sender.as_str()), Some(e.recipient.as_str())],
            ChainEvent::ToppedUp(e) => [e.sender.as_deref(), None],
            ChainEvent::Withdrawn(e) => [Some(e.recipient.as_str()), None],
            ChainEvent::Cancelled(e) => [e.sender.as_deref(), e.recipient.as_deref()],
            ChainEvent::Completed(_) => [None, None],
        };

        let mut parties: Vec<&str> = Vec::with_capacity(2);
        for party in candidates.into_iter().flatten() {
            if !party.is_empty() && !parties.contains(&party) {
                parties.push(party);
            }
        }
        parties
    }

    /// Topics the event is published against: the stream id first, then
    /// each party's user topic.
    pub fn topics(&self) -> Vec<String> {
        std::iter::once(self.stream_id().to_string())
            .chain(self.parties().into_iter().map(user_topic))
            .collect()
    }

    /// Wire payload: the variant's fields without the `eventType` tag.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            ChainEvent::Created(e) => serde_json::to_value(e),
            ChainEvent::ToppedUp(e) => serde_json::to_value(e),
            ChainEvent::Withdrawn(e) => serde_json::to_value(e),
            ChainEvent::Cancelled(e) => serde_json::to_value(e),
            ChainEvent::Completed(e) => serde_json::to_value(e),
        }
    }
}

/// Handler publishing indexed chain events to live subscribers.
pub struct PublishChainEventHandler {
    event_publisher: Arc<dyn EventPublisher>,
}

impl PublishChainEventHandler {
    pub fn new(event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self { event_publisher }
    }

    pub async fn handle(&self, event: ChainEvent) -> Result<DeliveryReport, PublishError> {
        let kind = event.kind();
        let topics = event.topics();
        let payload = event.payload()?;

        let report = self
            .event_publisher
            .publish_to_any(kind.as_str(), &topics, &payload)
            .await?;

        tracing::debug!(
            event = %kind,
            stream_id = event.stream_id(),
            delivered = report.delivered,
            "Chain event published"
        );

        Ok(report)
    }
}
