//! Event distribution domain: topics, subscriptions, and event names.

mod kind;
mod subscription;
mod topic;

pub use kind::StreamEventKind;
pub use subscription::{SubscribeQuery, SubscriptionError};
pub use topic::{matches, matches_any, user_topic, SubscriptionSet, USER_TOPIC_PREFIX, WILDCARD};
