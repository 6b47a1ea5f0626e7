//! Application layer - handlers the write path calls after a commit.

pub mod handlers;

pub use handlers::{ChainEvent, PublishChainEventHandler};
