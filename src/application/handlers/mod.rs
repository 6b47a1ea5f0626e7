//! Application handlers.
//!
//! - `PublishChainEventHandler` - indexed chain events to live subscribers

mod publish_chain_event;

pub use publish_chain_event::{
    ChainEvent, PublishChainEventHandler, StreamCancelled, StreamCompleted, StreamCreated,
    StreamToppedUp, StreamWithdrawn,
};
