//! Foundation module - Shared domain primitives.

mod ids;
mod timestamp;

pub use ids::ClientId;
pub use timestamp::Timestamp;
