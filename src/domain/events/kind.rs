//! Stream lifecycle event names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event names published for payment stream lifecycle changes.
///
/// The string form is the SSE `event:` field that clients listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamEventKind {
    /// New stream created.
    #[serde(rename = "stream.created")]
    Created,
    /// Stream received additional funds.
    #[serde(rename = "stream.topped_up")]
    ToppedUp,
    /// Recipient withdrew accrued funds.
    #[serde(rename = "stream.withdrawn")]
    Withdrawn,
    /// Sender cancelled the stream.
    #[serde(rename = "stream.cancelled")]
    Cancelled,
    /// Stream ran to completion.
    #[serde(rename = "stream.completed")]
    Completed,
}

impl StreamEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamEventKind::Created => "stream.created",
            StreamEventKind::ToppedUp => "stream.topped_up",
            StreamEventKind::Withdrawn => "stream.withdrawn",
            StreamEventKind::Cancelled => "stream.cancelled",
            StreamEventKind::Completed => "stream.completed",
        }
    }
}

impl fmt::Display for StreamEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
