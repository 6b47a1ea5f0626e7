//! Server-Sent Events wire frames.
//!
//! Every frame is pre-encoded into shared [`Bytes`] so a broadcast serializes
//! once and hands each subscriber a reference-counted clone.
//!
//! ```text
//! data: {"type":"connected","clientId":"..."}   <- handshake
//!
//! event: stream.created                         <- domain event
//! data: {"amount":"100"}
//!
//! : keep-alive                                  <- idle comment
//!
//! ```

use axum::body::Bytes;
use serde::Serialize;
use serde_json::json;

use crate::domain::foundation::ClientId;
use crate::ports::PublishError;

/// One encoded SSE frame, terminated by a blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Bytes);

impl Frame {
    /// Named event frame: `event: <name>\ndata: <json>\n\n`.
    pub fn event<T: Serialize + ?Sized>(event_name: &str, payload: &T) -> Result<Self, PublishError> {
        if event_name.is_empty() || event_name.contains(['\n', '\r']) {
            return Err(PublishError::InvalidEventName(event_name.to_string()));
        }
        let data = serde_json::to_string(payload)?;
        Ok(Self(Bytes::from(format!(
            "event: {}\ndata: {}\n\n",
            event_name, data
        ))))
    }

    /// Unnamed data frame: `data: <json>\n\n`.
    pub fn data<T: Serialize + ?Sized>(payload: &T) -> Result<Self, serde_json::Error> {
        let data = serde_json::to_string(payload)?;
        Ok(Self(Bytes::from(format!("data: {}\n\n", data))))
    }

    /// Handshake announcing the generated client id.
    pub fn handshake(client_id: &ClientId) -> Result<Self, serde_json::Error> {
        Self::data(&json!({
            "type": "connected",
            "clientId": client_id,
        }))
    }

    /// Comment frame ignored by client parsers; keeps idle connections warm.
    pub fn keep_alive() -> Self {
        Self(Bytes::from_static(b": keep-alive\n\n"))
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(frame: &Frame) -> &str {
        std::str::from_utf8(&frame.0).unwrap()
    }

    #[test]
    fn event_frame_has_name_data_and_blank_line() {
        let frame = Frame::event("stream.created", &json!({"amount": "100"})).unwrap();
        assert_eq!(
            text(&frame),
            "event: stream.created\ndata: {\"amount\":\"100\"}\n\n"
        );
    }

    #[test]
    fn event_name_with_newline_is_rejected() {
        let err = Frame::event("stream.created\ndata: x", &json!({})).unwrap_err();
        assert!(matches!(err, PublishError::InvalidEventName(_)));
    }

    #[test]
    fn empty_event_name_is_rejected() {
        assert!(matches!(
            Frame::event("", &json!({})).unwrap_err(),
            PublishError::InvalidEventName(_)
        ));
    }

    #[test]
    fn multiline_strings_stay_on_one_data_line() {
        let frame = Frame::event("note", &json!({"text": "a\nb"})).unwrap();
        let body = text(&frame);
        assert_eq!(body.matches('\n').count(), 3);
        assert!(body.contains("a\\nb"));
    }

    #[test]
    fn handshake_carries_client_id() {
        let id = ClientId::new();
        let frame = Frame::handshake(&id).unwrap();
        let body = text(&frame);

        assert!(body.starts_with("data: "));
        assert!(body.ends_with("\n\n"));

        let json: serde_json::Value =
            serde_json::from_str(body.trim_start_matches("data: ").trim_end()).unwrap();
        assert_eq!(json, json!({"type": "connected", "clientId": id.to_string()}));
    }

    #[test]
    fn keep_alive_is_a_comment() {
        assert_eq!(text(&Frame::keep_alive()), ": keep-alive\n\n");
    }

    #[test]
    fn non_string_map_keys_fail_serialization() {
        let mut payload = std::collections::HashMap::new();
        payload.insert(vec![1u8], 1);
        assert!(matches!(
            Frame::event("stream.created", &payload).unwrap_err(),
            PublishError::Serialization(_)
        ));
    }
}
