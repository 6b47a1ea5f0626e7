//! Per-connection outbound transport.
//!
//! The write half is a bounded channel sender kept behind a mutex so that
//! closing and writing are mutually exclusive: once [`Transport::close`]
//! returns, no later write can reach the client, even through a handle
//! obtained from an older registry snapshot. Writes never block; a full
//! buffer means the client is not keeping up and counts as a failure.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc;

use super::frame::Frame;

/// Why a frame could not be handed to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("send buffer full")]
    Full,
}

/// Write half of a client connection.
#[derive(Debug)]
pub struct Transport {
    sender: Mutex<Option<mpsc::Sender<Frame>>>,
}

impl Transport {
    /// Opens a transport with room for `capacity` queued frames.
    ///
    /// The receiver feeds the HTTP response body.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Hands a frame to the connection without waiting.
    pub fn write(&self, frame: Frame) -> Result<(), TransportError> {
        let guard = self.lock();
        let Some(sender) = guard.as_ref() else {
            return Err(TransportError::Closed);
        };
        sender.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::Full,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    /// Releases the write half. Returns `true` only for the call that
    /// actually closed it.
    pub fn close(&self) -> bool {
        self.lock().take().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<mpsc::Sender<Frame>>> {
        // The guarded section never panics mid-update; a poisoned lock still
        // holds a consistent value.
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn written_frames_arrive_in_order() {
        let (transport, mut rx) = Transport::channel(4);
        transport.write(Frame::keep_alive()).unwrap();
        transport
            .write(Frame::event("a", &serde_json::json!(1)).unwrap())
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), Frame::keep_alive());
        assert_eq!(
            rx.recv().await.unwrap(),
            Frame::event("a", &serde_json::json!(1)).unwrap()
        );
    }

    #[test]
    fn full_buffer_is_reported() {
        let (transport, _rx) = Transport::channel(1);
        transport.write(Frame::keep_alive()).unwrap();
        assert_eq!(transport.write(Frame::keep_alive()), Err(TransportError::Full));
    }

    #[test]
    fn dropped_receiver_is_reported_as_closed() {
        let (transport, rx) = Transport::channel(1);
        drop(rx);
        assert_eq!(transport.write(Frame::keep_alive()), Err(TransportError::Closed));
    }

    #[test]
    fn close_happens_exactly_once() {
        let (transport, _rx) = Transport::channel(1);
        assert!(transport.write(Frame::keep_alive()).is_ok());
        assert!(transport.close());
        assert!(!transport.close());
        assert_eq!(transport.write(Frame::keep_alive()), Err(TransportError::Closed));
    }

    #[tokio::test]
    async fn write_after_close_is_refused_and_stream_ends() {
        let (transport, mut rx) = Transport::channel(2);
        transport.close();
        assert_eq!(transport.write(Frame::keep_alive()), Err(TransportError::Closed));
        assert!(rx.recv().await.is_none());
    }
}
