//! Message channel contract.
//!
//! Sessions speak to their peer through this trait; the WebSocket
//! binding lives in the server crate and tests drive sessions through
//! an in-memory channel pair. Messages are whole JSON texts, one per
//! call, ordered.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ReelError;

/// Outcome of a bounded receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// A whole inbound text message.
    Message(String),
    /// The deadline passed with nothing queued. Not an error.
    Timeout,
    /// The peer closed the channel cleanly.
    Closed,
}

/// One persistent, ordered, text-message channel to the peer.
#[async_trait]
pub trait Transport: Send {
    /// Sends one text message. A peer that is gone surfaces as
    /// [`ReelError::Disconnected`].
    async fn send(&mut self, text: &str) -> Result<(), ReelError>;

    /// Waits for the next message. `Ok(None)` means the peer closed
    /// the channel cleanly.
    async fn receive(&mut self) -> Result<Option<String>, ReelError>;

    /// Waits for the next message, giving up after `deadline`.
    async fn receive_deadline(&mut self, deadline: Duration) -> Result<Received, ReelError>;

    /// Closes the channel. Idempotent; called on every session exit
    /// path.
    async fn close(&mut self) -> Result<(), ReelError>;
}
