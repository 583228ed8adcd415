//! Error types shared across the streaming stack.

use thiserror::Error;

/// Main error type for the streaming session and its collaborators.
#[derive(Debug, Error)]
pub enum ReelError {
    // ── Handshake ───────────────────────────────────────────────────────

    /// The first inbound message could not be parsed into a handshake.
    #[error("invalid handshake: {0}")]
    Handshake(String),

    // ── Frame source ────────────────────────────────────────────────────

    /// The requested source could not be opened.
    #[error("cannot open source {path:?}: {reason}")]
    SourceOpen { path: String, reason: String },

    /// A frame could not be decoded mid-stream. Distinct from end of
    /// stream, which is not an error.
    #[error("source read failed: {0}")]
    SourceRead(String),

    // ── Pipeline ────────────────────────────────────────────────────────

    /// A transform stage rejected or failed to process a frame.
    #[error("transform failed: {0}")]
    Transform(String),

    /// Frame payload or message encoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    // ── Transport ───────────────────────────────────────────────────────

    /// The message channel failed in a way that is not a clean close.
    #[error("transport error: {0}")]
    Transport(String),

    /// The peer closed the channel. Sessions treat this as a normal
    /// termination, never as a reportable failure.
    #[error("peer disconnected")]
    Disconnected,

    // ── Session state ───────────────────────────────────────────────────

    /// An operation was attempted in a session phase that forbids it.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),
}

impl ReelError {
    /// Whether the session should surface this error to the client as an
    /// `{"error": ...}` message before tearing down.
    ///
    /// Channel-level failures are excluded: once the transport is gone
    /// there is nobody left to tell.
    pub fn reportable(&self) -> bool {
        matches!(
            self,
            Self::Handshake(_)
                | Self::SourceOpen { .. }
                | Self::SourceRead(_)
                | Self::Transform(_)
                | Self::Encoding(_)
                | Self::ProtocolViolation(_)
        )
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
