//! Session lifecycle state machine.
//!
//! Provides a `SessionPhase` enum that models the full lifecycle of a
//! playback session, with validated transitions that return `Result`
//! instead of panicking.

use std::time::Instant;

use crate::error::ReelError;

// ── PlaybackState ────────────────────────────────────────────────

/// Whether a streaming session is currently delivering frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Frames flow at the source cadence.
    #[default]
    Playing,

    /// Frame delivery is suspended; controls are still serviced.
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Playing => write!(f, "Playing"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

// ── SessionPhase ─────────────────────────────────────────────────

/// The current phase of a playback session.
///
/// ```text
///  Handshaking ──► Streaming(Playing ⇄ Paused) ──► Closed
///       │                                            ▲
///       └────────────────────────────────────────────┘
/// ```
///
/// `Closed` is terminal; there is no reconnection within a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Waiting for the first client message. Initial state.
    #[default]
    Handshaking,

    /// Handshake accepted; the frame loop is running.
    Streaming {
        playback: PlaybackState,
        /// When the session entered the `Streaming` phase.
        since: Instant,
    },

    /// Terminal state. The transport is gone or about to be.
    Closed,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Handshaking => write!(f, "Handshaking"),
            Self::Streaming { playback, .. } => write!(f, "{playback}"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

impl SessionPhase {
    /// Returns `true` when the frame loop is running, paused or not.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming { .. })
    }

    /// Returns `true` when the session should deliver a frame this
    /// tick.
    pub fn is_playing(&self) -> bool {
        matches!(
            self,
            Self::Streaming {
                playback: PlaybackState::Playing,
                ..
            }
        )
    }

    /// Returns `true` once the session has terminated.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// How long the session has been streaming.
    ///
    /// Returns `None` for any other phase.
    pub fn streaming_duration(&self) -> Option<std::time::Duration> {
        match self {
            Self::Streaming { since, .. } => Some(since.elapsed()),
            _ => None,
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Transition to `Streaming`. Playback starts in `Playing`.
    ///
    /// Valid from: `Handshaking`.
    pub fn begin_streaming(&mut self) -> Result<(), ReelError> {
        match self {
            Self::Handshaking => {
                *self = Self::Streaming {
                    playback: PlaybackState::Playing,
                    since: Instant::now(),
                };
                Ok(())
            }
            _ => Err(ReelError::ProtocolViolation(
                "cannot start streaming: not in Handshaking state",
            )),
        }
    }

    /// Suspend frame delivery. A no-op when already paused.
    ///
    /// Valid from: `Streaming`.
    pub fn pause(&mut self) -> Result<(), ReelError> {
        match self {
            Self::Streaming { playback, .. } => {
                *playback = PlaybackState::Paused;
                Ok(())
            }
            _ => Err(ReelError::ProtocolViolation(
                "cannot pause: not in Streaming state",
            )),
        }
    }

    /// Resume frame delivery. A no-op when already playing.
    ///
    /// Valid from: `Streaming`.
    pub fn resume(&mut self) -> Result<(), ReelError> {
        match self {
            Self::Streaming { playback, .. } => {
                *playback = PlaybackState::Playing;
                Ok(())
            }
            _ => Err(ReelError::ProtocolViolation(
                "cannot resume: not in Streaming state",
            )),
        }
    }

    /// Transition to `Closed` regardless of current state.
    ///
    /// Every exit path funnels through here, so it never fails.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }
}

// ── Tests ────────────────────────────────────────────────────────
