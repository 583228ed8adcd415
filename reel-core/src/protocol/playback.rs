//! Playback message types: handshake, controls, and outbound traffic.

use serde::{Deserialize, Serialize};

use crate::error::ReelError;

/// First client message on a fresh connection.
///
/// `videoPath` and `algorithm` are required; every stage toggle defaults
/// to off when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub video_path: String,
    pub algorithm: String,
    #[serde(default)]
    pub edge_detection: bool,
    #[serde(default)]
    pub motion_compensation: bool,
    #[serde(default)]
    pub color_enhancement: bool,
    #[serde(default)]
    pub deep_learning_enhancement: bool,
}

impl Handshake {
    /// Parses the raw handshake text. Anything short of a well-formed
    /// handshake object is a fatal session error.
    pub fn parse(text: &str) -> Result<Self, ReelError> {
        serde_json::from_str(text).map_err(|e| ReelError::Handshake(e.to_string()))
    }
}

/// Client control message, valid any time after the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ControlMessage {
    Pause,
    Play,
    /// Jump to an absolute media time in seconds.
    Seek { time: f64 },
}

/// Parses a control message, returning `None` for anything that is not
/// one. Unknown actions, missing fields, and non-JSON text are all
/// silently ignored by the session.
pub fn parse_control(text: &str) -> Option<ControlMessage> {
    serde_json::from_str(text).ok()
}

/// Server-to-client message.
///
/// The variants are structurally disjoint, so the wire format needs no
/// discriminator field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    /// One processed frame plus its presentation time in seconds.
    Frame {
        #[serde(with = "base64_bytes")]
        frame: Vec<u8>,
        time: f64,
    },
    /// Terminal stream notice. Sent exactly once, nothing follows it.
    Status { status: StreamStatus },
    /// Fatal error notice. The channel closes right after.
    Error { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Ended,
}

impl OutboundMessage {
    pub fn frame(payload: Vec<u8>, time: f64) -> Self {
        Self::Frame {
            frame: payload,
            time,
        }
    }

    pub fn ended() -> Self {
        Self::Status {
            status: StreamStatus::Ended,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::Error {
            error: description.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, ReelError> {
        serde_json::to_string(self).map_err(|e| ReelError::Encoding(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, ReelError> {
        serde_json::from_str(text).map_err(|e| ReelError::Encoding(e.to_string()))
    }
}

/// Serde adapter for binary payloads carried inside JSON strings.
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(Error::custom)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
