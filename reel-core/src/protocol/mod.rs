//! Wire protocol for interactive playback sessions.
//!
//! Every message is a single JSON text frame. A session exchanges three
//! kinds of traffic over one persistent channel:
//!
//! ```text
//!   client ──► { "videoPath": "...", "algorithm": "bilinear", ... }   handshake
//!   client ──► { "action": "pause" | "play" }                         control
//!   client ──► { "action": "seek", "time": 12.5 }                     control
//!
//!   server ──► { "frame": "<base64>", "time": 0.033 }                 frame
//!   server ──► { "status": "ended" }                                  end of stream
//!   server ──► { "error": "..." }                                     fatal error
//! ```
//!
//! The handshake is the first client message and is mandatory. Control
//! messages that do not parse are dropped without a reply; the channel
//! stays healthy.

mod playback;

pub use playback::{ControlMessage, Handshake, OutboundMessage, StreamStatus, parse_control};
