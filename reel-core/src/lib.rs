//! # reel-core
//!
//! Core library for the Reel interactive video streaming server.
//!
//! This crate contains:
//! - **Protocol**: handshake, control, and outbound message shapes (JSON over one channel)
//! - **Session**: per-connection lifecycle state machine and fixed-cadence frame loop
//! - **Transform**: resize kernels, motion compensation, edge and color stages, model registry
//! - **Source**: the `FrameSource` contract plus a deterministic synthetic implementation
//! - **Encode**: the zstd frame container behind the `FrameEncoder` seam
//! - **Transport**: the message channel contract servers and tests implement
//! - **Error**: `ReelError` — typed, `thiserror`-based error hierarchy

pub mod encode;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod session;
pub mod source;
pub mod transform;
pub mod transport;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use encode::{FRAME_MAGIC, FrameEncoder, HEADER_LEN, ZstdFrameEncoder, decode_frame};
pub use error::ReelError;
pub use frame::{PixelFormat, VideoFrame};
pub use protocol::{ControlMessage, Handshake, OutboundMessage, StreamStatus, parse_control};
pub use session::{
    DEFAULT_FPS, DEFAULT_TARGET_WIDTH, FrameClock, PlaybackSession, PlaybackState, SessionPhase,
    StreamConfig, StreamContext, StreamOptions, StreamStats,
};
pub use source::{
    FrameSource, ReadOutcome, SourceCatalog, SourceInfo, SyntheticCatalog, SyntheticSource,
    SyntheticSpec, synthetic_frame,
};
pub use transform::{
    BaseTransform, EnhancerRegistry, FrameEnhancer, Interpolation, MotionCompensator, StageFlags,
    TransformPipeline,
};
pub use transport::{Received, Transport};
