//! Frame source contract.
//!
//! A [`FrameSource`] hands out decoded frames one at a time and supports
//! random access by frame index. Decoder backends (hardware, file,
//! network) live behind this trait; the crate ships a deterministic
//! synthetic implementation for servers without a decoder and for tests.
//!
//! Sources are opened through a [`SourceCatalog`], which maps the
//! client-supplied path string onto an actual source.

mod synthetic;

pub use synthetic::{SyntheticCatalog, SyntheticSource, SyntheticSpec, synthetic_frame};

use crate::error::ReelError;
use crate::frame::VideoFrame;

/// Static properties of an opened source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    /// Declared frame rate. May be zero or garbage for broken
    /// containers; consumers fall back to a configured default.
    pub fps: f64,
}

/// Result of a single read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Frame(VideoFrame),
    /// The source is exhausted. Not an error.
    EndOfStream,
}

/// A sequential, seekable producer of decoded frames.
pub trait FrameSource: Send + std::fmt::Debug {
    fn info(&self) -> SourceInfo;

    /// Decodes the next frame and advances the position.
    fn read(&mut self) -> Result<ReadOutcome, ReelError>;

    /// Repositions so the next `read` returns the frame at
    /// `frame_index`. Seeking past the end parks the source at the end.
    fn seek(&mut self, frame_index: u64) -> Result<(), ReelError>;

    /// Index of the frame the next `read` will return. After a
    /// successful read this is the index one past the returned frame.
    fn position(&self) -> u64;
}

/// Resolves client path strings to opened sources.
pub trait SourceCatalog: Send + Sync {
    fn open(&self, path: &str) -> Result<Box<dyn FrameSource>, ReelError>;
}
