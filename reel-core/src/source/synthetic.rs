//! Deterministic synthetic frame source.
//!
//! Renders a moving gradient pattern keyed to the frame index, so any
//! two sources with the same spec produce byte-identical frames. Used
//! as the demo source in servers without a real decoder and as the
//! workhorse source in tests.

use std::collections::HashMap;

use crate::error::ReelError;
use crate::frame::{PixelFormat, VideoFrame};
use crate::source::{FrameSource, ReadOutcome, SourceCatalog, SourceInfo};

/// Parameters of a synthetic clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSpec {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30.0,
            frame_count: 300,
        }
    }
}

/// Renders the frame at `index` for the given spec.
///
/// The pattern is a diagonal gradient that scrolls with the index, so
/// consecutive frames differ everywhere and the content of any index
/// can be recomputed independently.
pub fn synthetic_frame(spec: &SyntheticSpec, index: u64) -> VideoFrame {
    let mut frame = VideoFrame::new(spec.width, spec.height, PixelFormat::Bgr8);
    let phase = (index % 256) as u32;
    for y in 0..spec.height {
        for x in 0..spec.width {
            let b = ((x + phase) % 256) as u8;
            let g = ((y + 2 * phase) % 256) as u8;
            let r = ((x + y) % 256) as u8;
            frame.set_pixel(x, y, [b, g, r]);
        }
    }
    frame
}

/// Synthetic clip playing the [`synthetic_frame`] pattern.
#[derive(Debug)]
pub struct SyntheticSource {
    spec: SyntheticSpec,
    position: u64,
}

impl SyntheticSource {
    pub fn new(spec: SyntheticSpec) -> Self {
        Self { spec, position: 0 }
    }
}

impl FrameSource for SyntheticSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            width: self.spec.width,
            height: self.spec.height,
            fps: self.spec.fps,
        }
    }

    fn read(&mut self) -> Result<ReadOutcome, ReelError> {
        if self.position >= self.spec.frame_count {
            return Ok(ReadOutcome::EndOfStream);
        }
        let frame = synthetic_frame(&self.spec, self.position);
        self.position += 1;
        Ok(ReadOutcome::Frame(frame))
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), ReelError> {
        self.position = frame_index.min(self.spec.frame_count);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }
}

/// Catalog of named synthetic clips with an optional catch-all.
///
/// With a fallback configured, every path resolves to a fresh source of
/// the fallback spec. Without one, unknown paths fail to open.
#[derive(Debug, Clone, Default)]
pub struct SyntheticCatalog {
    sources: HashMap<String, SyntheticSpec>,
    fallback: Option<SyntheticSpec>,
}

impl SyntheticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: impl Into<String>, spec: SyntheticSpec) -> Self {
        self.sources.insert(path.into(), spec);
        self
    }

    pub fn with_fallback(mut self, spec: SyntheticSpec) -> Self {
        self.fallback = Some(spec);
        self
    }
}

impl SourceCatalog for SyntheticCatalog {
    fn open(&self, path: &str) -> Result<Box<dyn FrameSource>, ReelError> {
        let spec = self
            .sources
            .get(path)
            .copied()
            .or(self.fallback)
            .ok_or_else(|| ReelError::SourceOpen {
                path: path.to_string(),
                reason: "no such source".to_string(),
            })?;
        if spec.width == 0 || spec.height == 0 {
            return Err(ReelError::SourceOpen {
                path: path.to_string(),
                reason: "source has empty dimensions".to_string(),
            });
        }
        Ok(Box::new(SyntheticSource::new(spec)))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
