//! Stage ordering and dimension normalization.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::error::ReelError;
use crate::frame::VideoFrame;
use crate::protocol::Handshake;
use crate::transform::color::equalize_contrast;
use crate::transform::edge::edge_map;
use crate::transform::motion::MotionCompensator;
use crate::transform::registry::{EnhancerRegistry, FrameEnhancer};
use crate::transform::resize::{Interpolation, resize};

bitflags! {
    /// Optional stages requested in the handshake.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StageFlags: u8 {
        const MOTION_COMPENSATION = 1 << 0;
        const EDGE_DETECTION      = 1 << 1;
        const COLOR_ENHANCEMENT   = 1 << 2;
        const DEEP_LEARNING       = 1 << 3;
    }
}

impl StageFlags {
    pub fn from_handshake(handshake: &Handshake) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::MOTION_COMPENSATION, handshake.motion_compensation);
        flags.set(Self::EDGE_DETECTION, handshake.edge_detection);
        flags.set(Self::COLOR_ENHANCEMENT, handshake.color_enhancement);
        flags.set(Self::DEEP_LEARNING, handshake.deep_learning_enhancement);
        flags
    }
}

/// First stage of every tick, chosen by the handshake `algorithm`.
///
/// Names resolve in order: resize kernel, then registered enhancement
/// model, then passthrough. Passthrough keeps the session alive for
/// algorithm names nobody recognizes.
pub enum BaseTransform {
    Resize(Interpolation),
    Enhance {
        name: String,
        enhancer: Arc<dyn FrameEnhancer>,
    },
    Passthrough,
}

impl BaseTransform {
    pub fn resolve(algorithm: &str, registry: &EnhancerRegistry) -> Self {
        if let Some(kernel) = Interpolation::parse(algorithm) {
            return Self::Resize(kernel);
        }
        if let Some(enhancer) = registry.get(algorithm) {
            return Self::Enhance {
                name: algorithm.to_string(),
                enhancer,
            };
        }
        Self::Passthrough
    }

    fn apply(&self, frame: &VideoFrame, width: u32, height: u32) -> Result<VideoFrame, ReelError> {
        match self {
            Self::Resize(kernel) => Ok(resize(frame, width, height, *kernel)),
            Self::Enhance { enhancer, .. } => enhancer.enhance(frame),
            Self::Passthrough => Ok(frame.clone()),
        }
    }
}

impl fmt::Debug for BaseTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resize(kernel) => f.debug_tuple("Resize").field(kernel).finish(),
            Self::Enhance { name, .. } => f.debug_tuple("Enhance").field(name).finish(),
            Self::Passthrough => f.write_str("Passthrough"),
        }
    }
}

/// Per-session transform pipeline. Stage order is fixed; the handshake
/// only decides which optional stages participate.
///
/// The post model is resolved from the registry once, at construction.
pub struct TransformPipeline {
    base: BaseTransform,
    stages: StageFlags,
    target_width: u32,
    target_height: u32,
    motion: MotionCompensator,
    post: Option<Arc<dyn FrameEnhancer>>,
}

impl fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("base", &self.base)
            .field("stages", &self.stages)
            .field("target_width", &self.target_width)
            .field("target_height", &self.target_height)
            .field("post", &self.post.is_some())
            .finish()
    }
}

impl TransformPipeline {
    pub fn new(
        base: BaseTransform,
        stages: StageFlags,
        target_width: u32,
        target_height: u32,
        registry: &EnhancerRegistry,
    ) -> Self {
        Self {
            base,
            stages,
            target_width,
            target_height,
            motion: MotionCompensator::new(),
            post: registry.post(),
        }
    }

    /// Runs one raw frame through the configured stages.
    ///
    /// `previous_raw` is the raw frame of the prior tick; motion
    /// compensation is skipped when there is none. Whatever the base
    /// stage emits is normalized to the target dimensions before the
    /// optional stages run.
    pub fn process(
        &self,
        raw: &VideoFrame,
        previous_raw: Option<&VideoFrame>,
    ) -> Result<VideoFrame, ReelError> {
        let mut staged = self.base.apply(raw, self.target_width, self.target_height)?;
        if staged.width != self.target_width || staged.height != self.target_height {
            staged = resize(
                &staged,
                self.target_width,
                self.target_height,
                Interpolation::Bilinear,
            );
        }

        if self.stages.contains(StageFlags::MOTION_COMPENSATION) {
            if let Some(previous) = previous_raw {
                staged = self.motion.compensate(previous, raw, &staged);
            }
        }
        if self.stages.contains(StageFlags::EDGE_DETECTION) {
            staged = edge_map(&staged);
        }
        if self.stages.contains(StageFlags::COLOR_ENHANCEMENT) {
            staged = equalize_contrast(&staged);
        }
        if self.stages.contains(StageFlags::DEEP_LEARNING) {
            if let Some(post) = &self.post {
                staged = post.enhance(&staged)?;
            }
        }
        Ok(staged)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
