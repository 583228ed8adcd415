//! Named enhancement models.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ReelError;
use crate::frame::VideoFrame;

/// A pluggable frame enhancement model.
///
/// Implementations wrap whatever inference backend a deployment ships.
/// The pipeline treats them as opaque frame transforms; output
/// dimensions may differ from the input and are normalized afterwards.
pub trait FrameEnhancer: Send + Sync {
    fn enhance(&self, frame: &VideoFrame) -> Result<VideoFrame, ReelError>;
}

/// Maps algorithm names to enhancement models, plus an optional
/// post-processing model run by the deep-learning stage.
///
/// Empty registries are valid. Unknown names fall through to the
/// pipeline's passthrough base, and a missing post model turns the
/// deep-learning stage into an identity.
#[derive(Default, Clone)]
pub struct EnhancerRegistry {
    slots: HashMap<String, Arc<dyn FrameEnhancer>>,
    post: Option<Arc<dyn FrameEnhancer>>,
}

impl EnhancerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model under an algorithm name, replacing any
    /// previous holder of that name.
    pub fn register(&mut self, name: impl Into<String>, enhancer: Arc<dyn FrameEnhancer>) {
        self.slots.insert(name.into(), enhancer);
    }

    /// Installs the post-processing model.
    pub fn set_post(&mut self, enhancer: Arc<dyn FrameEnhancer>) {
        self.post = Some(enhancer);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FrameEnhancer>> {
        self.slots.get(name).cloned()
    }

    pub fn post(&self) -> Option<Arc<dyn FrameEnhancer>> {
        self.post.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.post.is_none()
    }
}

impl fmt::Debug for EnhancerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EnhancerRegistry")
            .field("slots", &names)
            .field("post", &self.post.is_some())
            .finish()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
