//! Tick timing for the frame loop.

use std::time::{Duration, Instant};

use crate::session::DEFAULT_FPS;

/// Fixed per-tick time budget derived from the negotiated frame rate.
///
/// Each tick gets `1 / fps` seconds. Whatever the work phase leaves
/// over goes to the control wait; [`pace`](Self::pace) sleeps off the
/// rest so the next tick never starts early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    budget: Duration,
}

impl FrameClock {
    /// Builds a clock for the given frame rate. Non-positive or
    /// non-finite rates fall back to [`DEFAULT_FPS`].
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            DEFAULT_FPS
        };
        Self {
            budget: Duration::from_secs_f64(1.0 / fps),
        }
    }

    /// The full tick budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Budget left in the tick that started at `tick_start`. Saturates
    /// at zero when the work phase overran.
    pub fn remaining(&self, tick_start: Instant) -> Duration {
        self.budget.saturating_sub(tick_start.elapsed())
    }

    /// Sleep for the remainder of the tick.
    pub async fn pace(&self, tick_start: Instant) {
        let remaining = self.remaining(tick_start);
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
