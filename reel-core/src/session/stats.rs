//! Per-session delivery counters.

use std::time::{Duration, Instant};

/// Counters logged when a session winds down.
#[derive(Debug, Clone, Copy)]
pub struct StreamStats {
    started: Instant,
    frames_sent: u64,
    bytes_sent: u64,
}

impl Default for StreamStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            frames_sent: 0,
            bytes_sent: 0,
        }
    }

    /// Records one delivered frame of `payload_len` container bytes.
    pub fn record_frame(&mut self, payload_len: usize) {
        self.frames_sent += 1;
        self.bytes_sent += payload_len as u64;
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Frames delivered per wall-clock second. Zero before the first
    /// frame.
    pub fn effective_fps(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if self.frames_sent == 0 || secs <= 0.0 {
            return 0.0;
        }
        self.frames_sent as f64 / secs
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let mut stats = StreamStats::new();
        assert_eq!(stats.frames_sent(), 0);
        assert_eq!(stats.bytes_sent(), 0);
        assert_eq!(stats.effective_fps(), 0.0);

        stats.record_frame(1000);
        stats.record_frame(2500);
        assert_eq!(stats.frames_sent(), 2);
        assert_eq!(stats.bytes_sent(), 3500);
        assert!(stats.effective_fps() > 0.0);
    }
}
