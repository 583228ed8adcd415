//! Per-connection playback sessions.
//!
//! A session owns one transport and drives it through the lifecycle in
//! [`phase`]: handshake, then a fixed-cadence frame loop, then close.
//! Every tick does at most three things, in order:
//!
//! ```text
//!   1. work     read → transform → encode → send   (only while Playing)
//!   2. controls block on the channel for the leftover tick budget
//!   3. pace     sleep off whatever budget remains
//! ```
//!
//! Pausing skips step 1, which hands the whole budget to the control
//! wait. The source is owned by the loop and dropped on every exit
//! path, clean or not.
//!
//! | Module  | Purpose                          |
//! |---------|----------------------------------|
//! | `phase` | Lifecycle state machine          |
//! | `clock` | Tick budget and pacing           |
//! | `stats` | Per-session delivery counters    |

pub mod clock;
pub mod phase;
pub mod stats;

pub use clock::FrameClock;
pub use phase::{PlaybackState, SessionPhase};
pub use stats::StreamStats;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::encode::FrameEncoder;
use crate::error::ReelError;
use crate::frame::VideoFrame;
use crate::protocol::{ControlMessage, Handshake, OutboundMessage, parse_control};
use crate::source::{FrameSource, ReadOutcome, SourceCatalog, SourceInfo};
use crate::transform::{BaseTransform, StageFlags, TransformPipeline};
use crate::transform::registry::EnhancerRegistry;
use crate::transport::{Received, Transport};

// ── Constants ────────────────────────────────────────────────────

/// Output width every session is normalized to.
pub const DEFAULT_TARGET_WIDTH: u32 = 640;

/// Frame rate used when a source declares none.
pub const DEFAULT_FPS: f64 = 30.0;

// ── StreamOptions ────────────────────────────────────────────────

/// Server-level knobs shared by all sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamOptions {
    pub target_width: u32,
    pub fallback_fps: f64,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            fallback_fps: DEFAULT_FPS,
        }
    }
}

// ── StreamContext ────────────────────────────────────────────────

/// Shared collaborators handed to every session the server spawns.
#[derive(Clone)]
pub struct StreamContext {
    pub catalog: Arc<dyn SourceCatalog>,
    pub registry: Arc<EnhancerRegistry>,
    pub encoder: Arc<dyn FrameEncoder>,
    pub options: StreamOptions,
}

impl StreamContext {
    pub fn new(
        catalog: Arc<dyn SourceCatalog>,
        registry: Arc<EnhancerRegistry>,
        encoder: Arc<dyn FrameEncoder>,
    ) -> Self {
        Self {
            catalog,
            registry,
            encoder,
            options: StreamOptions::default(),
        }
    }

    pub fn with_options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }
}

// ── StreamConfig ─────────────────────────────────────────────────

/// Negotiated per-session parameters, fixed at handshake time.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub video_path: String,
    pub algorithm: String,
    pub target_width: u32,
    pub target_height: u32,
    /// Session frame rate. Re-reads of the source mid-stream never
    /// change it.
    pub fps: f64,
    pub stages: StageFlags,
}

impl StreamConfig {
    /// Combines the handshake, the opened source, and the server
    /// options. Height preserves the source aspect ratio; a source
    /// without a usable frame rate gets the fallback.
    pub fn derive(handshake: &Handshake, info: &SourceInfo, options: &StreamOptions) -> Self {
        let target_width = options.target_width.max(1);
        let target_height = ((target_width as f64 * info.height as f64
            / info.width.max(1) as f64)
            .round() as u32)
            .max(1);

        let mut fps = info.fps;
        if !(fps.is_finite() && fps > 0.0) {
            fps = options.fallback_fps;
        }
        if !(fps.is_finite() && fps > 0.0) {
            fps = DEFAULT_FPS;
        }

        Self {
            video_path: handshake.video_path.clone(),
            algorithm: handshake.algorithm.clone(),
            target_width,
            target_height,
            fps,
            stages: StageFlags::from_handshake(handshake),
        }
    }
}

/// Frame index for an absolute seek time.
///
/// Uses the source's own frame rate when it declares a usable one,
/// otherwise the session rate. Negative times clamp to the start.
pub(crate) fn seek_frame_index(time: f64, source_fps: f64, session_fps: f64) -> u64 {
    let fps = if source_fps.is_finite() && source_fps > 0.0 {
        source_fps
    } else {
        session_fps
    };
    (time.max(0.0) * fps).round() as u64
}

// ── PlaybackSession ──────────────────────────────────────────────

/// Everything negotiated at handshake time plus the loop's running
/// state. Owning the source here makes its release automatic on every
/// exit path.
struct ActiveStream {
    config: StreamConfig,
    source: Box<dyn FrameSource>,
    pipeline: TransformPipeline,
    clock: FrameClock,
    /// Raw frame of the previous tick, for motion compensation.
    /// Cleared on seek.
    previous: Option<VideoFrame>,
}

enum TickOutcome {
    Delivered,
    Ended,
}

/// One client connection, driven to completion by [`run`](Self::run).
pub struct PlaybackSession<T: Transport> {
    context: StreamContext,
    transport: T,
    phase: SessionPhase,
    stats: StreamStats,
}

impl<T: Transport> PlaybackSession<T> {
    pub fn new(context: StreamContext, transport: T) -> Self {
        Self {
            context,
            transport,
            phase: SessionPhase::default(),
            stats: StreamStats::new(),
        }
    }

    /// Drives the session until the stream ends, the client leaves, or
    /// an error tears it down. The transport is closed on every exit
    /// path; a client-initiated disconnect is a normal ending, not an
    /// error.
    pub async fn run(mut self) -> Result<(), ReelError> {
        let outcome = self.drive().await;
        let _ = self.transport.close().await;

        match outcome {
            Ok(()) => {
                info!(
                    frames = self.stats.frames_sent(),
                    bytes = self.stats.bytes_sent(),
                    effective_fps = self.stats.effective_fps(),
                    "session finished"
                );
                Ok(())
            }
            Err(ReelError::Disconnected) => {
                debug!(frames = self.stats.frames_sent(), "peer disconnected");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn drive(&mut self) -> Result<(), ReelError> {
        let mut stream = match self.negotiate().await {
            Ok(stream) => stream,
            Err(e) => {
                self.phase.close();
                self.report(&e).await;
                return Err(e);
            }
        };

        self.phase.begin_streaming()?;
        let outcome = self.pump(&mut stream).await;
        self.phase.close();
        if let Err(e) = &outcome {
            self.report(e).await;
        }
        outcome
    }

    /// Receives and validates the handshake, opens the source, and
    /// fixes the session configuration.
    async fn negotiate(&mut self) -> Result<ActiveStream, ReelError> {
        let text = match self.transport.receive().await? {
            Some(text) => text,
            None => return Err(ReelError::Disconnected),
        };
        let handshake = Handshake::parse(&text)?;
        let source = self.context.catalog.open(&handshake.video_path)?;
        let config = StreamConfig::derive(&handshake, &source.info(), &self.context.options);

        info!(
            path = %config.video_path,
            algorithm = %config.algorithm,
            width = config.target_width,
            height = config.target_height,
            fps = config.fps,
            stages = ?config.stages,
            "session configured"
        );

        let base = BaseTransform::resolve(&config.algorithm, &self.context.registry);
        let pipeline = TransformPipeline::new(
            base,
            config.stages,
            config.target_width,
            config.target_height,
            &self.context.registry,
        );
        let clock = FrameClock::new(config.fps);

        Ok(ActiveStream {
            config,
            source,
            pipeline,
            clock,
            previous: None,
        })
    }

    /// The frame loop. One frame at most per tick, one control wait
    /// per tick, then pacing.
    async fn pump(&mut self, stream: &mut ActiveStream) -> Result<(), ReelError> {
        loop {
            let tick_start = Instant::now();

            // 1. Work phase.
            if self.phase.is_playing() {
                match self.advance(stream).await? {
                    TickOutcome::Delivered => {}
                    TickOutcome::Ended => {
                        self.send(&OutboundMessage::ended()).await?;
                        debug!("stream ended");
                        return Ok(());
                    }
                }
            }

            // 2. Control wait, bounded by the leftover budget. A
            //    timeout just means the tick had no traffic.
            match self
                .transport
                .receive_deadline(stream.clock.remaining(tick_start))
                .await?
            {
                Received::Message(text) => {
                    if let Some(control) = parse_control(&text) {
                        self.apply_control(stream, control)?;
                    }
                }
                Received::Timeout => {}
                Received::Closed => return Err(ReelError::Disconnected),
            }

            // 3. Frame pacing.
            stream.clock.pace(tick_start).await;
        }
    }

    /// Reads, transforms, encodes, and delivers one frame.
    async fn advance(&mut self, stream: &mut ActiveStream) -> Result<TickOutcome, ReelError> {
        let raw = match stream.source.read()? {
            ReadOutcome::Frame(frame) => frame,
            ReadOutcome::EndOfStream => return Ok(TickOutcome::Ended),
        };

        let staged = stream.pipeline.process(&raw, stream.previous.as_ref())?;
        let payload = self.context.encoder.encode(&staged)?;
        let payload_len = payload.len();

        // Position is already past the frame we just read, matching
        // the "time of the next frame" convention clients expect.
        let time = stream.source.position() as f64 / stream.config.fps;

        self.send(&OutboundMessage::frame(payload, time)).await?;
        self.stats.record_frame(payload_len);
        stream.previous = Some(raw);
        Ok(TickOutcome::Delivered)
    }

    fn apply_control(
        &mut self,
        stream: &mut ActiveStream,
        control: ControlMessage,
    ) -> Result<(), ReelError> {
        match control {
            ControlMessage::Pause => {
                debug!("playback paused");
                self.phase.pause()?;
            }
            ControlMessage::Play => {
                debug!("playback resumed");
                self.phase.resume()?;
            }
            ControlMessage::Seek { time } => {
                let index = seek_frame_index(time, stream.source.info().fps, stream.config.fps);
                debug!(time, index, "seek");
                stream.source.seek(index)?;
                stream.previous = None;
            }
        }
        Ok(())
    }

    async fn send(&mut self, message: &OutboundMessage) -> Result<(), ReelError> {
        let text = message.to_json()?;
        self.transport.send(&text).await
    }

    /// Best-effort error notice. Channel-level failures have nobody
    /// left to tell and are skipped.
    async fn report(&mut self, error: &ReelError) {
        if !error.reportable() {
            return;
        }
        warn!(%error, "session failed");
        if let Ok(text) = OutboundMessage::error(error.to_string()).to_json() {
            let _ = self.transport.send(&text).await;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
