//! Integration tests — full session lifecycle, playback controls, and
//! error scenarios over an in-memory transport.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;

use reel_core::{
    EnhancerRegistry, FrameEnhancer, OutboundMessage, PlaybackSession, Received, ReelError,
    StreamContext, StreamOptions, SyntheticCatalog, SyntheticSpec, Transport, VideoFrame,
    ZstdFrameEncoder, decode_frame, synthetic_frame,
};

// ── Helpers ──────────────────────────────────────────────────────

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound for replies owed within a few 20 ms tick budgets: five ticks
/// plus scheduler slack.
const PROMPT_TIMEOUT: Duration = Duration::from_millis(200);

/// Server half of an in-memory channel pair.
struct TestTransport {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl Transport for TestTransport {
    async fn send(&mut self, text: &str) -> Result<(), ReelError> {
        let sender = self.outbound.as_ref().ok_or(ReelError::Disconnected)?;
        sender
            .send(text.to_string())
            .map_err(|_| ReelError::Disconnected)
    }

    async fn receive(&mut self) -> Result<Option<String>, ReelError> {
        Ok(self.inbound.recv().await)
    }

    async fn receive_deadline(&mut self, deadline: Duration) -> Result<Received, ReelError> {
        match tokio::time::timeout(deadline, self.inbound.recv()).await {
            Ok(Some(text)) => Ok(Received::Message(text)),
            Ok(None) => Ok(Received::Closed),
            Err(_) => Ok(Received::Timeout),
        }
    }

    async fn close(&mut self) -> Result<(), ReelError> {
        self.outbound.take();
        Ok(())
    }
}

/// Client half of the channel pair.
struct TestClient {
    to_server: Option<mpsc::UnboundedSender<String>>,
    from_server: mpsc::UnboundedReceiver<String>,
}

impl TestClient {
    fn send_json(&self, value: serde_json::Value) {
        self.send_text(&value.to_string());
    }

    fn send_text(&self, text: &str) {
        self.to_server
            .as_ref()
            .expect("client already disconnected")
            .send(text.to_string())
            .expect("server side gone");
    }

    /// Simulates the client going away without a goodbye.
    fn disconnect(&mut self) {
        self.to_server.take();
    }

    /// Next server message, or `None` once the server closed the
    /// channel.
    async fn next_message(&mut self) -> Option<OutboundMessage> {
        self.next_message_within(RECV_TIMEOUT).await
    }

    /// Same as `next_message` but with a caller-chosen deadline, for
    /// latency-sensitive expectations.
    async fn next_message_within(&mut self, deadline: Duration) -> Option<OutboundMessage> {
        let text = tokio::time::timeout(deadline, self.from_server.recv())
            .await
            .expect("timed out waiting for a server message")?;
        Some(OutboundMessage::from_json(&text).expect("unparseable server message"))
    }

    /// Collects every remaining message until the server closes.
    async fn drain(&mut self) -> Vec<OutboundMessage> {
        let mut messages = Vec::new();
        while let Some(msg) = self.next_message().await {
            messages.push(msg);
        }
        messages
    }

    /// Reads messages until the channel goes quiet for `gap`.
    async fn settle(&mut self, gap: Duration) -> Vec<OutboundMessage> {
        let mut drained = Vec::new();
        while let Ok(Some(text)) = tokio::time::timeout(gap, self.from_server.recv()).await {
            drained.push(OutboundMessage::from_json(&text).expect("unparseable server message"));
        }
        drained
    }

    /// Asserts the server sends nothing for `window`.
    async fn expect_quiet(&mut self, window: Duration) {
        if let Ok(msg) = tokio::time::timeout(window, self.from_server.recv()).await {
            panic!("expected a quiet channel, got {msg:?}");
        }
    }
}

fn channel_pair() -> (TestTransport, TestClient) {
    let (to_server, inbound) = mpsc::unbounded_channel();
    let (outbound, from_server) = mpsc::unbounded_channel();
    (
        TestTransport {
            inbound,
            outbound: Some(outbound),
        },
        TestClient {
            to_server: Some(to_server),
            from_server,
        },
    )
}

/// Small source and output so ticks stay cheap under a debug build.
fn fast_spec() -> SyntheticSpec {
    SyntheticSpec {
        width: 128,
        height: 72,
        fps: 50.0,
        frame_count: 5000,
    }
}

fn fast_options() -> StreamOptions {
    StreamOptions {
        target_width: 64,
        fallback_fps: 30.0,
    }
}

fn context_for(spec: SyntheticSpec, options: StreamOptions) -> StreamContext {
    let catalog = SyntheticCatalog::new().with_source("clip.mp4", spec);
    StreamContext::new(
        Arc::new(catalog),
        Arc::new(EnhancerRegistry::new()),
        Arc::new(ZstdFrameEncoder::new()),
    )
    .with_options(options)
}

fn spawn_session(context: StreamContext) -> TestClient {
    let (transport, client) = channel_pair();
    tokio::spawn(async move {
        let _ = PlaybackSession::new(context, transport).run().await;
    });
    client
}

fn handshake(algorithm: &str) -> serde_json::Value {
    json!({ "videoPath": "clip.mp4", "algorithm": algorithm })
}

fn frame_fields(msg: OutboundMessage) -> (Vec<u8>, f64) {
    match msg {
        OutboundMessage::Frame { frame, time } => (frame, time),
        other => panic!("expected a frame, got {other:?}"),
    }
}

// ── Handshake and first frame ────────────────────────────────────

#[tokio::test]
async fn test_full_hd_source_is_normalized_to_640x360() {
    let spec = SyntheticSpec {
        width: 1920,
        height: 1080,
        fps: 30.0,
        frame_count: 10,
    };
    let mut client = spawn_session(context_for(spec, StreamOptions::default()));
    client.send_json(handshake("bilinear"));

    let (payload, time) = frame_fields(client.next_message().await.expect("no frame"));
    let frame = decode_frame(&payload).expect("bad frame container");
    assert_eq!((frame.width, frame.height), (640, 360));
    assert!(time > 0.0);
}

#[tokio::test]
async fn test_unknown_algorithm_streams_passthrough_frames() {
    // Source already at the target size, so passthrough is exact.
    let spec = SyntheticSpec {
        width: 64,
        height: 36,
        fps: 50.0,
        frame_count: 10,
    };
    let mut client = spawn_session(context_for(spec, fast_options()));
    client.send_json(handshake("definitely-not-real"));

    let (payload, _) = frame_fields(client.next_message().await.expect("no frame"));
    let frame = decode_frame(&payload).unwrap();
    assert_eq!(frame, synthetic_frame(&spec, 0).to_rgb8());
}

#[tokio::test]
async fn test_first_tick_skips_motion_compensation() {
    let spec = SyntheticSpec {
        width: 64,
        height: 36,
        fps: 50.0,
        frame_count: 10,
    };
    let mut client = spawn_session(context_for(spec, fast_options()));
    client.send_json(json!({
        "videoPath": "clip.mp4",
        "algorithm": "bilinear",
        "motionCompensation": true,
    }));

    // With no previous frame the first delivery is the plain source
    // frame.
    let (payload, _) = frame_fields(client.next_message().await.expect("no frame"));
    let frame = decode_frame(&payload).unwrap();
    assert_eq!(frame, synthetic_frame(&spec, 0).to_rgb8());
}

#[tokio::test]
async fn test_first_frame_lands_within_a_few_ticks() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_json(handshake("bilinear"));

    // Work runs at the head of the tick; the handshake reply must not
    // drift past a few budgets.
    let msg = client
        .next_message_within(PROMPT_TIMEOUT)
        .await
        .expect("no first frame");
    assert!(matches!(msg, OutboundMessage::Frame { .. }));
}

// ── Handshake failures ───────────────────────────────────────────

#[tokio::test]
async fn test_malformed_handshake_gets_error_then_close() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_text("this is not json");

    let messages = client.drain().await;
    assert_eq!(messages.len(), 1);
    assert!(matches!(messages[0], OutboundMessage::Error { .. }));
}

#[tokio::test]
async fn test_handshake_missing_required_field_is_fatal() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_json(json!({ "algorithm": "bilinear" }));

    let messages = client.drain().await;
    assert_eq!(messages.len(), 1);
    let OutboundMessage::Error { error } = &messages[0] else {
        panic!("expected an error, got {:?}", messages[0]);
    };
    assert!(error.contains("videoPath"), "error was: {error}");
}

#[tokio::test]
async fn test_unknown_path_reports_source_open_error() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_json(json!({ "videoPath": "missing.mp4", "algorithm": "bilinear" }));

    let messages = client.drain().await;
    assert_eq!(messages.len(), 1);
    let OutboundMessage::Error { error } = &messages[0] else {
        panic!("expected an error, got {:?}", messages[0]);
    };
    assert!(error.contains("missing.mp4"), "error was: {error}");
}

// ── Playback controls ────────────────────────────────────────────

#[tokio::test]
async fn test_pause_suppresses_frames_until_play() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_json(handshake("bilinear"));
    client.next_message().await.expect("no first frame");

    client.send_json(json!({ "action": "pause" }));
    // Let in-flight frames land, then the channel must stay quiet.
    client.settle(Duration::from_millis(80)).await;
    client.expect_quiet(Duration::from_millis(150)).await;

    client.send_json(json!({ "action": "play" }));
    // A paused tick spends its whole budget in the control wait, so
    // play takes effect within a tick or two.
    let msg = client
        .next_message_within(PROMPT_TIMEOUT)
        .await
        .expect("no frame after play");
    assert!(matches!(msg, OutboundMessage::Frame { .. }));
}

#[tokio::test]
async fn test_seek_while_paused_emits_nothing_until_play() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_json(handshake("bilinear"));
    client.next_message().await.expect("no first frame");

    client.send_json(json!({ "action": "pause" }));
    client.settle(Duration::from_millis(80)).await;

    client.send_json(json!({ "action": "seek", "time": 2.0 }));
    client.expect_quiet(Duration::from_millis(150)).await;

    client.send_json(json!({ "action": "play" }));
    let (_, time) = frame_fields(client.next_message().await.expect("no frame after play"));
    // First frame after the seek sits within one frame duration of the
    // requested time (50 fps -> 20 ms).
    assert!((time - 2.0).abs() <= 0.0201, "time was {time}");
}

#[tokio::test]
async fn test_seek_while_playing_jumps_the_clock() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_json(handshake("bilinear"));
    client.next_message().await.expect("no first frame");

    client.send_json(json!({ "action": "seek", "time": 2.0 }));

    // Skip frames already in flight; the jump must land close to the
    // requested time.
    let mut landed = None;
    for _ in 0..20 {
        let (_, time) = frame_fields(client.next_message().await.expect("stream died"));
        if time >= 1.0 {
            landed = Some(time);
            break;
        }
        // Pre-seek frames come from the head of the clip.
        assert!(time < 0.5, "unexpected mid-clip frame at {time}");
    }
    let time = landed.expect("never saw a post-seek frame");
    assert!((time - 2.0).abs() <= 0.0201, "time was {time}");
}

#[tokio::test]
async fn test_unknown_controls_are_ignored() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_json(handshake("bilinear"));
    client.next_message().await.expect("no first frame");

    client.send_json(json!({ "action": "rewind" }));
    client.send_json(json!({ "speed": 2.0 }));
    client.send_text("garbage");

    // The stream keeps flowing and never errors.
    for _ in 0..3 {
        let msg = client.next_message().await.expect("stream died");
        assert!(matches!(msg, OutboundMessage::Frame { .. }));
    }
}

// ── Stream end and teardown ──────────────────────────────────────

#[tokio::test]
async fn test_exhausted_source_ends_with_single_status() {
    let spec = SyntheticSpec {
        width: 64,
        height: 36,
        fps: 100.0,
        frame_count: 3,
    };
    let mut client = spawn_session(context_for(spec, fast_options()));
    client.send_json(handshake("bilinear"));

    let messages = client.drain().await;
    assert_eq!(messages.len(), 4, "got {messages:?}");
    for msg in &messages[..3] {
        assert!(matches!(msg, OutboundMessage::Frame { .. }));
    }
    assert_eq!(messages[3], OutboundMessage::ended());
}

#[tokio::test]
async fn test_client_disconnect_is_swallowed() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_json(handshake("bilinear"));
    client.next_message().await.expect("no first frame");

    client.disconnect();

    // The session winds down without reporting an error.
    let rest = client.drain().await;
    assert!(
        rest.iter().all(|m| matches!(m, OutboundMessage::Frame { .. })),
        "got {rest:?}"
    );
}

#[tokio::test]
async fn test_failing_model_reports_transform_error() {
    struct Failing;

    impl FrameEnhancer for Failing {
        fn enhance(&self, _frame: &VideoFrame) -> Result<VideoFrame, ReelError> {
            Err(ReelError::Transform("inference backend offline".into()))
        }
    }

    let mut registry = EnhancerRegistry::new();
    registry.set_post(Arc::new(Failing));
    let catalog = SyntheticCatalog::new().with_source("clip.mp4", fast_spec());
    let context = StreamContext::new(
        Arc::new(catalog),
        Arc::new(registry),
        Arc::new(ZstdFrameEncoder::new()),
    )
    .with_options(fast_options());

    let mut client = spawn_session(context);
    client.send_json(json!({
        "videoPath": "clip.mp4",
        "algorithm": "bilinear",
        "deepLearningEnhancement": true,
    }));

    let messages = client.drain().await;
    assert_eq!(messages.len(), 1);
    let OutboundMessage::Error { error } = &messages[0] else {
        panic!("expected an error, got {:?}", messages[0]);
    };
    assert!(error.contains("transform"), "error was: {error}");
}

// ── Cadence ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_frames_are_paced_to_the_source_rate() {
    let mut client = spawn_session(context_for(fast_spec(), fast_options()));
    client.send_json(handshake("bilinear"));

    client.next_message().await.expect("no first frame");
    let started = Instant::now();
    for _ in 0..5 {
        let msg = client.next_message().await.expect("stream died");
        assert!(matches!(msg, OutboundMessage::Frame { .. }));
    }

    // Five more ticks at 50 fps take at least ~100 ms; allow slack for
    // receive-side jitter but reject a free-running loop.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(90), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "elapsed {elapsed:?}");
}
