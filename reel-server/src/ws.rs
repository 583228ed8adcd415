//! WebSocket endpoint wiring.
//!
//! Bridges an axum WebSocket onto the [`Transport`] trait and hands
//! each accepted connection to its own [`PlaybackSession`].

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use reel_core::{PlaybackSession, Received, ReelError, StreamContext, Transport};

// ── WsTransport ──────────────────────────────────────────────────

/// [`Transport`] implementation over a single axum WebSocket.
pub struct WsTransport {
    sender: SplitSink<WebSocket, Message>,
    receiver: SplitStream<WebSocket>,
    closed: bool,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        let (sender, receiver) = socket.split();
        Self {
            sender,
            receiver,
            closed: false,
        }
    }

    /// Next text payload. Ping/pong and binary frames are skipped; a
    /// close frame or a dropped socket reads as end of stream.
    async fn next_text(&mut self) -> Result<Option<String>, ReelError> {
        loop {
            match self.receiver.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(ReelError::Transport(e.to_string())),
                None => return Ok(None),
            }
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: &str) -> Result<(), ReelError> {
        self.sender
            .send(Message::Text(text.into()))
            .await
            .map_err(|_| ReelError::Disconnected)
    }

    async fn receive(&mut self) -> Result<Option<String>, ReelError> {
        self.next_text().await
    }

    async fn receive_deadline(&mut self, deadline: Duration) -> Result<Received, ReelError> {
        match tokio::time::timeout(deadline, self.next_text()).await {
            Ok(Ok(Some(text))) => Ok(Received::Message(text)),
            Ok(Ok(None)) => Ok(Received::Closed),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(Received::Timeout),
        }
    }

    async fn close(&mut self) -> Result<(), ReelError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sender
            .send(Message::Close(None))
            .await
            .map_err(|_| ReelError::Disconnected)
    }
}

// ── Routing ──────────────────────────────────────────────────────

pub fn router(context: StreamContext) -> Router {
    Router::new()
        .route("/", get(serve_root))
        .route("/stream", get(stream_ws))
        .with_state(context)
}

/// Serve root discovery endpoint.
async fn serve_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "links": {
            "stream": "/stream",
        }
    }))
}

/// Upgrade the connection and run one playback session on it.
async fn stream_ws(
    State(context): State<StreamContext>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_stream(socket, context))
}

async fn handle_stream(socket: WebSocket, context: StreamContext) {
    debug!("websocket connected");
    let transport = WsTransport::new(socket);
    if let Err(error) = PlaybackSession::new(context, transport).run().await {
        warn!(%error, "session aborted");
    }
    debug!("websocket finished");
}
