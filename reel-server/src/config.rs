//! Configuration for the streaming service.

use std::path::Path;

use serde::{Deserialize, Serialize};

use reel_core::{StreamOptions, SyntheticSpec};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Per-session streaming settings.
    pub stream: StreamSettings,
    /// Built-in test-pattern source.
    pub synthetic: SyntheticConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address to bind the HTTP listener on.
    pub bind: String,
    /// TCP port for WebSocket connections.
    pub port: u16,
}

/// Per-session streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Width every delivered frame is normalized to.
    pub target_width: u32,
    /// Frame rate used when a source does not report one.
    pub fallback_fps: f64,
    /// zstd level for frame payloads (1-19).
    pub compression_level: i32,
}

/// Test-pattern source served for paths the catalog does not know.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
    /// Source frame rate.
    pub fps: f64,
    /// Total frames before the stream ends.
    pub frames: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            stream: StreamSettings::default(),
            synthetic: SyntheticConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8765,
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            target_width: 640,
            fallback_fps: 30.0,
            compression_level: 3,
        }
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30.0,
            frames: 300,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl ServerConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the default configuration to a file (for bootstrapping).
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let cfg = Self::default();
        let text = toml::to_string_pretty(&cfg)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, text)
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.network.bind, self.network.port)
    }

    /// Convert streaming settings into session `StreamOptions`.
    pub fn to_options(&self) -> StreamOptions {
        StreamOptions {
            target_width: self.stream.target_width.max(16),
            fallback_fps: self.stream.fallback_fps,
        }
    }

    /// Convert the test-pattern section into a `SyntheticSpec`.
    pub fn to_spec(&self) -> SyntheticSpec {
        SyntheticSpec {
            width: self.synthetic.width.max(16),
            height: self.synthetic.height.max(16),
            fps: self.synthetic.fps,
            frame_count: self.synthetic.frames,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
