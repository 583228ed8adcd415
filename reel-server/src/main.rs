//! Reel server — entry point.
//!
//! ```text
//! reel-server                    Run in the foreground
//! reel-server --config <path>   Load a custom config TOML
//! reel-server --gen-config      Print the default config and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reel_core::{EnhancerRegistry, StreamContext, SyntheticCatalog, ZstdFrameEncoder};
use reel_server::config::ServerConfig;
use reel_server::ws;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "reel-server", about = "Interactive video streaming server")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "reel-server.toml")]
    config: PathBuf,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&ServerConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    // Load config.
    let config = ServerConfig::load(&cli.config);

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("reel-server v{}", env!("CARGO_PKG_VERSION"));
    info!("bind address: {}", config.bind_addr());
    info!("target width: {}", config.stream.target_width);
    info!("compression level: {}", config.stream.compression_level);

    // One shared context; each connection gets its own session.
    let catalog = SyntheticCatalog::new().with_fallback(config.to_spec());
    let context = StreamContext::new(
        Arc::new(catalog),
        Arc::new(EnhancerRegistry::new()),
        Arc::new(ZstdFrameEncoder::with_level(config.stream.compression_level)),
    )
    .with_options(config.to_options());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    axum::serve(listener, ws::router(context))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Ctrl-C received — shutting down");
        })
        .await?;

    Ok(())
}
