//! paper-relay: streaming PDF fetch relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 PAPER RELAY                   │
//!                        │                                               │
//!   GET /pdf?url=…       │  ┌──────────┐   ┌───────────┐   ┌─────────┐  │
//!   ─────────────────────┼─▶│ preamble │──▶│ normalize │──▶│ dispatch│──┼──▶ Origin
//!                        │  │ CORS/gate│   │ preview→dl│   │ ≤2 GETs │  │    server
//!                        │  └──────────┘   └───────────┘   └────┬────┘  │
//!                        │                                      │       │
//!   byte stream          │  ┌──────────────┐                    │       │
//!   ◀────────────────────┼──│ finalization │◀───────────────────┘       │
//!                        │  │ guard        │   (stream-through)          │
//!                        │  └──────────────┘                             │
//!                        │                                               │
//!                        │  config · observability · lifecycle           │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use paper_relay::config::{load_config, RelayConfig};
use paper_relay::http::RelayServer;
use paper_relay::lifecycle::{wait_for_signal, Shutdown};
use paper_relay::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "paper-relay", version, about = "Streaming PDF fetch relay")]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init_logging(&config.observability.log_filter);

    tracing::info!("paper-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        attempt_timeout_secs = config.upstream.attempt_timeout_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Initialize metrics exposition
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    // Wire shutdown to OS signals
    let shutdown = Arc::new(Shutdown::new());
    tokio::spawn(wait_for_signal(shutdown.clone()));

    // Create and run HTTP server
    let server = RelayServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
