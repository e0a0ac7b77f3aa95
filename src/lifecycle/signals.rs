//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate signals into the internal shutdown event

use std::sync::Arc;

use crate::lifecycle::shutdown::Shutdown;

#[cfg(unix)]
async fn signal_received() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn signal_received() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}

/// Wait for a termination signal, then trigger shutdown.
pub async fn wait_for_signal(shutdown: Arc<Shutdown>) {
    signal_received().await;
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
