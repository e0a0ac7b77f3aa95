//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay and status handlers
//! - Wire up middleware (tracing, timeout, request ID, CORS preamble)
//! - Bind server to listener
//! - Validate the inbound contract before dispatching outbound work

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::http::middleware::{cors_preamble, propagate_request_id};
use crate::observability::metrics;
use crate::relay::{CompletionToken, RelayDispatcher, RelayError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<RelayDispatcher>,
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let dispatcher = Arc::new(RelayDispatcher::new(&config.upstream)?);
        let state = AppState { dispatcher };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        // Later layers wrap earlier ones; the CORS preamble sits outside
        // the timeout so even timeout responses carry its headers.
        Router::new()
            .route("/pdf", any(relay_handler))
            .route("/status", get(status_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(axum::middleware::from_fn(propagate_request_id))
            .layer(axum::middleware::from_fn(cors_preamble))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[derive(Debug, Deserialize)]
struct RelayParams {
    url: Option<String>,
}

/// Main relay handler.
/// Validates the `url` parameter, then hands off to the dispatcher.
async fn relay_handler(
    State(state): State<AppState>,
    Query(params): Query<RelayParams>,
) -> Response {
    let start = Instant::now();

    let Some(url) = params.url.filter(|u| !u.is_empty()) else {
        tracing::warn!("Relay request missing url parameter");
        metrics::record_relay("missing_url", 400, start);
        return RelayError::MissingUrl.into_response();
    };

    tracing::debug!(url = %url, "Relaying document");

    let token = CompletionToken::new();
    state.dispatcher.relay(&url, &token).await
}

#[derive(Serialize)]
struct SystemStatus {
    version: &'static str,
    status: &'static str,
}

async fn status_handler() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}
