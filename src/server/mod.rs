//! # Server Module
//!
//! axum HTTP surface.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /api/generate` | validate, run [`GenerationPipeline`], return `{ outputs }` |
//! | `POST /api/enhance-prompt` | validate, run [`PromptEnhancer`], return `{ enhancedPrompt }` |
//! | `GET /api/health` | liveness with uptime |
//! | anything else | static client from `STATIC_DIR` when configured |
//!
//! Every failure leaves as an [`ErrorBody`](crate::classify::ErrorBody) with
//! the status carried by its [`ClassifiedError`](crate::classify::ClassifiedError).

pub mod handlers;
pub mod response;

pub use response::JsonBody;

use std::io;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::drivers::ProviderDriver;
use crate::pipeline::{GenerationPipeline, PromptEnhancer};
use crate::Result;

/// Shared by every request. Holds no per-request state.
#[derive(Debug)]
pub struct AppState {
    pub pipeline: GenerationPipeline,
    pub enhancer: PromptEnhancer,
    pub started: Instant,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>, driver: Arc<dyn ProviderDriver>) -> Self {
        Self {
            pipeline: GenerationPipeline::new(config.clone(), driver.clone()),
            enhancer: PromptEnhancer::new(config, driver),
            started: Instant::now(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        self.pipeline.config()
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body = state.config().max_request_bytes;
    let static_dir = state.config().static_dir.clone();

    let api = Router::new()
        .route("/generate", post(handlers::generate))
        .route("/enhance-prompt", post(handlers::enhance_prompt))
        .route("/health", get(handlers::health))
        .fallback(handlers::api_not_found)
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state);

    let mut app = Router::new().nest("/api", api);
    if let Some(dir) = static_dir {
        let index = ServeFile::new(dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(dir).fallback(index));
    }

    app.layer(CatchPanicLayer::custom(response::panic_response))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

/// Bind `host:port`; when the port is taken, try `port + 1` once.
pub async fn bind_with_fallback(host: &str, port: u16) -> Result<TcpListener> {
    match TcpListener::bind((host, port)).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            let next = port
                .checked_add(1)
                .ok_or_else(|| io::Error::new(io::ErrorKind::AddrInUse, e.to_string()))?;
            warn!(port, next, "port is busy, trying the next one");
            Ok(TcpListener::bind((host, next)).await?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Serve until SIGINT or SIGTERM, letting in-flight requests finish.
pub async fn serve(config: &ServerConfig, app: Router) -> Result<()> {
    let listener = bind_with_fallback(&config.host, config.port).await?;
    info!(addr = %listener.local_addr()?, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "shutting down gracefully"),
        _ = terminate => info!(signal = "SIGTERM", "shutting down gracefully"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn busy_port_falls_back_to_next() {
        let taken = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();
        if port == u16::MAX {
            return;
        }
        // The next port may itself be in use on a busy host.
        if let Ok(listener) = bind_with_fallback("127.0.0.1", port).await {
            assert_eq!(listener.local_addr().unwrap().port(), port + 1);
        }
    }
}
