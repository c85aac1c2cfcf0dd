//! HTTP Server configuration and startup.

use std::future::Future;
use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use fx_types::ExchangeRateProvider;

use super::handlers::{self, AppState};
use crate::RateService;

/// HTTP Server for the Exchange Rate API.
pub struct HttpServer<P: ExchangeRateProvider> {
    state: Arc<AppState<P>>,
}

impl<P: ExchangeRateProvider> HttpServer<P> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: RateService<P>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health::<P>))
            .route("/api/exchange-rates", get(handlers::get_rates::<P>))
            .route("/api/exchange-rates/{code}", get(handlers::get_rate::<P>))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address until Ctrl+C or SIGTERM.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        self.run_until(addr, shutdown_signal()).await
    }

    /// Runs the server until `shutdown` resolves, then drains in-flight requests.
    pub async fn run_until<F>(self, addr: &str, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
