//! HTTP server assembly.
//!
//! # Responsibilities
//! - Route the quoting and health endpoints
//! - Wire up middleware (tracing, timeout, request ID)
//! - Apply rebuilt rate table snapshots while serving
//! - Drive graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::http::request::RequestIdLayer;
use crate::http::{quote, status};
use crate::observability::metrics;
use crate::quoting::QuoteEngine;
use crate::tables::TableSet;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: QuoteEngine,
    pub tables: Arc<ArcSwapOption<TableSet>>,
}

/// HTTP server for the quoting service.
pub struct HttpServer {
    router: Router,
    tables: Arc<ArcSwapOption<TableSet>>,
}

impl HttpServer {
    /// Create a new HTTP server over a shared table snapshot slot.
    pub fn new(config: ServiceConfig, tables: Arc<ArcSwapOption<TableSet>>) -> Self {
        let engine = QuoteEngine::new(Arc::clone(&tables), config.pricing.clone());

        let state = AppState {
            engine,
            tables: Arc::clone(&tables),
        };

        let router = Self::build_router(&config, state);
        Self { router, tables }
    }

    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/quote", get(quote::single))
            .route("/api/quotes", get(quote::all))
            .route("/api/quote/{id}", get(quote::by_id))
            .route("/health", get(status::health))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
            // Outermost, so the request ID exists before the trace span
            // opens.
            .layer(RequestIdLayer)
    }

    /// Serve until the shutdown signal fires.
    ///
    /// Snapshots arriving on `table_updates` are installed atomically;
    /// in-flight requests keep the snapshot they started with.
    pub async fn run(
        self,
        listener: TcpListener,
        mut table_updates: mpsc::UnboundedReceiver<Arc<TableSet>>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let tables = Arc::clone(&self.tables);
        tokio::spawn(async move {
            while let Some(snapshot) = table_updates.recv().await {
                tracing::info!(
                    postal_ranges = snapshot.postal_ranges(),
                    tariff_rows = snapshot.tariff_rows(),
                    "Installing new rate table snapshot"
                );
                metrics::record_snapshot(snapshot.postal_ranges(), snapshot.tariff_rows());
                tables.store(Some(snapshot));
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
