//! Freight Quoting Service
//!
//! An HTTP service that prices shipments from CSV rate tables, built with
//! Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /api/quote ──▶ ┌────────┐    ┌─────────┐    ┌─────────────────────┐
//!                      │  http  │───▶│ quoting │───▶│  weight-break curve │
//!   JSON quote    ◀─── │ server │    │ engine  │    │      evaluator      │
//!                      └────────┘    └────┬────┘    └─────────────────────┘
//!                                         │ immutable snapshot (ArcSwap)
//!                                    ┌────▼─────┐    ┌─────────────┐
//!   CSV rate sheets ───────────────▶ │  tables  │◀───│   watcher   │
//!                                    └──────────┘    └─────────────┘
//!
//!   Cross-cutting: config, observability, lifecycle
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use freight_quoter::config::{load_config, ServiceConfig};
use freight_quoter::http::HttpServer;
use freight_quoter::lifecycle::{wait_for_signal, Shutdown};
use freight_quoter::observability::{logging, metrics};
use freight_quoter::tables::watcher::DataWatcher;
use freight_quoter::tables::{load_tables, TableSet};

/// Freight quoting service over CSV rate tables.
#[derive(Parser)]
#[command(name = "freight-quoter", version)]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!("freight-quoter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        postal_ranges_file = %config.data.postal_ranges_file.display(),
        tariffs_file = %config.data.tariffs_file.display(),
        origin = %config.pricing.origin,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Load the initial snapshot. A failed load is not fatal: the service
    // starts degraded and quoting returns 503 until a reload succeeds.
    let tables: Arc<ArcSwapOption<TableSet>> = Arc::new(ArcSwapOption::empty());
    match load_tables(&config.data) {
        Ok(snapshot) => {
            tracing::info!(
                postal_ranges = snapshot.postal_ranges(),
                tariff_rows = snapshot.tariff_rows(),
                "Rate tables loaded"
            );
            metrics::record_snapshot(snapshot.postal_ranges(), snapshot.tariff_rows());
            metrics::record_table_reload("ok");
            tables.store(Some(Arc::new(snapshot)));
        }
        Err(e) => {
            tracing::error!("Failed to load rate tables: {}. Starting degraded.", e);
            metrics::record_table_reload("error");
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    // Keep the notify handle alive for the lifetime of the server, or the
    // OS watches are dropped.
    let mut _watcher = None;
    let table_updates = if config.data.watch {
        let (watcher, updates) = DataWatcher::new(config.data.clone());
        match watcher.run() {
            Ok(handle) => _watcher = Some(handle),
            Err(e) => {
                tracing::error!("Failed to start rate table watcher: {}. Hot reload disabled.", e);
            }
        }
        updates
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        updates
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config, tables);
    server.run(listener, table_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
