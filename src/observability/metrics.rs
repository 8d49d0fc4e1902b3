//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define quoting metrics (request outcomes, latency, table size)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `quoter_quotes_total` (counter): quote requests by outcome
//! - `quoter_quote_duration_seconds` (histogram): pricing latency
//! - `quoter_quote_lookups_total` (counter): quote-by-id retrievals, hit or
//!   miss
//! - `quoter_table_reloads_total` (counter): snapshot reloads by result
//! - `quoter_postal_ranges` / `quoter_tariff_rows` (gauges): rows in the
//!   installed snapshot
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - The `outcome` label is a closed set: "ok" or an error kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint and register metric descriptions.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Metrics endpoint started");
        }
        Err(e) => {
            tracing::error!("Failed to start metrics endpoint: {}", e);
        }
    }
}

fn describe_metrics() {
    describe_counter!("quoter_quotes_total", "Quote requests by outcome");
    describe_histogram!(
        "quoter_quote_duration_seconds",
        "Time spent resolving and pricing a quote"
    );
    describe_counter!(
        "quoter_quote_lookups_total",
        "Quote-by-id retrievals by outcome"
    );
    describe_counter!("quoter_table_reloads_total", "Rate table reloads by result");
    describe_gauge!("quoter_postal_ranges", "Postal ranges in the installed snapshot");
    describe_gauge!("quoter_tariff_rows", "Tariff rows in the installed snapshot");
}

/// Count one quote request and record how long it took.
pub fn record_quote(outcome: &'static str, started: Instant) {
    counter!("quoter_quotes_total", "outcome" => outcome).increment(1);
    histogram!("quoter_quote_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Count one quote-by-id retrieval.
pub fn record_quote_lookup(outcome: &'static str) {
    counter!("quoter_quote_lookups_total", "outcome" => outcome).increment(1);
}

/// Count one rate table reload attempt.
pub fn record_table_reload(result: &'static str) {
    counter!("quoter_table_reloads_total", "result" => result).increment(1);
}

/// Publish the size of the snapshot that just went live.
pub fn record_snapshot(postal_ranges: usize, tariff_rows: usize) {
    gauge!("quoter_postal_ranges").set(postal_ranges as f64);
    gauge!("quoter_tariff_rows").set(tariff_rows as f64);
}
