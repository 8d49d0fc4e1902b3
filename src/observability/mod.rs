//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers / loader / watcher
//!     → logging.rs (tracing events, request ID attached)
//!     → metrics.rs (quoter_* counters, gauges, histograms)
//!
//! metrics.rs serves Prometheus scrapes on a port of its own
//! ```
//!
//! # Design Decisions
//! - RUST_LOG overrides the configured log level when set
//! - Every quote outcome lands in one labelled counter
//! - Snapshot gauges track table sizes across reloads

pub mod logging;
pub mod metrics;
