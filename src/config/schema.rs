//! Configuration schema for the quoting service.
//!
//! Every section of the TOML file is optional; missing sections and fields
//! fall back to the defaults defined below.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::quoting::curve::ExtrapolationPolicy;

/// Root configuration for the quoting service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Where the HTTP listener binds.
    pub listener: ListenerConfig,

    /// Request deadlines.
    pub timeouts: TimeoutConfig,

    /// Rate table files and reload behavior.
    pub data: DataConfig,

    /// Pricing rules applied on top of the tariff tables.
    pub pricing: PricingConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Network listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address the HTTP server binds to.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Request deadline settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Hard cap on request handling time, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Rate table files and reload behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV file mapping postal code ranges to destinations.
    pub postal_ranges_file: PathBuf,

    /// CSV file with tariff rows and their weight-break prices.
    pub tariffs_file: PathBuf,

    /// Column delimiter of the postal range file.
    pub postal_delimiter: String,

    /// Column delimiter of the tariff file. Exported spreadsheets commonly
    /// use ';' because the prices carry decimal commas.
    pub tariff_delimiter: String,

    /// Watch the files and hot-reload the tables on change.
    pub watch: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            postal_ranges_file: PathBuf::from("data/postal_ranges.csv"),
            tariffs_file: PathBuf::from("data/tariffs.csv"),
            postal_delimiter: ",".to_string(),
            tariff_delimiter: ";".to_string(),
            watch: true,
        }
    }
}

impl DataConfig {
    /// Postal file delimiter as the single byte the CSV reader expects.
    pub fn postal_delimiter_byte(&self) -> u8 {
        self.postal_delimiter.as_bytes().first().copied().unwrap_or(b',')
    }

    /// Tariff file delimiter as the single byte the CSV reader expects.
    pub fn tariff_delimiter_byte(&self) -> u8 {
        self.tariff_delimiter.as_bytes().first().copied().unwrap_or(b';')
    }
}

/// Pricing rules applied on top of the tariff tables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Origin region all tariffs are priced from (e.g., "SP").
    pub origin: String,

    /// How to price weights above the largest break in a curve.
    pub extrapolation: ExtrapolationPolicy,

    /// Fraction of the declared order value added to the price.
    pub surcharge_rate: f64,

    /// How long an issued quote stays retrievable, in seconds.
    pub quote_ttl_secs: u64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            origin: "SP".to_string(),
            extrapolation: ExtrapolationPolicy::FlatFee,
            surcharge_rate: 0.013,
            quote_ttl_secs: 3600,
        }
    }
}

/// Logging and metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set.
    pub log_level: String,

    /// Serve Prometheus metrics.
    pub metrics_enabled: bool,

    /// Address the metrics exporter binds to.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
