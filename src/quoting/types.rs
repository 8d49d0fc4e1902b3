//! Quote data structures shared by the engine and the HTTP layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::quoting::curve::{CurveError, MatchedBreak};
use crate::tables::postal::Classification;

/// A request to price one shipment.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    /// Destination postal code, formatted or bare digits.
    pub postal_code: String,
    /// Shipment weight in kilograms.
    pub weight: f64,
    /// Order value for the optional percentage surcharge.
    pub declared_value: Option<f64>,
    /// Pin the quote to one service level; `None` takes the first tariff
    /// row that matches the destination.
    pub service: Option<String>,
}

/// A priced shipment.
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    /// Unique identifier for the quote.
    pub id: Uuid,
    pub service: String,
    /// Destination region code, e.g. the state.
    pub region: String,
    pub locality: String,
    pub classification: Classification,
    pub lead_time_days: u32,
    pub weight: f64,
    /// The part of the break curve that produced the price.
    pub matched_break: MatchedBreak,
    /// Final price in currency units, rounded to cents.
    pub price: f64,
    /// Unix timestamp when this quote expires.
    pub expires_at: u64,
}

/// One service's outcome inside a multi-service response.
///
/// Exactly one of `quote` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceQuote {
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Quotes for every service that reaches a destination.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteSet {
    /// Normalized 8-digit postal code.
    pub postal_code: String,
    pub weight: f64,
    pub quotes: Vec<ServiceQuote>,
}

/// Errors raised while building a quote.
///
/// None of these are fatal to the service; each maps to an HTTP status in
/// the API layer and to a counter label in metrics.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The postal code did not normalize to exactly 8 digits.
    #[error("invalid postal code {0:?}: expected 8 digits")]
    InvalidPostalCode(String),

    /// Weight must be a finite number greater than zero.
    #[error("weight must be a positive number, got {0}")]
    InvalidWeight(f64),

    /// Declared value, when given, must not be negative.
    #[error("declared value must not be negative, got {0}")]
    InvalidDeclaredValue(f64),

    /// No postal range covers the code.
    #[error("postal code {0:08} is not covered by any range")]
    PostalCodeNotFound(u32),

    /// The destination resolved but no tariff row matches it.
    #[error("no tariff for destination {destination:?} with classification {classification:?}")]
    TariffNotFound {
        destination: String,
        classification: String,
        service: Option<String>,
    },

    /// No rate table snapshot is loaded.
    #[error("rate tables are not loaded")]
    DataUnavailable,

    /// The matched tariff row could not be priced.
    #[error(transparent)]
    Curve(#[from] CurveError),
}

impl QuoteError {
    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            QuoteError::InvalidPostalCode(_) => "invalid_postal_code",
            QuoteError::InvalidWeight(_) => "invalid_weight",
            QuoteError::InvalidDeclaredValue(_) => "invalid_declared_value",
            QuoteError::PostalCodeNotFound(_) => "postal_code_not_found",
            QuoteError::TariffNotFound { .. } => "tariff_not_found",
            QuoteError::DataUnavailable => "data_unavailable",
            QuoteError::Curve(CurveError::InvalidWeight(_)) => "invalid_weight",
            QuoteError::Curve(CurveError::EmptyCurve) => "empty_curve",
        }
    }
}
