//! Core logic for resolving destinations and pricing quotes.
//!
//! # Design Decisions
//! - The engine reads rate tables through an atomically swappable snapshot:
//!   a reload installs a new `TableSet` without locking readers, and every
//!   request prices against exactly one snapshot
//! - Pricing failures are values, never panics; the service keeps answering
//!   even when no snapshot is loaded

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use uuid::Uuid;

use crate::config::schema::PricingConfig;
use crate::quoting::curve;
use crate::quoting::types::{Quote, QuoteError, QuoteRequest, QuoteSet, ServiceQuote};
use crate::tables::postal::PostalRangeEntry;
use crate::tables::tariff::TariffRow;
use crate::tables::TableSet;

/// Engine for resolving destinations and pricing quotes.
#[derive(Clone)]
pub struct QuoteEngine {
    tables: Arc<ArcSwapOption<TableSet>>,
    pricing: PricingConfig,
    quotes: Arc<DashMap<Uuid, Quote>>,
}

impl QuoteEngine {
    /// Create a new quote engine over a shared table snapshot slot.
    pub fn new(tables: Arc<ArcSwapOption<TableSet>>, pricing: PricingConfig) -> Self {
        Self {
            tables,
            pricing,
            quotes: Arc::new(DashMap::new()),
        }
    }

    /// Price one shipment against the tariff row matching the request.
    pub fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        let code = validate(request)?;
        let tables = self.snapshot()?;
        let entry = tables
            .postal
            .resolve(code)
            .ok_or(QuoteError::PostalCodeNotFound(code))?;

        // Tariff sheets key destinations by UF; the locality is display-only.
        let row = tables
            .tariffs
            .find_row(
                &self.pricing.origin,
                &entry.region,
                entry.classification.label(),
                request.service.as_deref(),
            )
            .ok_or_else(|| QuoteError::TariffNotFound {
                destination: entry.region.clone(),
                classification: entry.classification.label().to_string(),
                service: request.service.clone(),
            })?;

        let quote = self.price_row(row, entry, request)?;
        self.store_quote(quote.clone());
        Ok(quote)
    }

    /// Price one shipment against every service that reaches the destination.
    ///
    /// One service failing to price does not fail the others; its slot
    /// carries the error message instead of a quote.
    pub fn quote_all(&self, request: &QuoteRequest) -> Result<QuoteSet, QuoteError> {
        let code = validate(request)?;
        let tables = self.snapshot()?;
        let entry = tables
            .postal
            .resolve(code)
            .ok_or(QuoteError::PostalCodeNotFound(code))?;

        let rows = tables.tariffs.find_all(
            &self.pricing.origin,
            &entry.region,
            entry.classification.label(),
        );
        if rows.is_empty() {
            return Err(QuoteError::TariffNotFound {
                destination: entry.region.clone(),
                classification: entry.classification.label().to_string(),
                service: None,
            });
        }

        let mut quotes = Vec::with_capacity(rows.len());
        for row in rows {
            match self.price_row(row, entry, request) {
                Ok(quote) => {
                    self.store_quote(quote.clone());
                    quotes.push(ServiceQuote {
                        service: row.service.clone(),
                        quote: Some(quote),
                        error: None,
                    });
                }
                Err(e) => {
                    tracing::warn!(service = %row.service, error = %e, "Failed to price service");
                    quotes.push(ServiceQuote {
                        service: row.service.clone(),
                        quote: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(QuoteSet {
            postal_code: format!("{code:08}"),
            weight: request.weight,
            quotes,
        })
    }

    /// Get a previously issued quote by ID. Expired quotes are gone.
    pub fn get_quote(&self, id: Uuid) -> Option<Quote> {
        let quote = self.quotes.get(&id).map(|r| r.value().clone())?;
        if quote.expires_at <= unix_now() {
            self.quotes.remove(&id);
            return None;
        }
        Some(quote)
    }

    fn snapshot(&self) -> Result<Arc<TableSet>, QuoteError> {
        self.tables.load_full().ok_or(QuoteError::DataUnavailable)
    }

    /// Cache an issued quote, sweeping out expired entries so the cache is
    /// bounded by the quotes issued within one TTL window.
    fn store_quote(&self, quote: Quote) {
        let now = unix_now();
        self.quotes.retain(|_, q| q.expires_at > now);
        self.quotes.insert(quote.id, quote);
    }

    fn price_row(
        &self,
        row: &TariffRow,
        entry: &PostalRangeEntry,
        request: &QuoteRequest,
    ) -> Result<Quote, QuoteError> {
        let eval = curve::evaluate(row, request.weight, self.pricing.extrapolation)?;
        let mut price = eval.price;
        if let Some(value) = request.declared_value {
            price += curve::surcharge(value, self.pricing.surcharge_rate);
        }

        Ok(Quote {
            id: Uuid::new_v4(),
            service: row.service.clone(),
            region: entry.region.clone(),
            locality: entry.locality.clone(),
            classification: entry.classification.clone(),
            lead_time_days: entry.lead_time_days,
            weight: request.weight,
            matched_break: eval.matched,
            price: curve::round_money(price),
            expires_at: unix_now() + self.pricing.quote_ttl_secs,
        })
    }
}

fn validate(request: &QuoteRequest) -> Result<u32, QuoteError> {
    let code = crate::tables::parse_postal_code(&request.postal_code)
        .ok_or_else(|| QuoteError::InvalidPostalCode(request.postal_code.clone()))?;
    if !request.weight.is_finite() || request.weight <= 0.0 {
        return Err(QuoteError::InvalidWeight(request.weight));
    }
    if let Some(value) = request.declared_value {
        if !value.is_finite() || value < 0.0 {
            return Err(QuoteError::InvalidDeclaredValue(value));
        }
    }
    Ok(code)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
