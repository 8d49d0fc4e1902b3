//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse, rates sane)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

/// A single semantic violation in the configuration.
#[derive(Debug, PartialEq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    ZeroRequestTimeout,
    EmptyDataPath(&'static str),
    InvalidDelimiter { field: &'static str, value: String },
    InvalidSurchargeRate(f64),
    ZeroQuoteTtl,
    EmptyOrigin,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address {addr:?} is not a socket address")
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address {addr:?} is not a socket address")
            }
            ValidationError::ZeroRequestTimeout => {
                write!(f, "timeouts.request_secs must be greater than zero")
            }
            ValidationError::EmptyDataPath(field) => {
                write!(f, "data.{field} must not be empty")
            }
            ValidationError::InvalidDelimiter { field, value } => {
                write!(f, "data.{field} {value:?} must be a single ASCII character")
            }
            ValidationError::InvalidSurchargeRate(rate) => {
                write!(f, "pricing.surcharge_rate {rate} must be within [0, 1)")
            }
            ValidationError::ZeroQuoteTtl => {
                write!(f, "pricing.quote_ttl_secs must be greater than zero")
            }
            ValidationError::EmptyOrigin => {
                write!(f, "pricing.origin must not be empty")
            }
        }
    }
}

/// Check everything serde cannot, collecting every violation.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.data.postal_ranges_file.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyDataPath("postal_ranges_file"));
    }
    if config.data.tariffs_file.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyDataPath("tariffs_file"));
    }
    for (field, value) in [
        ("postal_delimiter", &config.data.postal_delimiter),
        ("tariff_delimiter", &config.data.tariff_delimiter),
    ] {
        if value.len() != 1 || !value.is_ascii() {
            errors.push(ValidationError::InvalidDelimiter {
                field,
                value: value.clone(),
            });
        }
    }

    if config.pricing.origin.trim().is_empty() {
        errors.push(ValidationError::EmptyOrigin);
    }
    let rate = config.pricing.surcharge_rate;
    if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
        errors.push(ValidationError::InvalidSurchargeRate(rate));
    }
    if config.pricing.quote_ttl_secs == 0 {
        errors.push(ValidationError::ZeroQuoteTtl);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
