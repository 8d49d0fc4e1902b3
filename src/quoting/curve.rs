//! Weight-break curve evaluation.
//!
//! # Responsibilities
//! - Price a weight against a tariff row's break curve
//! - Clamp below the smallest break, interpolate between breaks, and
//!   extrapolate above the largest one according to a named policy
//! - Report which part of the curve produced the price
//!
//! # Design Decisions
//! - Evaluation works in full precision; rounding to cents happens exactly
//!   once, when a quote is assembled
//! - Interpolation bounds are inclusive, so a weight sitting exactly on a
//!   break always prices to that break's value

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tables::tariff::TariffRow;

/// How to price weights above the largest break in the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtrapolationPolicy {
    /// Charge the top break plus a per-kilogram fee for the excess. The fee
    /// is the row's additional fee when it is set, otherwise the top break's
    /// average price per kilogram.
    #[default]
    FlatFee,
    /// Extend the line through the last two breaks.
    Slope,
}

/// Errors raised while evaluating a curve.
#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    /// Weight must be a finite number greater than zero.
    #[error("weight must be a positive number, got {0}")]
    InvalidWeight(f64),

    /// The tariff row has no priced weight break.
    #[error("tariff row has no weight breaks")]
    EmptyCurve,
}

/// The part of the curve a weight landed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "weight")]
pub enum MatchedBreak {
    /// At or below the smallest break; its price applies as a minimum.
    Minimum(f64),
    /// Between two breaks; carries the upper bound of the bracket.
    Bracket(f64),
    /// Above the largest break; carries that break's weight.
    Extrapolated(f64),
}

/// A priced weight, before any surcharge or rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub price: f64,
    pub matched: MatchedBreak,
}

/// Price `weight` against the row's break curve.
pub fn evaluate(
    row: &TariffRow,
    weight: f64,
    policy: ExtrapolationPolicy,
) -> Result<Evaluation, CurveError> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(CurveError::InvalidWeight(weight));
    }
    let breaks = &row.breaks;
    let first = *breaks.first().ok_or(CurveError::EmptyCurve)?;
    let last = *breaks.last().ok_or(CurveError::EmptyCurve)?;

    if weight <= first.weight {
        return Ok(Evaluation {
            price: first.price,
            matched: MatchedBreak::Minimum(first.weight),
        });
    }

    if weight <= last.weight {
        for pair in breaks.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if weight > hi.weight {
                continue;
            }
            let span = hi.weight - lo.weight;
            let price = if span > 0.0 {
                lo.price + (weight - lo.weight) * (hi.price - lo.price) / span
            } else {
                lo.price
            };
            return Ok(Evaluation {
                price,
                matched: MatchedBreak::Bracket(hi.weight),
            });
        }
        unreachable!("weight within curve bounds must land in a bracket");
    }

    let excess = weight - last.weight;
    let price = match policy {
        ExtrapolationPolicy::FlatFee => {
            let per_kg = if row.flat_fee > 0.0 {
                row.flat_fee
            } else {
                last.price / last.weight
            };
            last.price + excess * per_kg
        }
        ExtrapolationPolicy::Slope => {
            let slope = breaks
                .len()
                .checked_sub(2)
                .map(|i| breaks[i])
                .filter(|prev| last.weight > prev.weight)
                .map(|prev| (last.price - prev.price) / (last.weight - prev.weight));
            match slope {
                Some(slope) => last.price + excess * slope,
                // A single-break curve has no slope to extend.
                None => last.price,
            }
        }
    };

    Ok(Evaluation {
        price,
        matched: MatchedBreak::Extrapolated(last.weight),
    })
}

/// Order-value surcharge, in the same currency as the tariff prices.
pub fn surcharge(declared_value: f64, rate: f64) -> f64 {
    declared_value * rate
}

/// Round to cents, half away from zero.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
