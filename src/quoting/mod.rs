//! Quote generation module.

pub mod curve;
pub mod engine;
pub mod types;

pub use curve::{CurveError, ExtrapolationPolicy, MatchedBreak};
pub use engine::QuoteEngine;
pub use types::{Quote, QuoteError, QuoteRequest, QuoteSet, ServiceQuote};
