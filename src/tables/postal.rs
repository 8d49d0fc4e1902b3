//! Postal-code range resolution.
//!
//! # Responsibilities
//! - Hold the loaded CEP range table in table order
//! - Resolve a postal code to its destination entry
//! - Validate raw postal-code input (exactly eight digits)
//!
//! # Design Decisions
//! - First match wins: ranges should be disjoint, but overlapping rows in a
//!   hand-maintained sheet must resolve deterministically
//! - Immutable after construction (shared across requests without locks)
//! - Linear scan in table order; the table is a few thousand rows at most

use serde::{Serialize, Serializer};

use crate::tables::normalize::{digits_only, fold_key};

/// Number of digits in a CEP (Brazilian postal code).
pub const POSTAL_CODE_DIGITS: usize = 8;

/// Destination category attached to a postal range. Drives which tariff row
/// applies for the destination region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// State capital and its metro delivery area.
    Capital,
    /// Interior cities served directly.
    Interior,
    /// Interior cities reached through a redispatch partner.
    Redespacho,
    /// A label outside the known set; kept verbatim so it still matches
    /// tariff rows carrying the same label.
    Other(String),
}

impl Classification {
    /// Parse a sheet label, tolerating case, accents and stray whitespace.
    pub fn parse(raw: &str) -> Self {
        match fold_key(raw).as_str() {
            "capital" => Classification::Capital,
            "interior" => Classification::Interior,
            "redespacho" => Classification::Redespacho,
            _ => Classification::Other(raw.trim().to_string()),
        }
    }

    /// Canonical display label, as it appears in quotes and logs.
    pub fn label(&self) -> &str {
        match self {
            Classification::Capital => "Capital",
            Classification::Interior => "Interior",
            Classification::Redespacho => "Redespacho",
            Classification::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One contiguous block of postal codes mapped to a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct PostalRangeEntry {
    /// Inclusive start of the range.
    pub range_start: u32,
    /// Inclusive end of the range.
    pub range_end: u32,
    /// Destination region (UF, e.g. "SP").
    pub region: String,
    /// City or delivery area name.
    pub locality: String,
    /// Destination category used for tariff matching.
    pub classification: Classification,
    /// Advertised delivery lead time in days.
    pub lead_time_days: u32,
}

/// The loaded CEP range table.
///
/// Built once per load from the range sheet and never mutated; `resolve` is a
/// pure read and safe to call from any number of request tasks.
#[derive(Debug, Default)]
pub struct PostalRangeIndex {
    entries: Vec<PostalRangeEntry>,
}

impl PostalRangeIndex {
    /// Build an index from entries in table order.
    pub fn new(entries: Vec<PostalRangeEntry>) -> Self {
        Self { entries }
    }

    /// Resolve a postal code to the first entry whose inclusive range
    /// contains it, in table order.
    pub fn resolve(&self, postal_code: u32) -> Option<&PostalRangeEntry> {
        self.entries
            .iter()
            .find(|e| e.range_start <= postal_code && postal_code <= e.range_end)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse raw postal-code input into a numeric CEP.
///
/// Strips separators first, then requires exactly [`POSTAL_CODE_DIGITS`]
/// digits. Returns `None` for anything else, so a malformed code is reported
/// as invalid input rather than a spurious range miss.
pub fn parse_postal_code(raw: &str) -> Option<u32> {
    let digits = digits_only(raw);
    if digits.len() != POSTAL_CODE_DIGITS {
        return None;
    }
    digits.parse().ok()
}
