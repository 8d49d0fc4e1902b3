//! Freight-rate table lookup.
//!
//! # Responsibilities
//! - Hold the loaded tariff rows in table order
//! - Match rows by folded (origin, destination, classification, service) keys
//! - Expose both the service-pinned and the all-services lookup
//!
//! # Design Decisions
//! - Keys are folded once at construction; lookups fold their inputs with the
//!   same function, so both sides always agree
//! - Linear scan in table order, first match wins (a rate sheet rarely has
//!   more than a few hundred rows)
//! - A miss is an ordinary outcome for the caller, not an error here

use crate::tables::normalize::fold_key;

/// One (weight, price) anchor on a row's tariff curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightBreak {
    /// Upper bound of the weight band, in kg.
    pub weight: f64,
    /// Price charged at exactly this weight.
    pub price: f64,
}

/// One origin→destination pricing record.
#[derive(Debug, Clone, PartialEq)]
pub struct TariffRow {
    /// Origin region code (UF).
    pub origin: String,
    /// Destination region code (UF) as the sheet spells it.
    pub destination: String,
    /// Destination category this row prices (Capital, Interior, ...).
    pub classification: String,
    /// Carrier service level (e.g. "ecm", "exp"); may be empty in old sheets.
    pub service: String,
    /// Curve anchors, ascending by weight, at least one when built by the
    /// loader.
    pub breaks: Vec<WeightBreak>,
    /// Flat additional fee; doubles as the per-kg rate above the last break
    /// under the flat-fee policy.
    pub flat_fee: f64,
}

/// Folded lookup key computed once per row at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RowKey {
    origin: String,
    destination: String,
    classification: String,
    service: String,
}

impl RowKey {
    fn for_row(row: &TariffRow) -> Self {
        Self {
            origin: fold_key(&row.origin),
            destination: fold_key(&row.destination),
            classification: fold_key(&row.classification),
            service: fold_key(&row.service),
        }
    }

    fn matches(&self, origin: &str, destination: &str, classification: &str) -> bool {
        self.origin == origin
            && self.destination == destination
            && self.classification == classification
    }
}

/// The loaded freight-rate table.
#[derive(Debug, Default)]
pub struct TariffTable {
    rows: Vec<TariffRow>,
    keys: Vec<RowKey>,
}

impl TariffTable {
    /// Build a table from rows in sheet order.
    pub fn new(rows: Vec<TariffRow>) -> Self {
        let keys = rows.iter().map(RowKey::for_row).collect();
        Self { rows, keys }
    }

    /// Find the first row matching the tuple, in table order.
    ///
    /// With `service = None` any service level matches; otherwise the folded
    /// service name must match as well.
    pub fn find_row(
        &self,
        origin: &str,
        destination: &str,
        classification: &str,
        service: Option<&str>,
    ) -> Option<&TariffRow> {
        let origin = fold_key(origin);
        let destination = fold_key(destination);
        let classification = fold_key(classification);
        let service = service.map(fold_key);

        self.keys
            .iter()
            .position(|key| {
                key.matches(&origin, &destination, &classification)
                    && service.as_ref().is_none_or(|s| &key.service == s)
            })
            .map(|i| &self.rows[i])
    }

    /// Every row matching (origin, destination, classification), in table
    /// order, one per service level.
    pub fn find_all(
        &self,
        origin: &str,
        destination: &str,
        classification: &str,
    ) -> Vec<&TariffRow> {
        let origin = fold_key(origin);
        let destination = fold_key(destination);
        let classification = fold_key(classification);

        self.keys
            .iter()
            .enumerate()
            .filter(|(_, key)| key.matches(&origin, &destination, &classification))
            .map(|(i, _)| &self.rows[i])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
