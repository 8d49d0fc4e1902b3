//! Rate table subsystem.
//!
//! # Responsibilities
//! - Load the CEP range sheet and the tariff sheet from CSV
//! - Normalize lookup keys so sheet spelling never leaks into matching
//! - Serve lookups from an immutable, atomically swappable snapshot
//!
//! # Data Flow
//! ```text
//! CSV files
//!     → loader.rs (parse, normalize keys, sort curves)
//!     → TableSet (immutable snapshot)
//!     → ArcSwapOption (held by the quoting engine)
//!
//! watcher.rs rebuilds the snapshot when either file changes
//! ```

pub mod loader;
pub mod normalize;
pub mod postal;
pub mod tariff;
pub mod watcher;

pub use loader::{load_tables, LoadError};
pub use postal::{parse_postal_code, Classification, PostalRangeEntry, PostalRangeIndex};
pub use tariff::{TariffRow, TariffTable, WeightBreak};

/// One consistent snapshot of both rate tables.
///
/// A snapshot is built whole by the loader and never mutated; readers hold an
/// `Arc` to it and a reload installs a fresh one without touching in-flight
/// requests.
#[derive(Debug)]
pub struct TableSet {
    pub postal: PostalRangeIndex,
    pub tariffs: TariffTable,
}

impl TableSet {
    pub fn new(postal: PostalRangeIndex, tariffs: TariffTable) -> Self {
        Self { postal, tariffs }
    }

    /// Number of postal ranges in this snapshot.
    pub fn postal_ranges(&self) -> usize {
        self.postal.len()
    }

    /// Number of tariff rows in this snapshot.
    pub fn tariff_rows(&self) -> usize {
        self.tariffs.len()
    }
}
