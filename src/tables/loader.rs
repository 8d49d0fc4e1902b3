//! CSV loading for the two rate tables.
//!
//! # Responsibilities
//! - Parse the CEP range sheet and the tariff sheet into typed tables
//! - Apply the fixed column schema once, here; nothing downstream ever sees
//!   a raw column again
//! - Normalize sheet quirks: decimal commas, formatted postal codes, blank
//!   price cells, stray whitespace
//!
//! # Design Decisions
//! - Key columns are positional; the tariff header's trailing cells are data
//!   (the weight of each break column) and are parsed exactly once
//! - Malformed cells fail the load with file/line context instead of being
//!   coerced to zero
//! - A row with no priced break is skipped with a warning: the sheet marks
//!   destinations a service does not reach by leaving the bands blank

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::DataConfig;
use crate::tables::normalize::parse_decimal;
use crate::tables::postal::{Classification, PostalRangeEntry, PostalRangeIndex};
use crate::tables::tariff::{TariffRow, TariffTable, WeightBreak};
use crate::tables::TableSet;

/// Leading fixed columns of the postal range sheet:
/// cep_start, cep_end, uf, city, classification, lead_time_days.
const POSTAL_COLUMNS: usize = 6;

/// Leading fixed columns of the tariff sheet before the weight-break
/// columns: origin, destination, classification, service, add.
const TARIFF_KEY_COLUMNS: usize = 5;

/// Errors raised while loading a rate table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV structure itself could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A cell failed validation.
    #[error("{path}:{line}: {message}")]
    Malformed {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// The file parsed but produced zero usable rows.
    #[error("{path}: no usable rows")]
    Empty { path: PathBuf },
}

/// Load both tables from the configured files.
///
/// Either table coming up empty is an error: the service cannot price
/// anything without both, and the caller treats the failure as
/// data-unavailable rather than a crash.
pub fn load_tables(config: &DataConfig) -> Result<TableSet, LoadError> {
    let postal = load_postal_ranges(&config.postal_ranges_file, config.postal_delimiter_byte())?;
    if postal.is_empty() {
        return Err(LoadError::Empty {
            path: config.postal_ranges_file.clone(),
        });
    }

    let tariffs = load_tariffs(&config.tariffs_file, config.tariff_delimiter_byte())?;
    if tariffs.is_empty() {
        return Err(LoadError::Empty {
            path: config.tariffs_file.clone(),
        });
    }

    Ok(TableSet::new(postal, tariffs))
}

/// Load the CEP range sheet.
pub fn load_postal_ranges(path: &Path, delimiter: u8) -> Result<PostalRangeIndex, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = read_postal_ranges(file, delimiter, path)?;
    Ok(PostalRangeIndex::new(entries))
}

/// Load the tariff sheet.
pub fn load_tariffs(path: &Path, delimiter: u8) -> Result<TariffTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = read_tariff_rows(file, delimiter, path)?;
    Ok(TariffTable::new(rows))
}

fn csv_reader<R: Read>(input: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn read_postal_ranges<R: Read>(
    input: R,
    delimiter: u8,
    path: &Path,
) -> Result<Vec<PostalRangeEntry>, LoadError> {
    let mut reader = csv_reader(input, delimiter);
    let mut entries = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cell = |i: usize| record.get(i).unwrap_or("");

        // Trailing blank lines show up as empty records; skip them.
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        if record.len() < POSTAL_COLUMNS {
            return Err(malformed(path, line, "expected 6 columns"));
        }

        let range_start = parse_postal_cell(cell(0))
            .ok_or_else(|| malformed(path, line, format!("bad cep_start {:?}", cell(0))))?;
        let range_end = parse_postal_cell(cell(1))
            .ok_or_else(|| malformed(path, line, format!("bad cep_end {:?}", cell(1))))?;
        if range_start > range_end {
            return Err(malformed(
                path,
                line,
                format!("range start {range_start} is past range end {range_end}"),
            ));
        }

        let lead_time_days = cell(5)
            .parse()
            .map_err(|_| malformed(path, line, format!("bad lead_time_days {:?}", cell(5))))?;

        entries.push(PostalRangeEntry {
            range_start,
            range_end,
            region: cell(2).to_string(),
            locality: cell(3).to_string(),
            classification: Classification::parse(cell(4)),
            lead_time_days,
        });
    }

    Ok(entries)
}

fn read_tariff_rows<R: Read>(
    input: R,
    delimiter: u8,
    path: &Path,
) -> Result<Vec<TariffRow>, LoadError> {
    let mut reader = csv_reader(input, delimiter);

    // The header's trailing cells carry the weight of each break column.
    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let mut break_weights = Vec::new();
    for (i, cell) in headers.iter().enumerate().skip(TARIFF_KEY_COLUMNS) {
        let weight = parse_decimal(cell)
            .filter(|w| *w > 0.0)
            .ok_or_else(|| malformed(path, 1, format!("bad weight column {i} ({cell:?})")))?;
        break_weights.push(weight);
    }
    if break_weights.is_empty() {
        return Err(malformed(path, 1, "header has no weight columns"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cell = |i: usize| record.get(i).unwrap_or("");

        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        // The original sheets interleave section separators with real rows;
        // anything without a full key is not a tariff.
        if cell(0).is_empty() || cell(1).is_empty() || cell(2).is_empty() {
            tracing::debug!(file = %path.display(), line, "skipping row without a full key");
            continue;
        }

        let flat_fee = match cell(4) {
            "" => 0.0,
            raw => parse_decimal(raw)
                .filter(|f| *f >= 0.0)
                .ok_or_else(|| malformed(path, line, format!("bad additional fee {raw:?}")))?,
        };

        let mut breaks = Vec::new();
        for (offset, weight) in break_weights.iter().enumerate() {
            let raw = cell(TARIFF_KEY_COLUMNS + offset);
            if raw.is_empty() {
                continue;
            }
            let price = parse_decimal(raw)
                .filter(|p| *p >= 0.0)
                .ok_or_else(|| {
                    malformed(path, line, format!("bad price {raw:?} at {weight} kg"))
                })?;
            breaks.push(WeightBreak {
                weight: *weight,
                price,
            });
        }

        breaks.sort_by(|a, b| a.weight.total_cmp(&b.weight));
        breaks.dedup_by(|a, b| a.weight == b.weight);

        if breaks.is_empty() {
            tracing::warn!(
                file = %path.display(),
                line,
                destination = cell(1),
                "skipping tariff row with no priced weight break"
            );
            continue;
        }

        rows.push(TariffRow {
            origin: cell(0).to_string(),
            destination: cell(1).to_string(),
            classification: cell(2).to_string(),
            service: cell(3).to_string(),
            breaks,
            flat_fee,
        });
    }

    Ok(rows)
}

fn parse_postal_cell(raw: &str) -> Option<u32> {
    let digits = crate::tables::normalize::digits_only(raw);
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn malformed(path: &Path, line: u64, message: impl Into<String>) -> LoadError {
    LoadError::Malformed {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path() -> PathBuf {
        PathBuf::from("test.csv")
    }

    #[test]
    fn test_read_postal_ranges() {
        let csv = "\
cep_start,cep_end,uf,city,classification,lead_time_days
01000-000,05999-999,SP,São Paulo,Capital,1
13000000,19999999,SP,Interior SP,Interior,3
";
        let entries = read_postal_ranges(csv.as_bytes(), b',', &fixture_path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].range_start, 1_000_000);
        assert_eq!(entries[0].range_end, 5_999_999);
        assert_eq!(entries[0].region, "SP");
        assert_eq!(entries[0].classification, Classification::Capital);
        assert_eq!(entries[1].lead_time_days, 3);
    }

    #[test]
    fn test_postal_range_rejects_inverted_range() {
        let csv = "\
cep_start,cep_end,uf,city,classification,lead_time_days
20000000,10000000,RJ,Rio,Capital,2
";
        let err = read_postal_ranges(csv.as_bytes(), b',', &fixture_path()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_postal_range_rejects_bad_lead_time() {
        let csv = "\
cep_start,cep_end,uf,city,classification,lead_time_days
10000000,20000000,RJ,Rio,Capital,soon
";
        let err = read_postal_ranges(csv.as_bytes(), b',', &fixture_path()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }), "{err}");
    }

    #[test]
    fn test_read_tariff_rows_with_decimal_commas() {
        let csv = "\
origin;destination;classification;service;add;1,0;5,0;30,0
SP;RJ;Capital;ecm;2,00;10,00;30,00;100,00
SP;RJ;Interior;ecm;;12,50;35,00;110,00
";
        let rows = read_tariff_rows(csv.as_bytes(), b';', &fixture_path()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].flat_fee, 2.0);
        assert_eq!(rows[0].breaks.len(), 3);
        assert_eq!(rows[0].breaks[0].weight, 1.0);
        assert_eq!(rows[0].breaks[0].price, 10.0);
        assert_eq!(rows[0].breaks[2].price, 100.0);

        // Blank ADD cell means no additional fee.
        assert_eq!(rows[1].flat_fee, 0.0);
        assert_eq!(rows[1].breaks[0].price, 12.5);
    }

    #[test]
    fn test_tariff_rows_skip_partial_keys_and_blank_curves() {
        let csv = "\
origin;destination;classification;service;add;1,0;5,0
SP;RJ;Capital;ecm;0;10,00;30,00
;;;;;
SP;;Capital;ecm;0;10,00;30,00
SP;BA;Interior;ecm;0;;
";
        let rows = read_tariff_rows(csv.as_bytes(), b';', &fixture_path()).unwrap();
        // Only the first row survives: a separator line, a row missing its
        // destination, and a row with no priced band are all dropped.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].destination, "RJ");
    }

    #[test]
    fn test_tariff_rows_sorted_even_if_header_is_not() {
        let csv = "\
origin;destination;classification;service;add;5,0;1,0
SP;RJ;Capital;ecm;0;30,00;10,00
";
        let rows = read_tariff_rows(csv.as_bytes(), b';', &fixture_path()).unwrap();
        assert_eq!(rows[0].breaks[0].weight, 1.0);
        assert_eq!(rows[0].breaks[1].weight, 5.0);
    }

    #[test]
    fn test_tariff_rejects_malformed_price() {
        let csv = "\
origin;destination;classification;service;add;1,0
SP;RJ;Capital;ecm;0;ten
";
        let err = read_tariff_rows(csv.as_bytes(), b';', &fixture_path()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }), "{err}");
    }

    #[test]
    fn test_tariff_rejects_bad_weight_header() {
        let csv = "\
origin;destination;classification;service;add;heavy
SP;RJ;Capital;ecm;0;10,00
";
        let err = read_tariff_rows(csv.as_bytes(), b';', &fixture_path()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 1, .. }), "{err}");
    }
}
