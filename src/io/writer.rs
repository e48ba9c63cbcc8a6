//! CSV writers, the inverse of [`crate::io::loader`].
//!
//! Output always reads back through the loader: fields are quoted by the
//! `csv` crate, and trade attributes become trailing columns.

use crate::core::entity::EntityRegistry;
use crate::core::trade::TradeSet;
use crate::io::error::SourceError;
use crate::io::loader::{REFERENCE_COLUMNS, TRADE_COLUMNS};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().from_writer(writer)
}

fn flush<W: Write>(wtr: &mut csv::Writer<W>, table: &str) -> Result<(), SourceError> {
    wtr.flush().map_err(|source| SourceError::Io {
        path: table.into(),
        source,
    })
}

/// Write one trade repository table.
///
/// Attribute keys found on any trade are appended after the fixed columns,
/// sorted; a trade without a given attribute gets an empty field.
pub fn write_trades<W: Write>(set: &TradeSet, writer: W, table: &str) -> Result<(), SourceError> {
    let mut wtr = csv_writer(writer);
    let csv_err = |source: csv::Error| SourceError::Csv {
        path: table.into(),
        source,
    };

    let attribute_keys: BTreeSet<&str> = set
        .trades()
        .iter()
        .flat_map(|t| t.attributes.keys().map(String::as_str))
        .collect();

    let header = TRADE_COLUMNS.iter().copied().chain(attribute_keys.iter().copied());
    wtr.write_record(header).map_err(csv_err)?;

    for t in set.trades() {
        let mut record = vec![
            t.uti.to_string(),
            t.lei_rptg.to_string(),
            t.lei_othr.to_string(),
            t.notional.to_string(),
            t.side.code().to_string(),
            t.fxd.to_string(),
            t.flt.to_string(),
        ];
        record.extend(
            attribute_keys
                .iter()
                .map(|k| t.attributes.get(*k).cloned().unwrap_or_default()),
        );
        wtr.write_record(&record).map_err(csv_err)?;
    }
    flush(&mut wtr, table)
}

/// Write the reference registry table.
pub fn write_registry<W: Write>(
    registry: &EntityRegistry,
    writer: W,
    table: &str,
) -> Result<(), SourceError> {
    let mut wtr = csv_writer(writer);
    let csv_err = |source: csv::Error| SourceError::Csv {
        path: table.into(),
        source,
    };

    wtr.write_record(REFERENCE_COLUMNS).map_err(csv_err)?;
    for e in registry.entities() {
        wtr.write_record([e.lei.as_str(), e.name.as_str(), e.country.as_str()])
            .map_err(csv_err)?;
    }
    flush(&mut wtr, table)
}

fn create(path: &Path) -> Result<File, SourceError> {
    File::create(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_trades(set: &TradeSet, path: &Path) -> Result<(), SourceError> {
    write_trades(set, create(path)?, &path.display().to_string())
}

pub fn save_registry(registry: &EntityRegistry, path: &Path) -> Result<(), SourceError> {
    write_registry(registry, create(path)?, &path.display().to_string())
}
