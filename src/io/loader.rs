//! CSV readers for trade repositories and the reference registry.
//!
//! Both readers check the header row first: a missing required column is a
//! schema error for the whole table. Extra trade columns are kept as
//! passthrough attributes.

use crate::core::entity::{EntityRegistry, ReferenceEntity};
use crate::core::error::PipelineError;
use crate::core::trade::{Side, TradeRecord, TradeSet};
use crate::io::error::SourceError;
use crate::io::resolver::ResolvedFiles;
use log::debug;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

pub const TRADE_COLUMNS: [&str; 7] = ["uti", "lei_rptg", "lei_othr", "notional", "side", "fxd", "flt"];
pub const REFERENCE_COLUMNS: [&str; 3] = ["lei", "name", "country"];

fn column_positions<const N: usize>(
    headers: &csv::StringRecord,
    required: [&str; N],
    table: &str,
) -> Result<[usize; N], PipelineError> {
    let mut positions = [0usize; N];
    for (slot, column) in positions.iter_mut().zip(required) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| PipelineError::schema(table, format!("missing column `{}`", column)))?;
    }
    Ok(positions)
}

fn parse_decimal(raw: &str, column: &str, row: usize, table: &str) -> Result<Decimal, PipelineError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| {
            PipelineError::schema(
                table,
                format!("row {}: `{}` is not a number in column `{}`", row, raw, column),
            )
        })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Read one trade repository table.
pub fn read_trades<R: Read>(reader: R, table: &str) -> Result<TradeSet, SourceError> {
    let mut rdr = csv_reader(reader);
    let csv_err = |source: csv::Error| SourceError::Csv {
        path: table.into(),
        source,
    };

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let [uti, lei_rptg, lei_othr, notional, side, fxd, flt] =
        column_positions(&headers, TRADE_COLUMNS, table)?;
    let extra: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !TRADE_COLUMNS.contains(h))
        .collect();

    let mut set = TradeSet::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_err)?;
        // Header is line 1.
        let row = i + 2;
        let field = |pos: usize| record.get(pos).unwrap_or("");

        let notional_value = parse_decimal(field(notional), "notional", row, table)?;
        if notional_value < Decimal::ZERO {
            return Err(PipelineError::schema(
                table,
                format!("row {}: negative notional {}", row, notional_value),
            )
            .into());
        }
        let fxd_value = parse_decimal(field(fxd), "fxd", row, table)?;

        let mut trade = TradeRecord::new(
            field(uti),
            field(lei_rptg),
            field(lei_othr),
            notional_value,
            Side::from_code(field(side)),
            fxd_value,
            field(flt),
        );
        for &(pos, name) in &extra {
            trade = trade.with_attribute(name, field(pos));
        }
        set.add(trade);
    }

    debug!("read {} trades from {}", set.len(), table);
    Ok(set)
}

/// Read the reference registry table.
pub fn read_registry<R: Read>(reader: R, table: &str) -> Result<EntityRegistry, SourceError> {
    let mut rdr = csv_reader(reader);
    let csv_err = |source: csv::Error| SourceError::Csv {
        path: table.into(),
        source,
    };

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let [lei, name, country] = column_positions(&headers, REFERENCE_COLUMNS, table)?;

    let mut entities = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let field = |pos: usize| record.get(pos).unwrap_or("");
        entities.push(ReferenceEntity::new(field(lei), field(name), field(country)));
    }

    let registry = EntityRegistry::from_entities(entities).map_err(|e| match e {
        PipelineError::Schema { detail, .. } => PipelineError::schema(table, detail),
        other => other,
    })?;
    debug!("read {} reference entities from {}", registry.len(), table);
    Ok(registry)
}

fn open(path: &Path) -> Result<File, SourceError> {
    File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_trades(path: &Path) -> Result<TradeSet, SourceError> {
    read_trades(open(path)?, &path.display().to_string())
}

pub fn load_registry(path: &Path) -> Result<EntityRegistry, SourceError> {
    read_registry(open(path)?, &path.display().to_string())
}

/// Load every resolved file: the trade repositories in order, then the registry.
pub fn load_inputs(files: &ResolvedFiles) -> Result<(Vec<TradeSet>, EntityRegistry), SourceError> {
    let trade_sets = files
        .trade_repositories
        .iter()
        .map(|p| load_trades(p))
        .collect::<Result<Vec<_>, _>>()?;
    let registry = load_registry(&files.reference)?;
    Ok((trade_sets, registry))
}
