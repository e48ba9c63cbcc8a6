//! Collapse repeated reports of the same trade.
//!
//! Repositories overlap: the same UTI can arrive from two repositories, or
//! twice within one file. Every source is concatenated in the order given
//! and the first occurrence of each UTI wins.

use crate::core::error::{PipelineError, Result};
use crate::core::trade::{TradeSet, Uti};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What the deduplicator found while merging the sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Records received across all sources.
    pub records_in: usize,
    /// Records kept.
    pub records_out: usize,
    /// UTIs that appeared more than once, in first-seen order.
    pub duplicated_utis: Vec<Uti>,
}

impl DuplicateReport {
    /// Number of distinct UTIs that were reported more than once.
    pub fn duplicated_count(&self) -> usize {
        self.duplicated_utis.len()
    }

    pub fn dropped(&self) -> usize {
        self.records_in - self.records_out
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicated_utis.is_empty()
    }
}

/// Output of [`deduplicate`]: the merged trades and the duplicate report.
#[derive(Debug, Clone)]
pub struct Deduplicated {
    pub trades: TradeSet,
    pub report: DuplicateReport,
}

/// Merge trade repositories into one set with unique UTIs.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] when `sources` is empty.
pub fn deduplicate(sources: Vec<TradeSet>) -> Result<Deduplicated> {
    if sources.is_empty() {
        return Err(PipelineError::configuration("no trade repository supplied"));
    }

    let records_in: usize = sources.iter().map(TradeSet::len).sum();
    let mut kept = TradeSet::new();
    let mut seen: HashSet<Uti> = HashSet::with_capacity(records_in);
    let mut flagged: HashSet<Uti> = HashSet::new();
    let mut duplicated_utis = Vec::new();

    for source in sources {
        for trade in source.into_trades() {
            if seen.contains(&trade.uti) {
                if flagged.insert(trade.uti.clone()) {
                    duplicated_utis.push(trade.uti);
                }
                continue;
            }
            seen.insert(trade.uti.clone());
            kept.add(trade);
        }
    }

    debug_assert!(kept.has_unique_utis());
    let report = DuplicateReport {
        records_in,
        records_out: kept.len(),
        duplicated_utis,
    };

    if report.has_duplicates() {
        info!(
            "{} transactions have been registered more than once, {} duplicate records dropped",
            report.duplicated_count(),
            report.dropped()
        );
    }
    debug!("deduplicated {} records into {}", records_in, report.records_out);

    Ok(Deduplicated {
        trades: kept,
        report,
    })
}
