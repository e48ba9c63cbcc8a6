//! Attach reference data to both counterparties of every trade.
//!
//! Each trade is looked up twice in the registry, once through the
//! reporting party's LEI and once through the other party's. Both lookups
//! are inner joins: a trade survives only when both LEIs resolve.

use crate::core::entity::{EntityRegistry, Lei, ReferenceEntity};
use crate::core::error::{PipelineError, Result};
use crate::core::index::IndexName;
use crate::core::trade::{Side, TradeSet, Uti};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity of one counterparty once resolved against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub lei: Lei,
    pub name: String,
    pub country: String,
}

impl Counterparty {
    fn resolved(lei: &Lei, entity: &ReferenceEntity) -> Self {
        Self {
            lei: lei.clone(),
            name: entity.name.clone(),
            country: entity.country.clone(),
        }
    }
}

/// A trade with both counterparties resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledTrade {
    pub uti: Uti,
    pub rptg: Counterparty,
    pub othr: Counterparty,
    pub notional: Decimal,
    pub side: Side,
    pub fxd: Decimal,
    pub flt: IndexName,
}

/// Reconciled trades in deduplicated order, addressable by UTI.
#[derive(Debug, Clone, Default)]
pub struct ReconciledBook {
    trades: Vec<ReconciledTrade>,
    by_uti: HashMap<Uti, usize>,
}

impl ReconciledBook {
    fn push(&mut self, trade: ReconciledTrade) {
        self.by_uti.insert(trade.uti.clone(), self.trades.len());
        self.trades.push(trade);
    }

    pub fn get(&self, uti: &Uti) -> Option<&ReconciledTrade> {
        self.by_uti.get(uti).map(|&pos| &self.trades[pos])
    }

    pub fn trades(&self) -> &[ReconciledTrade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

impl FromIterator<ReconciledTrade> for ReconciledBook {
    fn from_iter<T: IntoIterator<Item = ReconciledTrade>>(iter: T) -> Self {
        let mut book = Self::default();
        for trade in iter {
            book.push(trade);
        }
        book
    }
}

/// Resolve every trade against the one reference registry supplied.
///
/// `trades` must already be deduplicated. Trades whose reporting or other
/// LEI is unknown to the registry are dropped.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] unless exactly one registry is given.
pub fn enrich(trades: &TradeSet, registries: &[EntityRegistry]) -> Result<ReconciledBook> {
    let registry = match registries {
        [single] => single,
        [] => return Err(PipelineError::configuration("no reference registry supplied")),
        _ => {
            return Err(PipelineError::configuration(format!(
                "{} reference registries supplied, expected exactly one",
                registries.len()
            )))
        }
    };

    let mut book = ReconciledBook::default();
    let mut unresolved_rptg = 0usize;
    let mut unresolved_othr = 0usize;

    for trade in trades.trades() {
        let rptg = registry.get(&trade.lei_rptg);
        let othr = registry.get(&trade.lei_othr);
        if rptg.is_none() {
            unresolved_rptg += 1;
        }
        if othr.is_none() {
            unresolved_othr += 1;
        }
        let (Some(rptg), Some(othr)) = (rptg, othr) else {
            continue;
        };

        book.push(ReconciledTrade {
            uti: trade.uti.clone(),
            rptg: Counterparty::resolved(&trade.lei_rptg, rptg),
            othr: Counterparty::resolved(&trade.lei_othr, othr),
            notional: trade.notional,
            side: trade.side,
            fxd: trade.fxd,
            flt: trade.flt.clone(),
        });
    }

    debug!(
        "reconciled {} of {} trades ({} unknown reporting LEIs, {} unknown other LEIs)",
        book.len(),
        trades.len(),
        unresolved_rptg,
        unresolved_othr
    );

    Ok(book)
}
