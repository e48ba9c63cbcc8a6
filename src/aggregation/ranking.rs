//! Top/bottom-N selection over an exposure table.

use crate::aggregation::exposure::{ExposureAggregate, ExposureTable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Metric used to order aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankBy {
    #[default]
    Ratio,
    CashFlow,
    Gross,
    Net,
}

impl RankBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ratio" => Some(RankBy::Ratio),
            "cash-flow" => Some(RankBy::CashFlow),
            "gross" => Some(RankBy::Gross),
            "net" => Some(RankBy::Net),
            _ => None,
        }
    }

    fn value(&self, row: &ExposureAggregate) -> Decimal {
        match self {
            RankBy::Ratio => row.ratio,
            RankBy::CashFlow => row.cash_flow,
            RankBy::Gross => row.gross_exposure,
            RankBy::Net => row.net_exposure,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankOrder {
    /// Largest values first.
    #[default]
    Top,
    /// Smallest values first.
    Bottom,
}

/// What to rank and how many rows to keep.
#[derive(Debug, Clone)]
pub struct RankQuery {
    pub index: String,
    pub by: RankBy,
    pub order: RankOrder,
    pub limit: usize,
    /// Restrict to these countries; empty means all.
    pub countries: BTreeSet<String>,
}

impl RankQuery {
    pub fn top(index: impl Into<String>, limit: usize) -> Self {
        Self {
            index: index.into(),
            by: RankBy::default(),
            order: RankOrder::Top,
            limit,
            countries: BTreeSet::new(),
        }
    }

    pub fn bottom(index: impl Into<String>, limit: usize) -> Self {
        Self {
            order: RankOrder::Bottom,
            ..Self::top(index, limit)
        }
    }

    pub fn by(mut self, by: RankBy) -> Self {
        self.by = by;
        self
    }

    pub fn in_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }
}

/// Rows of `table` for the query's index, ordered by its metric and cut to
/// `limit`. Equal values keep table order.
pub fn rank<'a>(table: &'a ExposureTable, query: &RankQuery) -> Vec<&'a ExposureAggregate> {
    let mut rows: Vec<&ExposureAggregate> = table
        .rows()
        .iter()
        .filter(|r| r.key.index.as_str() == query.index)
        .filter(|r| query.countries.is_empty() || query.countries.contains(&r.key.country))
        .collect();

    match query.order {
        RankOrder::Top => rows.sort_by(|a, b| query.by.value(b).cmp(&query.by.value(a))),
        RankOrder::Bottom => rows.sort_by(|a, b| query.by.value(a).cmp(&query.by.value(b))),
    }
    rows.truncate(query.limit);
    rows
}
