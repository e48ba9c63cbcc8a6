//! Gross, net, cash-flow and ratio exposures per country or per entity.

use crate::core::error::{PipelineError, Result};
use crate::core::index::{IndexName, IndexSet};
use crate::core::leg::{Leg, LegBook};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Level at which legs are grouped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One row per (Country, Index).
    #[default]
    Country,
    /// One row per (Name, Country, Index).
    Entity,
}

impl Granularity {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "country" => Some(Granularity::Country),
            "entity" => Some(Granularity::Entity),
            _ => None,
        }
    }
}

/// Parameters of one aggregation: which indices, at which level.
///
/// # Examples
///
/// ```
/// use exposure_engine::aggregation::exposure::{ExposureRequest, Granularity};
///
/// let request = ExposureRequest::new(["EONIA", "LIBOR"])
///     .unwrap()
///     .with_granularity(Granularity::Entity);
/// assert_eq!(request.indices().len(), 2);
///
/// assert!(ExposureRequest::new(Vec::<&str>::new()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureRequest {
    indices: IndexSet,
    granularity: Granularity,
}

impl ExposureRequest {
    /// Build a country-level request for the given indices.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if no index is given.
    pub fn new<I, S>(indices: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<IndexName>,
    {
        let indices: IndexSet = indices.into_iter().map(Into::into).collect();
        if indices.is_empty() {
            return Err(PipelineError::configuration(
                "at least one index must be requested",
            ));
        }
        Ok(Self {
            indices,
            granularity: Granularity::default(),
        })
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn indices(&self) -> &IndexSet {
        &self.indices
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }
}

/// Grouping key of an aggregate row. `name` is set only at entity level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub country: String,
    pub index: IndexName,
}

impl GroupKey {
    fn of(leg: &Leg, granularity: Granularity) -> Self {
        Self {
            name: match granularity {
                Granularity::Country => None,
                Granularity::Entity => Some(leg.name.clone()),
            },
            country: leg.country.clone(),
            index: leg.index.clone(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match &self.name {
            Some(name) => format!("{} / {} / {}", name, self.country, self.index),
            None => format!("{} / {}", self.country, self.index),
        };
        f.pad(&label)
    }
}

/// Exposure metrics of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureAggregate {
    #[serde(flatten)]
    pub key: GroupKey,
    pub gross_exposure: Decimal,
    pub net_exposure: Decimal,
    pub cash_flow: Decimal,
    /// `net / gross`, or exactly zero when gross is zero.
    pub ratio: Decimal,
}

impl ExposureAggregate {
    pub fn ratio_percent(&self) -> f64 {
        let pct = self.ratio * Decimal::from(100);
        pct.to_string().parse::<f64>().unwrap_or(0.0)
    }
}

/// Per-side running sums of a group.
#[derive(Debug, Default, Clone, Copy)]
struct SideTotals {
    buyer_notional: Decimal,
    seller_notional: Decimal,
    buyer_cash_flow: Decimal,
    seller_cash_flow: Decimal,
}

fn checked(value: Option<Decimal>, what: &str, key: &GroupKey) -> Result<Decimal> {
    value.ok_or_else(|| PipelineError::overflow(format!("{} of group `{}`", what, key)))
}

fn accumulate(total: &mut Decimal, amount: Decimal, what: &str, leg: &Leg) -> Result<()> {
    *total = total.checked_add(amount).ok_or_else(|| {
        PipelineError::overflow(format!(
            "{} for {} / {} / {}",
            what, leg.name, leg.country, leg.index
        ))
    })?;
    Ok(())
}

/// Aggregated exposures, sorted by grouping key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExposureTable {
    granularity: Granularity,
    rows: Vec<ExposureAggregate>,
}

impl ExposureTable {
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn rows(&self) -> &[ExposureAggregate] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a country-level key.
    pub fn country(&self, country: &str, index: &str) -> Option<&ExposureAggregate> {
        self.rows
            .iter()
            .find(|r| r.key.name.is_none() && r.key.country == country && r.key.index.as_str() == index)
    }

    /// Row for an entity-level key.
    pub fn entity(&self, name: &str, country: &str, index: &str) -> Option<&ExposureAggregate> {
        self.rows.iter().find(|r| {
            r.key.name.as_deref() == Some(name)
                && r.key.country == country
                && r.key.index.as_str() == index
        })
    }
}

/// Groups Buyer and Seller legs and derives exposure metrics.
pub struct ExposureAggregator;

impl ExposureAggregator {
    /// Aggregate the legs selected by `request`.
    ///
    /// # Algorithm
    ///
    /// 1. Keep legs whose index is requested.
    /// 2. Group Buyer and Seller legs separately by the grouping key.
    /// 3. Over the union of keys, a side with no legs in a group counts as zero:
    ///    - gross = buyer notional + seller notional
    ///    - net = seller notional - buyer notional
    ///    - cash flow = seller cash flow + buyer cash flow
    ///    - ratio = net / gross, or 0 when gross is exactly 0
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if `legs` holds no leg at all.
    /// A filter that matches nothing yields an empty table, not an error.
    /// A group sum outside the `Decimal` range is [`PipelineError::Overflow`].
    pub fn aggregate(legs: &LegBook, request: &ExposureRequest) -> Result<ExposureTable> {
        if legs.is_empty() {
            return Err(PipelineError::empty_input("no legs to aggregate"));
        }

        let granularity = request.granularity();
        let mut groups: BTreeMap<GroupKey, SideTotals> = BTreeMap::new();

        for leg in legs.buyer().iter().filter(|l| request.indices().contains(&l.index)) {
            let totals = groups.entry(GroupKey::of(leg, granularity)).or_default();
            accumulate(&mut totals.buyer_notional, leg.notional, "buyer notional", leg)?;
            accumulate(&mut totals.buyer_cash_flow, leg.cash_flow, "buyer cash flow", leg)?;
        }
        for leg in legs.seller().iter().filter(|l| request.indices().contains(&l.index)) {
            let totals = groups.entry(GroupKey::of(leg, granularity)).or_default();
            accumulate(&mut totals.seller_notional, leg.notional, "seller notional", leg)?;
            accumulate(&mut totals.seller_cash_flow, leg.cash_flow, "seller cash flow", leg)?;
        }

        let rows = groups
            .into_iter()
            .map(|(key, t)| {
                let gross_exposure = checked(
                    t.buyer_notional.checked_add(t.seller_notional),
                    "gross exposure",
                    &key,
                )?;
                let net_exposure = checked(
                    t.seller_notional.checked_sub(t.buyer_notional),
                    "net exposure",
                    &key,
                )?;
                let cash_flow = checked(
                    t.seller_cash_flow.checked_add(t.buyer_cash_flow),
                    "cash flow",
                    &key,
                )?;
                let ratio = if gross_exposure == Decimal::ZERO {
                    Decimal::ZERO
                } else {
                    checked(net_exposure.checked_div(gross_exposure), "ratio", &key)?
                };
                Ok(ExposureAggregate {
                    key,
                    gross_exposure,
                    net_exposure,
                    cash_flow,
                    ratio,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ExposureTable { granularity, rows })
    }
}

impl fmt::Display for ExposureTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.granularity {
            Granularity::Country => "Country",
            Granularity::Entity => "Entity",
        };
        writeln!(f, "=== {} Exposure ===", label)?;
        if self.rows.is_empty() {
            return writeln!(f, "(no data for this selection)");
        }
        for row in &self.rows {
            writeln!(f, "\n--- {} ---", row.key)?;
            writeln!(f, "  Gross:     {}", row.gross_exposure)?;
            writeln!(f, "  Net:       {}", row.net_exposure)?;
            writeln!(f, "  Cash flow: {}", row.cash_flow)?;
            writeln!(f, "  Ratio:     {:.1}%", row.ratio_percent())?;
        }
        Ok(())
    }
}
