use crate::core::entity::Lei;
use crate::core::index::IndexName;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Unique transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uti(String);

impl Uti {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Uti {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Uti {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Direction of the trade from the reporting party's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buyer,
    Seller,
}

impl Side {
    /// Decode the repository `side` column.
    ///
    /// Only `"B"` marks a buyer-initiated report. Anything else is read as
    /// seller-initiated.
    pub fn from_code(code: &str) -> Self {
        if code == "B" {
            Side::Buyer
        } else {
            Side::Seller
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Side::Buyer => "B",
            Side::Seller => "S",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buyer => write!(f, "Buyer"),
            Side::Seller => write!(f, "Seller"),
        }
    }
}

/// A derivative trade as reported by one trade repository.
///
/// # Examples
///
/// ```
/// use exposure_engine::core::trade::{Side, TradeRecord};
/// use rust_decimal_macros::dec;
///
/// let trade = TradeRecord::new("1", "X", "Y", dec!(100), Side::Buyer, dec!(0.02), "EONIA");
/// assert_eq!(trade.notional, dec!(100));
/// assert_eq!(trade.side, Side::Buyer);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub uti: Uti,
    pub lei_rptg: Lei,
    pub lei_othr: Lei,
    /// Unsigned principal.
    pub notional: Decimal,
    pub side: Side,
    /// Fixed rate, signed.
    pub fxd: Decimal,
    /// Floating index name.
    pub flt: IndexName,
    /// Extra repository columns, carried untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl TradeRecord {
    /// Create a trade record.
    ///
    /// # Panics
    ///
    /// Panics if `notional` is negative.
    pub fn new(
        uti: impl Into<Uti>,
        lei_rptg: impl Into<Lei>,
        lei_othr: impl Into<Lei>,
        notional: Decimal,
        side: Side,
        fxd: Decimal,
        flt: impl Into<IndexName>,
    ) -> Self {
        assert!(
            notional >= Decimal::ZERO,
            "Trade notional must not be negative, got {}",
            notional
        );
        Self {
            uti: uti.into(),
            lei_rptg: lei_rptg.into(),
            lei_othr: lei_othr.into(),
            notional,
            side,
            fxd,
            flt: flt.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// The trades of one repository file, in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeSet {
    trades: Vec<TradeRecord>,
}

impl TradeSet {
    pub fn new() -> Self {
        Self { trades: Vec::new() }
    }

    pub fn add(&mut self, trade: TradeRecord) {
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<TradeRecord> {
        self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// True when no two trades share a UTI.
    pub fn has_unique_utis(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.trades.len());
        self.trades.iter().all(|t| seen.insert(&t.uti))
    }
}

impl FromIterator<TradeRecord> for TradeSet {
    fn from_iter<T: IntoIterator<Item = TradeRecord>>(iter: T) -> Self {
        Self {
            trades: iter.into_iter().collect(),
        }
    }
}
