use crate::core::entity::Lei;
use crate::core::index::IndexName;
use crate::core::trade::Uti;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the trade a leg represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Buyer,
    Seller,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Buyer => write!(f, "Buyer"),
            Position::Seller => write!(f, "Seller"),
        }
    }
}

/// One counterparty's directional view of a reconciled trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub uti: Uti,
    pub lei: Lei,
    pub name: String,
    pub country: String,
    pub position: Position,
    pub notional: Decimal,
    /// Notional times the (possibly corrected) fixed rate, signed.
    pub cash_flow: Decimal,
    pub index: IndexName,
}

/// The Buyer and Seller leg tables produced from one set of reconciled trades.
///
/// Row `i` of `buyer` and row `i` of `seller` come from the same trade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegBook {
    buyer: Vec<Leg>,
    seller: Vec<Leg>,
}

impl LegBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the two legs of one trade.
    pub fn push_pair(&mut self, buyer: Leg, seller: Leg) {
        debug_assert_eq!(buyer.position, Position::Buyer);
        debug_assert_eq!(seller.position, Position::Seller);
        self.buyer.push(buyer);
        self.seller.push(seller);
    }

    pub fn buyer(&self) -> &[Leg] {
        &self.buyer
    }

    pub fn seller(&self) -> &[Leg] {
        &self.seller
    }

    /// Iterate (buyer, seller) pairs, one per trade.
    pub fn pairs(&self) -> impl Iterator<Item = (&Leg, &Leg)> {
        self.buyer.iter().zip(self.seller.iter())
    }

    /// Number of trades represented (each contributes one leg per side).
    pub fn trade_count(&self) -> usize {
        self.buyer.len()
    }

    /// Total legs on both sides.
    pub fn len(&self) -> usize {
        self.buyer.len() + self.seller.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buyer.is_empty() && self.seller.is_empty()
    }
}
