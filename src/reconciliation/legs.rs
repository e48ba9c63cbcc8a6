//! Split reconciled trades into Buyer and Seller legs.
//!
//! # Sign convention
//!
//! With `n` the notional and `fxd` the reported fixed rate:
//!
//! | side   | Buyer leg            | Seller leg           |
//! |--------|----------------------|----------------------|
//! | Buyer  | rptg, `n * adj`      | othr, `n * -adj`     |
//! | Seller | othr, `n * -fxd`     | rptg, `n * fxd`      |
//!
//! where `adj = |fxd|` if `fxd < 0` and `fxd` otherwise. The absolute value
//! is taken on buyer-initiated reports only; seller-initiated reports keep
//! the rate as reported.
//!
//! A cash flow outside the `Decimal` range is an overflow error, not a panic.

use crate::core::error::{PipelineError, Result};
use crate::core::leg::{Leg, LegBook, Position};
use crate::core::trade::Side;
use crate::reconciliation::enrichment::{Counterparty, ReconciledBook, ReconciledTrade};
use log::debug;
use rust_decimal::Decimal;

/// Fixed rate used for cash flows, after the buyer-side correction.
pub fn adjusted_fixed_rate(side: Side, fxd: Decimal) -> Decimal {
    if side == Side::Buyer && fxd < Decimal::ZERO {
        fxd.abs()
    } else {
        fxd
    }
}

fn leg(
    trade: &ReconciledTrade,
    party: &Counterparty,
    position: Position,
    rate: Decimal,
) -> Result<Leg> {
    let cash_flow = trade.notional.checked_mul(rate).ok_or_else(|| {
        PipelineError::overflow(format!(
            "cash flow of trade `{}` ({} * {})",
            trade.uti, trade.notional, rate
        ))
    })?;
    Ok(Leg {
        uti: trade.uti.clone(),
        lei: party.lei.clone(),
        name: party.name.clone(),
        country: party.country.clone(),
        position,
        notional: trade.notional,
        cash_flow,
        index: trade.flt.clone(),
    })
}

/// The (Buyer, Seller) legs of one trade.
///
/// # Errors
///
/// Returns [`PipelineError::Overflow`] if `notional * fxd` is out of range.
pub fn split_trade(trade: &ReconciledTrade) -> Result<(Leg, Leg)> {
    let fxd = adjusted_fixed_rate(trade.side, trade.fxd);
    let pair = match trade.side {
        Side::Buyer => (
            leg(trade, &trade.rptg, Position::Buyer, fxd)?,
            leg(trade, &trade.othr, Position::Seller, -fxd)?,
        ),
        Side::Seller => (
            leg(trade, &trade.othr, Position::Buyer, -fxd)?,
            leg(trade, &trade.rptg, Position::Seller, fxd)?,
        ),
    };
    Ok(pair)
}

/// Split every reconciled trade; both leg tables have one row per trade.
pub fn split(book: &ReconciledBook) -> Result<LegBook> {
    let mut legs = LegBook::new();
    for trade in book.trades() {
        let (buyer, seller) = split_trade(trade)?;
        legs.push_pair(buyer, seller);
    }
    debug!("split {} trades into {} legs", book.len(), legs.len());
    Ok(legs)
}
