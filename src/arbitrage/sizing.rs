//! Balance-aware trade sizing

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::{types::Opportunity, utils::safe_ratio};

/// Fraction of the computed size actually traded.
pub const BALANCE_SAFETY_MARGIN: Decimal = dec!(0.98);

/// Largest base quantity both legs can cover.
///
/// `buy_balance` is quote currency on the buy venue, `sell_balance` is base
/// currency already held on the sell venue.
pub fn calculate_optimal_trade_amount(
    opportunity: &Opportunity,
    buy_balance: Decimal,
    sell_balance: Decimal,
    trade_amount_usd: Decimal,
) -> Decimal {
    let max_buyable = safe_ratio(
        buy_balance.min(trade_amount_usd).max(Decimal::ZERO),
        opportunity.buy_price,
    );
    let max_sellable = sell_balance.max(Decimal::ZERO);

    max_buyable.min(max_sellable) * BALANCE_SAFETY_MARGIN
}
