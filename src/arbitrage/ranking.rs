//! Opportunity ranking
//!
//! Total order: net profit descending, estimated USD profit descending,
//! symbol ascending, then buy and sell venue ascending. The last two keys
//! only matter for distinct directions on the same symbol with identical
//! economics, but they make the order total.

use std::cmp::Ordering;
use crate::types::Opportunity;

pub fn compare_opportunities(a: &Opportunity, b: &Opportunity) -> Ordering {
    b.net_profit_pct
        .cmp(&a.net_profit_pct)
        .then_with(|| b.estimated_profit_usd.cmp(&a.estimated_profit_usd))
        .then_with(|| a.symbol.cmp(&b.symbol))
        .then_with(|| a.buy_venue.cmp(&b.buy_venue))
        .then_with(|| a.sell_venue.cmp(&b.sell_venue))
}

/// Sorts a cycle's opportunities best-first. The head is the dispatch
/// candidate; the rest are kept for reporting only.
pub fn rank_opportunities(mut opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
    opportunities.sort_unstable_by(compare_opportunities);
    opportunities
}
