//! Arbitrage opportunity calculation
//!
//! Turns one symbol's quotes (at most one per venue) into every directional
//! buy/sell pairing whose fee-adjusted profit clears the configured minimum.
//! Candidates below the minimum are never built.

use chrono::Utc;
use rust_decimal::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;
use crate::{
    config::Config,
    types::{FeeSchedule, Opportunity, PriceQuote, VenueId},
    validation::validate_quote,
};

/// Thresholds shared by every symbol in a cycle.
#[derive(Debug, Clone)]
pub struct DetectionParams {
    pub fees: FeeSchedule,
    /// Fraction; a candidate must be strictly above it.
    pub min_profit_pct: Decimal,
    pub trade_amount_usd: Decimal,
}

impl DetectionParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fees: config.fee_schedule(),
            min_profit_pct: config.min_profit_pct,
            trade_amount_usd: config.trade_amount_usd,
        }
    }
}

/// Priced side of a validated quote.
struct Book<'a> {
    quote: &'a PriceQuote,
    bid: Decimal,
    ask: Decimal,
}

pub fn find_opportunities(
    symbol: &str,
    quotes: &BTreeMap<VenueId, PriceQuote>,
    params: &DetectionParams,
) -> Vec<Opportunity> {
    let books: Vec<Book<'_>> = quotes
        .values()
        .filter_map(|quote| match validate_quote(quote) {
            Ok((bid, ask)) => Some(Book { quote, bid, ask }),
            Err(e) => {
                debug!("Discarding quote before pairing: {}", e);
                None
            }
        })
        .collect();

    if books.len() < 2 {
        return Vec::new();
    }

    let mut opportunities = Vec::new();
    for buy in &books {
        for sell in &books {
            if buy.quote.venue == sell.quote.venue {
                continue;
            }
            if let Some(opportunity) = calculate_opportunity(symbol, buy, sell, params) {
                opportunities.push(opportunity);
            }
        }
    }
    opportunities
}

fn calculate_opportunity(
    symbol: &str,
    buy: &Book<'_>,
    sell: &Book<'_>,
    params: &DetectionParams,
) -> Option<Opportunity> {
    let buy_fee = params.fees.fee(&buy.quote.venue);
    let sell_fee = params.fees.fee(&sell.quote.venue);

    let Some((gross_profit_pct, net_profit_pct)) = profit_pcts(buy.ask, sell.bid, buy_fee, sell_fee) else {
        debug!(
            "{} {}->{}: spread out of decimal range, skipping pair",
            symbol, buy.quote.venue, sell.quote.venue
        );
        return None;
    };

    if net_profit_pct <= params.min_profit_pct {
        return None;
    }

    let Some((trade_quantity, estimated_profit_usd)) =
        profit_usd(params.trade_amount_usd, buy.ask, sell.bid, buy_fee, sell_fee)
    else {
        debug!(
            "{} {}->{}: trade size out of decimal range at ask {}, skipping pair",
            symbol, buy.quote.venue, sell.quote.venue, buy.ask
        );
        return None;
    };

    Some(Opportunity {
        id: uuid::Uuid::new_v4().to_string(),
        detected_at: Utc::now(),
        symbol: symbol.to_string(),
        buy_quote_currency: buy.quote.quote_currency.clone(),
        sell_quote_currency: sell.quote.quote_currency.clone(),
        buy_venue: buy.quote.venue.clone(),
        sell_venue: sell.quote.venue.clone(),
        buy_price: buy.ask,
        sell_price: sell.bid,
        gross_profit_pct,
        net_profit_pct,
        trade_quantity,
        estimated_profit_usd,
    })
}

/// Gross and fee-adjusted spread as fractions of the buy price.
fn profit_pcts(
    buy_ask: Decimal,
    sell_bid: Decimal,
    buy_fee: Decimal,
    sell_fee: Decimal,
) -> Option<(Decimal, Decimal)> {
    let gross = sell_bid.checked_sub(buy_ask)?.checked_div(buy_ask)?;
    let net = gross.checked_sub(buy_fee)?.checked_sub(sell_fee)?;
    Some((gross, net))
}

/// Base quantity bought for `trade_amount` and the profit after both fees.
fn profit_usd(
    trade_amount: Decimal,
    buy_ask: Decimal,
    sell_bid: Decimal,
    buy_fee: Decimal,
    sell_fee: Decimal,
) -> Option<(Decimal, Decimal)> {
    let quantity = trade_amount.checked_div(buy_ask)?;
    let proceeds = quantity.checked_mul(sell_bid)?;
    let cost = quantity.checked_mul(buy_ask)?;
    let fees = trade_amount
        .checked_mul(buy_fee)?
        .checked_add(proceeds.checked_mul(sell_fee)?)?;
    let profit = proceeds.checked_sub(cost)?.checked_sub(fees)?;
    Some((quantity, profit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn quote(venue: &str, bid: Decimal, ask: Decimal) -> PriceQuote {
        PriceQuote {
            venue: VenueId::new(venue),
            symbol: "XLM".into(),
            quote_currency: "USD".into(),
            bid: Some(bid),
            ask: Some(ask),
            last: Some(bid),
            observed_at: Utc::now(),
        }
    }

    fn book(quotes: Vec<PriceQuote>) -> BTreeMap<VenueId, PriceQuote> {
        quotes.into_iter().map(|q| (q.venue.clone(), q)).collect()
    }

    fn params(min_profit_pct: Decimal) -> DetectionParams {
        DetectionParams {
            fees: FeeSchedule::new()
                .with_rate("a", dec!(0.001))
                .with_rate("b", dec!(0.001)),
            min_profit_pct,
            trade_amount_usd: dec!(100),
        }
    }

    #[test]
    fn spread_below_threshold_emits_nothing() {
        // gross 0.40%, net 0.20% against a 0.5% minimum
        let quotes = book(vec![
            quote("a", dec!(0.1245), dec!(0.1248)),
            quote("b", dec!(0.1253), dec!(0.1255)),
        ]);
        assert!(find_opportunities("XLM", &quotes, &params(dec!(0.005))).is_empty());
    }

    #[test]
    fn wide_spread_emits_buy_a_sell_b() {
        let quotes = book(vec![
            quote("a", dec!(0.1245), dec!(0.1248)),
            quote("b", dec!(0.1260), dec!(0.1262)),
        ]);
        let found = find_opportunities("XLM", &quotes, &params(dec!(0.005)));
        assert_eq!(found.len(), 1);

        let opp = &found[0];
        assert_eq!(opp.buy_venue, VenueId::new("a"));
        assert_eq!(opp.sell_venue, VenueId::new("b"));
        assert_eq!(opp.buy_price, dec!(0.1248));
        assert_eq!(opp.sell_price, dec!(0.1260));
        assert_eq!(opp.gross_profit_pct.round_dp(4), dec!(0.0096));
        assert_eq!(opp.net_profit_pct.round_dp(4), dec!(0.0076));
        assert_eq!(opp.trade_quantity, dec!(100) / dec!(0.1248));
        // $0.96 spread less $0.10 buy fee and ~$0.10 sell fee
        assert_eq!(opp.estimated_profit_usd.round_dp(2), dec!(0.76));
    }

    #[test]
    fn identical_books_never_pair() {
        let quotes = book(vec![
            quote("a", dec!(1.00), dec!(1.01)),
            quote("b", dec!(1.00), dec!(1.01)),
        ]);
        assert!(find_opportunities("XLM", &quotes, &params(dec!(0))).is_empty());
    }

    #[test]
    fn single_venue_or_invalid_quotes_give_empty_result() {
        let only_one = book(vec![quote("a", dec!(1.0), dec!(1.1))]);
        assert!(find_opportunities("XLM", &only_one, &params(dec!(0))).is_empty());

        let mut broken = quote("b", dec!(2.0), dec!(2.1));
        broken.ask = None;
        let one_valid = book(vec![quote("a", dec!(1.0), dec!(1.1)), broken]);
        assert!(find_opportunities("XLM", &one_valid, &params(dec!(0))).is_empty());

        let zero_priced = book(vec![
            quote("a", dec!(0), dec!(0)),
            quote("b", dec!(2.0), dec!(2.1)),
        ]);
        assert!(find_opportunities("XLM", &zero_priced, &params(dec!(0))).is_empty());
    }

    #[test]
    fn three_venues_consider_every_direction() {
        let quotes = book(vec![
            quote("a", dec!(0.99), dec!(1.00)),
            quote("b", dec!(1.05), dec!(1.06)),
            quote("c", dec!(1.10), dec!(1.11)),
        ]);
        let found = find_opportunities("XLM", &quotes, &params(dec!(0.001)));
        let pairs: Vec<(String, String)> = found
            .iter()
            .map(|o| (o.buy_venue.to_string(), o.sell_venue.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "b".to_string()),
                ("a".to_string(), "c".to_string()),
                ("b".to_string(), "c".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_venue_falls_back_to_default_fee() {
        let quotes = book(vec![
            quote("x", dec!(0.99), dec!(1.00)),
            quote("y", dec!(1.02), dec!(1.03)),
        ]);
        let found = find_opportunities("XLM", &quotes, &params(dec!(0)));
        assert_eq!(found[0].net_profit_pct, dec!(0.018));
    }

    #[test]
    fn out_of_range_prices_drop_only_their_pairs() {
        let quotes = book(vec![
            quote("a", Decimal::new(1, 28), Decimal::new(1, 28)),
            quote("b", dec!(1.00), dec!(1.01)),
            quote("c", dec!(1.05), dec!(1.06)),
        ]);
        let found = find_opportunities("XLM", &quotes, &params(dec!(0.001)));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].buy_venue, VenueId::new("b"));
        assert_eq!(found[0].sell_venue, VenueId::new("c"));
    }

    #[test]
    fn extreme_prices_never_panic() {
        let quotes = book(vec![
            quote("a", Decimal::new(1, 28), Decimal::new(1, 28)),
            quote("b", Decimal::MAX, Decimal::MAX),
        ]);
        assert!(find_opportunities("XLM", &quotes, &params(Decimal::ZERO)).is_empty());
    }

    fn price() -> impl Strategy<Value = Decimal> {
        (1u32..100_000u32).prop_map(|n| Decimal::new(n as i64, 4))
    }

    proptest! {
        #[test]
        fn emitted_opportunities_clear_the_threshold(
            books in prop::collection::vec((price(), 0u32..500u32), 2..5),
            min_bps in 0u32..200u32,
        ) {
            let quotes = book(
                books
                    .iter()
                    .enumerate()
                    .map(|(i, (bid, spread))| {
                        quote(&format!("v{i}"), *bid, *bid + Decimal::new(*spread as i64, 4))
                    })
                    .collect(),
            );
            let min = Decimal::new(min_bps as i64, 4);
            for opp in find_opportunities("XLM", &quotes, &params(min)) {
                prop_assert!(opp.net_profit_pct > min);
                prop_assert!(opp.buy_venue != opp.sell_venue);
                prop_assert!(opp.sell_price > opp.buy_price);
            }
        }

        #[test]
        fn fewer_than_two_valid_venues_is_always_empty(bid in price(), spread in 0u32..500u32) {
            let quotes = book(vec![quote("a", bid, bid + Decimal::new(spread as i64, 4))]);
            prop_assert!(find_opportunities("XLM", &quotes, &params(Decimal::ZERO)).is_empty());
        }
    }
}
