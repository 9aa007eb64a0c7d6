//! Quote validation

use anyhow::Result;
use rust_decimal::Decimal;
use crate::types::PriceQuote;

/// Returns `(bid, ask)` for a quote the detector may pair, or why it may not.
pub fn validate_quote(quote: &PriceQuote) -> Result<(Decimal, Decimal)> {
    let (bid, ask) = match (quote.bid, quote.ask) {
        (Some(bid), Some(ask)) => (bid, ask),
        _ => {
            return Err(anyhow::anyhow!(
                "{} {} quote is missing bid or ask",
                quote.venue,
                quote.pair()
            ))
        }
    };

    if bid <= Decimal::ZERO || ask <= Decimal::ZERO {
        return Err(anyhow::anyhow!(
            "{} {} price is zero or negative: bid={} ask={}",
            quote.venue,
            quote.pair(),
            bid,
            ask
        ));
    }

    if bid > ask {
        return Err(anyhow::anyhow!(
            "{} {} book is crossed: bid={} > ask={}",
            quote.venue,
            quote.pair(),
            bid,
            ask
        ));
    }

    Ok((bid, ask))
}
