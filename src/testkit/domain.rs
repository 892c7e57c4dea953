//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`Pair`], [`OrderBook`], and
//! related types so tests focus on assertions rather than construction
//! boilerplate.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::{OrderBook, Pair, PriceLevel};

/// Create a validated [`Pair`].
pub fn pair(base: &str, quote: &str, exchange_symbol: &str) -> Pair {
    Pair::try_new(base, quote, exchange_symbol).expect("test pair is valid")
}

/// The BTC/USD pair most tests route through.
pub fn btc_usd() -> Pair {
    pair("BTC", "USD", "BTCUSD")
}

/// Build price levels from `(price, size)` tuples.
pub fn levels(raw: &[(Decimal, Decimal)]) -> Vec<PriceLevel> {
    raw.iter()
        .map(|(price, size)| PriceLevel::new(*price, *size))
        .collect()
}

/// A bid-less book with the given asks, timestamped now.
pub fn book_with_asks(pair: Pair, asks: &[(Decimal, Decimal)]) -> OrderBook {
    OrderBook::try_new(pair, Vec::new(), levels(asks), Utc::now()).expect("test book is valid")
}
