//! Depth-weighted market price estimation.
//!
//! The top-of-book quote only covers the first level of depth; a market order
//! bigger than that level walks further into the book and fills at worse
//! prices. The estimator consumes levels exactly the way the matching engine
//! would, so the returned price already includes slippage.
//!
//! This is a pure computation over a snapshot: no I/O, no shared state.

use rust_decimal::Decimal;

use crate::domain::error::DomainError;
use crate::domain::{OrderBook, OrderSide, Price, Volume};
use crate::error::{ExchangeError, Result};

/// Estimates the average fill price of a market order of `size` against the
/// given depth snapshot.
///
/// Walks the asks in ascending price order for a buy (the bids in descending
/// order for a sell), consuming `min(remaining, level size)` at each level
/// until the order is filled.
///
/// # Errors
///
/// - [`DomainError::NonPositiveOrderSize`] if `size` is zero or negative.
/// - [`ExchangeError::InsufficientLiquidity`] if the visible depth is
///   exhausted before the order is filled; no finite price can be quoted.
pub fn estimate_market_price(book: &OrderBook, size: Volume, side: OrderSide) -> Result<Price> {
    if size <= Decimal::ZERO {
        return Err(DomainError::NonPositiveOrderSize { size }.into());
    }

    let levels = match side {
        OrderSide::Buy => book.asks(),
        OrderSide::Sell => book.bids(),
    };

    let mut remaining = size;
    let mut notional = Decimal::ZERO;
    for level in levels {
        let take = remaining.min(level.size());
        notional += level.price() * take;
        remaining -= take;
        if remaining.is_zero() {
            break;
        }
    }

    if remaining > Decimal::ZERO {
        return Err(ExchangeError::InsufficientLiquidity.into());
    }

    Ok(notional / size)
}

/// Estimates the average fill price of a market buy. See
/// [`estimate_market_price`].
pub fn estimate_market_buy_price(book: &OrderBook, size: Volume) -> Result<Price> {
    estimate_market_price(book, size, OrderSide::Buy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pair, PriceLevel};
    use crate::error::Error;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn book(bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> OrderBook {
        let to_levels =
            |raw: &[(Decimal, Decimal)]| raw.iter().map(|(p, s)| PriceLevel::new(*p, *s)).collect();
        OrderBook::try_new(
            Pair::try_new("BTC", "USD", "BTCUSD").unwrap(),
            to_levels(bids),
            to_levels(asks),
            Utc::now(),
        )
        .unwrap()
    }

    fn ladder() -> OrderBook {
        book(
            &[(dec!(99), dec!(3)), (dec!(98), dec!(5))],
            &[
                (dec!(100), dec!(1)),
                (dec!(101), dec!(2)),
                (dec!(103), dec!(5)),
            ],
        )
    }

    #[test]
    fn buy_walks_asks_and_weights_by_consumed_size() {
        // 1 @ 100 plus 1 @ 101 -> (100 + 101) / 2
        let price = estimate_market_buy_price(&ladder(), dec!(2)).unwrap();
        assert_eq!(price, dec!(100.5));
    }

    #[test]
    fn buy_within_first_level_costs_the_best_ask() {
        let price = estimate_market_buy_price(&ladder(), dec!(0.5)).unwrap();
        assert_eq!(price, dec!(100));
    }

    #[test]
    fn buy_consuming_exact_total_depth_succeeds() {
        // 1 + 2 + 5 = 8, the whole visible ask side
        let price = estimate_market_buy_price(&ladder(), dec!(8)).unwrap();
        assert_eq!(price, (dec!(100) + dec!(202) + dec!(515)) / dec!(8));
    }

    #[test]
    fn buy_beyond_visible_depth_is_a_liquidity_error() {
        let err = estimate_market_buy_price(&ladder(), dec!(10)).unwrap_err();
        assert!(matches!(
            err,
            Error::Exchange(ExchangeError::InsufficientLiquidity)
        ));
    }

    #[test]
    fn empty_ask_side_is_a_liquidity_error() {
        let empty = book(&[(dec!(99), dec!(3))], &[]);
        let err = estimate_market_buy_price(&empty, dec!(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::Exchange(ExchangeError::InsufficientLiquidity)
        ));
    }

    #[test]
    fn zero_size_is_a_caller_contract_violation() {
        let err = estimate_market_buy_price(&ladder(), dec!(0)).unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::NonPositiveOrderSize { .. })
        ));
    }

    #[test]
    fn negative_size_is_a_caller_contract_violation() {
        let err = estimate_market_buy_price(&ladder(), dec!(-1)).unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::NonPositiveOrderSize { .. })
        ));
    }

    #[test]
    fn sell_walks_bids_from_the_best_price_down() {
        // 3 @ 99 plus 1 @ 98 -> (297 + 98) / 4
        let price = estimate_market_price(&ladder(), dec!(4), OrderSide::Sell).unwrap();
        assert_eq!(price, dec!(98.75));
    }

    #[test]
    fn sell_beyond_visible_depth_is_a_liquidity_error() {
        let err = estimate_market_price(&ladder(), dec!(9), OrderSide::Sell).unwrap_err();
        assert!(matches!(
            err,
            Error::Exchange(ExchangeError::InsufficientLiquidity)
        ));
    }

    #[test]
    fn estimate_over_real_depth_matches_hand_computation() {
        // First ask level carries the whole order at 0.5481
        let snapshot = book(
            &[(dec!(0.5475), dec!(5751))],
            &[(dec!(0.5481), dec!(822)), (dec!(0.5482), dec!(876))],
        );
        let price = estimate_market_buy_price(&snapshot, dec!(100)).unwrap();
        assert_eq!(price, dec!(0.5481));
    }
}
