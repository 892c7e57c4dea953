//! Exchange trait definitions.
//!
//! These traits define the interface that any exchange implementation must
//! provide. The broker depends only on this contract, never on a concrete
//! venue type.

use async_trait::async_trait;

use crate::domain::{MarketOrder, OrderBook, OrderSide, Pair, Volume};
use crate::error::{ExchangeError, Result};

/// A connected cryptocurrency exchange.
///
/// Every operation except [`name`](Self::name) and [`pairs`](Self::pairs)
/// performs network I/O and may suspend; none mutates state outside the
/// implementing client. Implementations own their request timeouts, so one
/// unresponsive venue cannot stall a multi-venue query indefinitely.
#[async_trait]
pub trait Exchange: Send + Sync + std::fmt::Debug {
    /// Friendly name of the exchange, presented to the user.
    fn name(&self) -> &str;

    /// The pair catalog loaded when the client connected.
    fn pairs(&self) -> &[Pair];

    /// Fetches the venue's current tradable pairs, normalized.
    async fn load_pairs(&self) -> Result<Vec<Pair>>;

    /// Fetches a fresh depth snapshot for the pair.
    async fn get_order_book(&self, pair: &Pair) -> Result<OrderBook>;

    /// Places a market order and returns the venue's result, partial fills
    /// included.
    async fn execute_market_order(
        &self,
        pair: &Pair,
        size: Volume,
        side: OrderSide,
    ) -> Result<MarketOrder>;

    /// Resolves a pair by venue-native symbol or by concatenated base and
    /// quote. Useful where venues use non-standard symbols for a market, for
    /// example Kraken Futures which trades BTC/USD as "PF_XBTUSD".
    fn get_pair(&self, symbol: &str) -> Result<Pair> {
        self.pairs()
            .iter()
            .find(|pair| pair.exchange_symbol() == symbol || pair.matches_base_quote(symbol))
            .cloned()
            .ok_or_else(|| {
                ExchangeError::PairDoesNotExist {
                    exchange: self.name().to_string(),
                    symbol: symbol.to_string(),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testkit::domain::pair;
    use crate::testkit::exchange::StaticExchange;

    fn venue() -> StaticExchange {
        StaticExchange::new("Kraken Futures")
            .with_pair(pair("XBT", "USD", "PF_XBTUSD"))
            .with_pair(pair("BTC", "USD", "PF_XBTUSD"))
            .with_pair(pair("ADA", "EUR", "PF_ADAEUR"))
    }

    #[test]
    fn get_pair_resolves_by_native_symbol() {
        let found = venue().get_pair("PF_ADAEUR").unwrap();
        assert_eq!(found.base(), "ADA");
        assert_eq!(found.quote(), "EUR");
    }

    #[test]
    fn get_pair_resolves_by_base_quote_concatenation() {
        let found = venue().get_pair("BTCUSD").unwrap();
        assert_eq!(found.exchange_symbol(), "PF_XBTUSD");
    }

    #[test]
    fn get_pair_prefers_the_earliest_catalog_match() {
        // Both XBT/USD and BTC/USD map to PF_XBTUSD; the first listed wins
        let found = venue().get_pair("PF_XBTUSD").unwrap();
        assert_eq!(found.base(), "XBT");
    }

    #[tokio::test]
    async fn load_pairs_returns_the_normalized_catalog() {
        let pairs = venue().load_pairs().await.unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].base(), "XBT");
        assert_eq!(pairs[2].exchange_symbol(), "PF_ADAEUR");
    }

    #[test]
    fn get_pair_misses_with_a_handy_error() {
        let err = venue().get_pair("DOGEUSD").unwrap_err();
        match err {
            Error::Exchange(ExchangeError::PairDoesNotExist { exchange, symbol }) => {
                assert_eq!(exchange, "Kraken Futures");
                assert_eq!(symbol, "DOGEUSD");
            }
            other => panic!("expected PairDoesNotExist, got {other}"),
        }
    }
}
