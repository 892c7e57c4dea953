//! Multi-venue order routing.
//!
//! The broker holds the registered exchange clients and answers two
//! questions: "what would this market buy really cost on each venue" and
//! "where is it cheapest". Price discovery fans out to every venue
//! concurrently; a failing venue is excluded without disturbing the others,
//! and the cheapest successful estimate wins.
//!
//! Selection and execution are two phases, not one atomic step. The winning
//! price is a snapshot that may be stale by the time the order reaches the
//! venue, and the broker does not re-verify it or fail over to the runner-up
//! if execution is rejected: retrying elsewhere would require re-running full
//! price discovery to stay correct, which is left to the caller.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::domain::{estimate_market_buy_price, MarketOrder, OrderSide, Price, Volume};
use crate::error::{BrokerError, Result, VenueFailure};
use crate::exchange::Exchange;

/// Routes market orders to whichever registered exchange offers the best
/// depth-adjusted price.
#[derive(Default)]
pub struct Broker {
    /// Registration order is preserved for deterministic tie-breaking.
    exchanges: Vec<Arc<dyn Exchange>>,
}

impl Broker {
    /// Creates a broker with no exchanges registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an exchange at the end of the registration list.
    ///
    /// No deduplication is performed: adding the same venue twice is accepted
    /// and will cause it to be queried twice per fan-out, wasting rate-limit
    /// budget but not corrupting results.
    pub fn add_exchange(&mut self, exchange: Arc<dyn Exchange>) {
        self.exchanges.push(exchange);
    }

    /// The registered exchanges, in registration order.
    #[must_use]
    pub fn exchanges(&self) -> &[Arc<dyn Exchange>] {
        &self.exchanges
    }

    /// Estimates the depth-weighted market buy price for `size` of `symbol`
    /// on one exchange.
    ///
    /// Resolves the pair through the exchange's own catalog, fetches a fresh
    /// order book, and walks its asks. Failures from the client and the
    /// estimator propagate unchanged.
    pub async fn get_estimated_market_buy_price(
        &self,
        exchange: &dyn Exchange,
        symbol: &str,
        size: Volume,
    ) -> Result<Price> {
        let pair = exchange.get_pair(symbol)?;
        let book = exchange.get_order_book(&pair).await?;
        let price = estimate_market_buy_price(&book, size)?;

        debug!(
            exchange = exchange.name(),
            symbol,
            price = %price,
            "Estimated market buy price"
        );
        Ok(price)
    }

    /// Finds the lowest estimated market buy price across every registered
    /// exchange, together with the venue offering it.
    ///
    /// All venues are queried concurrently; one venue's failure does not
    /// cancel the others' requests. Ties are broken by registration order,
    /// earliest registered wins. If every venue fails, the returned error
    /// aggregates each venue's individual failure.
    pub async fn get_lowest_market_buy_price(
        &self,
        symbol: &str,
        size: Volume,
    ) -> Result<(Price, Arc<dyn Exchange>)> {
        if self.exchanges.is_empty() {
            return Err(BrokerError::NoExchanges.into());
        }

        // One future per venue; join_all is the barrier that lets every
        // in-flight request settle before any result is judged.
        let estimates = join_all(self.exchanges.iter().map(|exchange| {
            self.get_estimated_market_buy_price(exchange.as_ref(), symbol, size)
        }))
        .await;

        let mut best: Option<(Price, &Arc<dyn Exchange>)> = None;
        let mut failures = Vec::new();

        for (exchange, outcome) in self.exchanges.iter().zip(estimates) {
            match outcome {
                Ok(price) => {
                    // Strictly-lower keeps the earliest-registered venue on ties.
                    if best.map_or(true, |(lowest, _)| price < lowest) {
                        best = Some((price, exchange));
                    }
                }
                Err(error) => {
                    warn!(
                        exchange = exchange.name(),
                        symbol,
                        error = %error,
                        "Venue failed during price discovery"
                    );
                    failures.push(VenueFailure {
                        exchange: exchange.name().to_string(),
                        error,
                    });
                }
            }
        }

        match best {
            Some((price, exchange)) => Ok((price, Arc::clone(exchange))),
            None => Err(BrokerError::AllExchangesFailed {
                symbol: symbol.to_string(),
                failures,
            }
            .into()),
        }
    }

    /// Executes a market buy on the venue with the lowest estimated price.
    ///
    /// Runs price discovery, then places the order on the winning venue with
    /// the same pair and size. Execution failures propagate to the caller
    /// unchanged; there is no retry and no failover to the runner-up.
    pub async fn execute_market_buy_for_lowest_price(
        &self,
        symbol: &str,
        size: Volume,
    ) -> Result<MarketOrder> {
        let (price, exchange) = self.get_lowest_market_buy_price(symbol, size).await?;

        debug!(
            exchange = exchange.name(),
            symbol,
            estimated_price = %price,
            "Executing market buy on the cheapest venue"
        );

        let pair = exchange.get_pair(symbol)?;
        exchange
            .execute_market_order(&pair, size, OrderSide::Buy)
            .await
    }
}
