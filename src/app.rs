//! App orchestration module.
//!
//! Connects the configured venues, registers them with a broker, and runs
//! one price-discovery round for the requested symbol and size - optionally
//! executing on the winning venue.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::adapter::binance::Binance;
use crate::adapter::kraken_futures::KrakenFutures;
use crate::broker::Broker;
use crate::config::Config;
use crate::error::{BrokerError, Result};
use crate::exchange::Exchange;

/// Main application struct.
pub struct App;

impl App {
    /// Run one routing round: discover the cheapest venue for a market buy
    /// of `size` of `symbol`, and execute there if `execute` is set.
    pub async fn run(config: Config, symbol: &str, size: Decimal, execute: bool) -> Result<()> {
        let broker = connect_broker(&config).await?;

        if !execute {
            let (price, venue) = broker.get_lowest_market_buy_price(symbol, size).await?;
            info!(
                symbol,
                size = %size,
                price = %price,
                exchange = venue.name(),
                "Lowest estimated market buy price"
            );
            return Ok(());
        }

        let order = broker
            .execute_market_buy_for_lowest_price(symbol, size)
            .await?;
        match order.average_price() {
            Some(average) => info!(
                order_id = %order.order_id(),
                pair = %order.pair(),
                filled = %order.filled(),
                requested = %order.requested_size(),
                average_price = %average,
                "Market buy executed"
            ),
            None => warn!(
                order_id = %order.order_id(),
                pair = %order.pair(),
                "Market buy accepted but nothing filled"
            ),
        }

        Ok(())
    }
}

/// Connect every configured venue. A venue that fails to connect is skipped
/// with a warning; routing proceeds with the rest.
async fn connect_broker(config: &Config) -> Result<Broker> {
    let mut broker = Broker::new();

    if let Some(binance_config) = &config.binance {
        match Binance::connect(binance_config).await {
            Ok(venue) => broker.add_exchange(Arc::new(venue)),
            Err(err) => {
                error!(exchange = Binance::NAME, error = %err, "Failed to connect, skipping venue");
            }
        }
    }
    if let Some(kraken_config) = &config.kraken_futures {
        match KrakenFutures::connect(kraken_config).await {
            Ok(venue) => broker.add_exchange(Arc::new(venue)),
            Err(err) => {
                error!(exchange = KrakenFutures::NAME, error = %err, "Failed to connect, skipping venue");
            }
        }
    }

    if broker.exchanges().is_empty() {
        return Err(BrokerError::NoExchanges.into());
    }

    info!(exchanges = broker.exchanges().len(), "Broker ready");
    Ok(broker)
}
