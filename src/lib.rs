//! Bestex - liquidity-aware smart order routing across cryptocurrency exchanges.
//!
//! This crate answers one question: where, and at what realistic price, can a
//! single-leg market order be filled most cheaply right now - and optionally
//! executes that decision once.
//!
//! # Architecture
//!
//! Price discovery walks each venue's order book instead of trusting the
//! top-of-book quote, so the estimate already includes slippage:
//!
//! - **`domain`** - Exchange-agnostic types (pairs, order books, orders) and
//!   the depth-weighted price estimator
//! - **`exchange`** - The [`Exchange`](exchange::Exchange) trait every
//!   connected venue implements
//! - **`broker`** - Concurrent fan-out across venues, cheapest-venue
//!   selection, and select-then-execute routing
//! - **`adapter`** - Venue implementations (Binance spot, Kraken Futures)
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files with env-var secrets
//! - [`domain`] - Core types and the price estimator
//! - [`error`] - Error types for the crate
//! - [`exchange`] - Trait definitions for exchange implementations
//! - [`broker`] - Multi-venue routing
//! - [`adapter`] - Per-venue REST clients
//! - [`app`] - Application orchestration for the CLI binary
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bestex::adapter::binance::Binance;
//! use bestex::broker::Broker;
//! use bestex::config::BinanceConfig;
//! use bestex::exchange::Exchange;
//! use rust_decimal_macros::dec;
//!
//! # async fn run() -> bestex::error::Result<()> {
//! let binance = Binance::connect(&BinanceConfig::default()).await?;
//!
//! let mut broker = Broker::new();
//! broker.add_exchange(Arc::new(binance));
//!
//! let (price, venue) = broker.get_lowest_market_buy_price("BTCUSD", dec!(0.5)).await?;
//! println!("cheapest fill: {price} on {}", venue.name());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod broker;
pub mod config;
pub mod domain;
pub mod error;
pub mod exchange;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
