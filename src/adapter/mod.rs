//! Venue-specific exchange client implementations.

pub mod binance;
pub mod kraken_futures;
