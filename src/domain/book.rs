//! Order book types for market depth representation.
//!
//! An order book has two sides:
//! - **Bids**: buy orders, sorted by price strictly descending (best bid first)
//! - **Asks**: sell orders, sorted by price strictly ascending (best ask first)
//!
//! Snapshots are validated on construction: misordered levels, non-positive
//! sizes, and crossed books are data-quality failures and never enter the
//! domain. A snapshot is created fresh per fetch and never mutated; staleness
//! is the caller's concern via fetch frequency.
//!
//! # Examples
//!
//! ```
//! use bestex::domain::{OrderBook, Pair, PriceLevel};
//! use chrono::Utc;
//! use rust_decimal_macros::dec;
//!
//! let pair = Pair::try_new("ADA", "EUR", "ADAEUR")?;
//! let book = OrderBook::try_new(
//!     pair,
//!     vec![PriceLevel::new(dec!(0.5475), dec!(5751))],
//!     vec![PriceLevel::new(dec!(0.5481), dec!(822))],
//!     Utc::now(),
//! )?;
//!
//! assert_eq!(book.best_bid().unwrap().price(), dec!(0.5475));
//! assert_eq!(book.best_ask().unwrap().price(), dec!(0.5481));
//! # Ok::<(), bestex::domain::error::DomainError>(())
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::error::DomainError;
use super::money::{Price, Volume};
use super::pair::Pair;

/// A single price level in an order book.
///
/// Represents aggregated orders at a specific price point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    /// The price at this level.
    price: Price,
    /// Total volume available at this price.
    size: Volume,
}

impl PriceLevel {
    /// Creates a new price level.
    #[must_use]
    pub const fn new(price: Price, size: Volume) -> Self {
        Self { price, size }
    }

    /// Returns the price at this level.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Returns the total volume available at this level.
    #[must_use]
    pub const fn size(&self) -> Volume {
        self.size
    }
}

/// A depth snapshot for one pair on one venue at a point in time.
#[derive(Debug, Clone)]
pub struct OrderBook {
    pair: Pair,
    /// Bid (buy) levels, sorted by price strictly descending.
    bids: Vec<PriceLevel>,
    /// Ask (sell) levels, sorted by price strictly ascending.
    asks: Vec<PriceLevel>,
    /// When the snapshot was taken.
    timestamp: DateTime<Utc>,
}

impl OrderBook {
    /// Creates a snapshot, validating both sides.
    ///
    /// Within each side prices must be strictly monotonic in the stated
    /// direction and every size positive; the best bid must sit below the
    /// best ask.
    pub fn try_new(
        pair: Pair,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        for level in bids.iter().chain(asks.iter()) {
            if level.size <= Decimal::ZERO {
                return Err(DomainError::NonPositiveLevelSize {
                    price: level.price,
                    size: level.size,
                });
            }
        }
        for window in bids.windows(2) {
            if window[1].price >= window[0].price {
                return Err(DomainError::UnsortedBids {
                    prev: window[0].price,
                    next: window[1].price,
                });
            }
        }
        for window in asks.windows(2) {
            if window[1].price <= window[0].price {
                return Err(DomainError::UnsortedAsks {
                    prev: window[0].price,
                    next: window[1].price,
                });
            }
        }
        if let (Some(bid), Some(ask)) = (bids.first(), asks.first()) {
            if bid.price >= ask.price {
                return Err(DomainError::CrossedBook {
                    bid: bid.price,
                    ask: ask.price,
                });
            }
        }

        Ok(Self {
            pair,
            bids,
            asks,
            timestamp,
        })
    }

    /// Returns the pair this snapshot belongs to.
    #[must_use]
    pub const fn pair(&self) -> &Pair {
        &self.pair
    }

    /// Returns all bid levels (sorted by price descending).
    #[must_use]
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    /// Returns all ask levels (sorted by price ascending).
    #[must_use]
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    /// Returns the best bid (highest buy price).
    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Returns the best ask (lowest sell price).
    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// When the snapshot was taken.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
