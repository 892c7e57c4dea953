//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors that validate inputs,
//! and by the estimator when the caller's contract is violated. They signal a
//! caller or data-quality problem, never a venue failure.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Pair base/quote symbols must be non-empty.
    #[error("pair {field} symbol cannot be empty")]
    EmptyAssetSymbol {
        /// Which symbol was empty: "base" or "quote".
        field: &'static str,
    },

    /// Pair base/quote symbols are normalized to uppercase.
    #[error("asset symbol must be uppercase, got '{symbol}'")]
    AssetNotUppercase { symbol: String },

    /// A pair must trade one asset against another.
    #[error("pair base and quote must differ, got '{symbol}'")]
    IdenticalAssets { symbol: String },

    /// Order-book levels must carry positive quantity.
    #[error("order book level at price {price} has non-positive size {size}")]
    NonPositiveLevelSize {
        price: rust_decimal::Decimal,
        size: rust_decimal::Decimal,
    },

    /// Bids are sorted by price strictly descending.
    #[error("bid prices must be strictly descending, got {prev} then {next}")]
    UnsortedBids {
        prev: rust_decimal::Decimal,
        next: rust_decimal::Decimal,
    },

    /// Asks are sorted by price strictly ascending.
    #[error("ask prices must be strictly ascending, got {prev} then {next}")]
    UnsortedAsks {
        prev: rust_decimal::Decimal,
        next: rust_decimal::Decimal,
    },

    /// A crossed book is a data-quality failure, not a tradable state.
    #[error("crossed book: best bid {bid} is not below best ask {ask}")]
    CrossedBook {
        bid: rust_decimal::Decimal,
        ask: rust_decimal::Decimal,
    },

    /// Order sizes must be positive for estimation and execution.
    #[error("order size must be positive, got {size}")]
    NonPositiveOrderSize { size: rust_decimal::Decimal },

    /// Fills can never exceed what was requested.
    #[error("filled quantity {filled} exceeds requested size {requested}")]
    OverFilled {
        filled: rust_decimal::Decimal,
        requested: rust_decimal::Decimal,
    },
}
