use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Closed taxonomy of exchange-level failures.
///
/// Every venue adapter maps its transport and protocol failures onto these
/// variants; nothing venue-specific leaks past this boundary. The `#[error]`
/// attribute on each variant is its default user-facing message.
#[derive(Error, Debug, Clone)]
pub enum ExchangeError {
    /// Credentials were rejected by the venue.
    #[error("there was a problem authenticating with this exchange: {reason}")]
    Authentication { reason: String },

    /// Malformed, unparseable, or unexpected-status response.
    #[error("the exchange returned a bad response: {reason}")]
    BadResponse { reason: String },

    /// The venue's API rate limit was triggered.
    #[error("the exchange's API rate limit was exceeded")]
    RateLimitExceeded,

    /// The account lacks funds to execute the order.
    #[error("insufficient funds in account to execute order")]
    InsufficientFunds,

    /// Visible order-book depth cannot satisfy the requested size. Raised by
    /// the estimator and by venues with execution-time slippage protection.
    #[error("insufficient liquidity in order book to fill order")]
    InsufficientLiquidity,

    /// The requested pair is unknown to the venue.
    #[error("trading pair '{symbol}' not found on '{exchange}'")]
    PairDoesNotExist { exchange: String, symbol: String },
}

impl ExchangeError {
    /// Shorthand for a [`BadResponse`](Self::BadResponse) with a formatted reason.
    pub fn bad_response(reason: impl Into<String>) -> Self {
        Self::BadResponse {
            reason: reason.into(),
        }
    }
}

/// A single venue's failure during a multi-venue fan-out.
#[derive(Debug)]
pub struct VenueFailure {
    /// Display name of the exchange that failed.
    pub exchange: String,
    /// The failure it produced.
    pub error: Error,
}

impl std::fmt::Display for VenueFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.exchange, self.error)
    }
}

fn format_failures(failures: &[VenueFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by the broker's multi-venue operations.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("no exchanges registered with the broker")]
    NoExchanges,

    /// Every registered venue failed during price discovery. Carries each
    /// venue's individual failure so callers can see who failed and how.
    #[error("all exchanges failed to estimate '{symbol}': {}", format_failures(.failures))]
    AllExchangesFailed {
        symbol: String,
        failures: Vec<VenueFailure>,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Broker(#[from] BrokerError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_errors_carry_default_messages() {
        assert_eq!(
            ExchangeError::InsufficientLiquidity.to_string(),
            "insufficient liquidity in order book to fill order"
        );
        assert_eq!(
            ExchangeError::RateLimitExceeded.to_string(),
            "the exchange's API rate limit was exceeded"
        );
        assert_eq!(
            ExchangeError::InsufficientFunds.to_string(),
            "insufficient funds in account to execute order"
        );
    }

    #[test]
    fn pair_does_not_exist_names_venue_and_symbol() {
        let err = ExchangeError::PairDoesNotExist {
            exchange: "Binance".into(),
            symbol: "DOGEUSD".into(),
        };
        assert_eq!(
            err.to_string(),
            "trading pair 'DOGEUSD' not found on 'Binance'"
        );
    }

    #[test]
    fn aggregated_failure_names_every_venue() {
        let err = BrokerError::AllExchangesFailed {
            symbol: "BTCUSD".into(),
            failures: vec![
                VenueFailure {
                    exchange: "Binance".into(),
                    error: ExchangeError::RateLimitExceeded.into(),
                },
                VenueFailure {
                    exchange: "Kraken Futures".into(),
                    error: ExchangeError::bad_response("HTTP 502").into(),
                },
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("Binance: the exchange's API rate limit was exceeded"));
        assert!(msg.contains("Kraken Futures: the exchange returned a bad response: HTTP 502"));
    }
}
