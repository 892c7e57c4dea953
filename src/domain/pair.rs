//! Trading pair normalized across venues.

use crate::domain::error::DomainError;

/// A trading pair with normalized base and quote symbols, plus the symbol the
/// owning venue expects in API calls.
///
/// The same market can carry wildly different native symbols across venues
/// (Kraken Futures calls BTC/USD "PF_XBTUSD"); `base` and `quote` are the
/// portable identity, `exchange_symbol` is opaque outside the owning
/// exchange client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    base: String,
    quote: String,
    exchange_symbol: String,
}

impl Pair {
    /// Creates a pair, validating that base and quote are non-empty,
    /// uppercase, and distinct.
    pub fn try_new(
        base: impl Into<String>,
        quote: impl Into<String>,
        exchange_symbol: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let base = base.into();
        let quote = quote.into();

        if base.is_empty() {
            return Err(DomainError::EmptyAssetSymbol { field: "base" });
        }
        if quote.is_empty() {
            return Err(DomainError::EmptyAssetSymbol { field: "quote" });
        }
        for symbol in [&base, &quote] {
            if symbol.chars().any(|c| c.is_ascii_lowercase()) {
                return Err(DomainError::AssetNotUppercase {
                    symbol: symbol.clone(),
                });
            }
        }
        if base == quote {
            return Err(DomainError::IdenticalAssets { symbol: base });
        }

        Ok(Self {
            base,
            quote,
            exchange_symbol: exchange_symbol.into(),
        })
    }

    /// Base asset symbol, e.g. "BTC".
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote asset symbol, e.g. "USD".
    #[must_use]
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// The venue-native symbol to use when querying the owning exchange.
    #[must_use]
    pub fn exchange_symbol(&self) -> &str {
        &self.exchange_symbol
    }

    /// Whether `symbol` is this pair's base and quote concatenated
    /// ("BTCUSD" matches base "BTC", quote "USD").
    #[must_use]
    pub fn matches_base_quote(&self, symbol: &str) -> bool {
        symbol.len() == self.base.len() + self.quote.len()
            && symbol.starts_with(&self.base)
            && symbol.ends_with(&self.quote)
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_pair_is_accepted() {
        let pair = Pair::try_new("BTC", "USD", "pi_xbtusd").unwrap();
        assert_eq!(pair.base(), "BTC");
        assert_eq!(pair.quote(), "USD");
        assert_eq!(pair.exchange_symbol(), "pi_xbtusd");
        assert_eq!(pair.to_string(), "BTC/USD");
    }

    #[test]
    fn empty_base_is_rejected() {
        let err = Pair::try_new("", "USD", "x").unwrap_err();
        assert!(matches!(
            err,
            DomainError::EmptyAssetSymbol { field: "base" }
        ));
    }

    #[test]
    fn lowercase_quote_is_rejected() {
        let err = Pair::try_new("BTC", "usd", "btcusd").unwrap_err();
        assert!(matches!(err, DomainError::AssetNotUppercase { .. }));
    }

    #[test]
    fn identical_base_and_quote_are_rejected() {
        let err = Pair::try_new("BTC", "BTC", "BTCBTC").unwrap_err();
        assert!(matches!(err, DomainError::IdenticalAssets { .. }));
    }

    #[test]
    fn digit_bearing_symbols_are_valid() {
        // 1INCH and similar listings are uppercase but not alphabetic
        assert!(Pair::try_new("1INCH", "USDT", "1INCHUSDT").is_ok());
    }

    #[test]
    fn matches_base_quote_requires_exact_concatenation() {
        let pair = Pair::try_new("BTC", "USD", "PF_XBTUSD").unwrap();
        assert!(pair.matches_base_quote("BTCUSD"));
        assert!(!pair.matches_base_quote("BTCUSDT"));
        assert!(!pair.matches_base_quote("BTC"));
    }
}
