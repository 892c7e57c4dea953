//! Market order results.

use rust_decimal::Decimal;

use super::error::DomainError;
use super::money::{Price, Volume};
use super::pair::Pair;

/// Unique identifier assigned to an order by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(pub String);

impl OrderId {
    /// Create a new OrderId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl OrderSide {
    /// Canonical uppercase form used by most venue APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fill at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    price: Price,
    quantity: Volume,
}

impl Fill {
    /// Creates a new fill.
    #[must_use]
    pub const fn new(price: Price, quantity: Volume) -> Self {
        Self { price, quantity }
    }

    /// Price this portion filled at.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Quantity filled at this price.
    #[must_use]
    pub const fn quantity(&self) -> Volume {
        self.quantity
    }
}

/// The result of an executed market order.
///
/// Partial fills are legal and surfaced as-is: the fill quantities may sum to
/// less than `requested_size`, never more.
#[derive(Debug, Clone)]
pub struct MarketOrder {
    order_id: OrderId,
    pair: Pair,
    side: OrderSide,
    requested_size: Volume,
    /// Fills in execution order.
    fills: Vec<Fill>,
}

impl MarketOrder {
    /// Creates an order result, validating the fill invariant.
    pub fn try_new(
        order_id: OrderId,
        pair: Pair,
        side: OrderSide,
        requested_size: Volume,
        fills: Vec<Fill>,
    ) -> Result<Self, DomainError> {
        if requested_size <= Decimal::ZERO {
            return Err(DomainError::NonPositiveOrderSize {
                size: requested_size,
            });
        }
        let filled: Volume = fills.iter().map(Fill::quantity).sum();
        if filled > requested_size {
            return Err(DomainError::OverFilled {
                filled,
                requested: requested_size,
            });
        }

        Ok(Self {
            order_id,
            pair,
            side,
            requested_size,
            fills,
        })
    }

    /// Venue-assigned order ID.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// The pair the order traded.
    #[must_use]
    pub const fn pair(&self) -> &Pair {
        &self.pair
    }

    /// Buy or sell.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Size the caller asked for.
    #[must_use]
    pub const fn requested_size(&self) -> Volume {
        self.requested_size
    }

    /// Fills in execution order.
    #[must_use]
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Total quantity actually filled.
    #[must_use]
    pub fn filled(&self) -> Volume {
        self.fills.iter().map(Fill::quantity).sum()
    }

    /// Whether the order filled completely.
    #[must_use]
    pub fn is_fully_filled(&self) -> bool {
        self.filled() == self.requested_size
    }

    /// Size-weighted mean of the fill prices, or `None` if nothing filled.
    #[must_use]
    pub fn average_price(&self) -> Option<Price> {
        let filled = self.filled();
        if filled.is_zero() {
            return None;
        }
        let notional: Decimal = self.fills.iter().map(|f| f.price * f.quantity).sum();
        Some(notional / filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> Pair {
        Pair::try_new("ADA", "EUR", "ADAEUR").unwrap()
    }

    #[test]
    fn average_price_is_size_weighted() {
        let order = MarketOrder::try_new(
            OrderId::new("12345"),
            pair(),
            OrderSide::Buy,
            dec!(100),
            vec![
                Fill::new(dec!(0.5481), dec!(80)),
                Fill::new(dec!(0.5482), dec!(20)),
            ],
        )
        .unwrap();

        assert_eq!(order.filled(), dec!(100));
        assert!(order.is_fully_filled());
        assert_eq!(order.average_price(), Some(dec!(0.54812)));
    }

    #[test]
    fn partial_fill_is_surfaced_not_hidden() {
        let order = MarketOrder::try_new(
            OrderId::new("12346"),
            pair(),
            OrderSide::Buy,
            dec!(100),
            vec![Fill::new(dec!(0.5481), dec!(40))],
        )
        .unwrap();

        assert_eq!(order.filled(), dec!(40));
        assert!(!order.is_fully_filled());
        assert_eq!(order.average_price(), Some(dec!(0.5481)));
    }

    #[test]
    fn unfilled_order_has_no_average_price() {
        let order = MarketOrder::try_new(
            OrderId::new("12347"),
            pair(),
            OrderSide::Sell,
            dec!(5),
            vec![],
        )
        .unwrap();

        assert_eq!(order.filled(), Decimal::ZERO);
        assert_eq!(order.average_price(), None);
    }

    #[test]
    fn over_filled_order_is_rejected() {
        let err = MarketOrder::try_new(
            OrderId::new("12348"),
            pair(),
            OrderSide::Buy,
            dec!(10),
            vec![Fill::new(dec!(0.5481), dec!(11))],
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::OverFilled { .. }));
    }

    #[test]
    fn non_positive_requested_size_is_rejected() {
        let err = MarketOrder::try_new(
            OrderId::new("12349"),
            pair(),
            OrderSide::Buy,
            dec!(0),
            vec![],
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::NonPositiveOrderSize { .. }));
    }
}
