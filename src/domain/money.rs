//! Monetary types for price and volume representation.

use rust_decimal::Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Volume represented as a Decimal for precision.
pub type Volume = Decimal;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_and_volume_are_decimal() {
        let price: Price = dec!(71725.50);
        let volume: Volume = dec!(0.25);

        assert_eq!(price * volume, dec!(17931.375));
    }
}
