//! Display-currency conversion for prices.
//!
//! Catalog prices are stored in the base currency unit. The storefront shows
//! them in rupees using a fixed multiplier; the converted value is never
//! stored or used in arithmetic (cart totals stay in the base unit).

use rust_decimal::{Decimal, RoundingStrategy};

/// Fixed base-to-display multiplier (82.23).
pub const DISPLAY_CONVERSION_RATE: Decimal = Decimal::from_parts(8223, 0, 0, false, 2);

/// Symbol prefixed to display prices.
pub const DISPLAY_CURRENCY_SYMBOL: &str = "₹";

/// Convert a base-currency amount to the display currency, rounded to cents.
#[must_use]
pub fn display_amount(base: Decimal) -> Decimal {
    (base * DISPLAY_CONVERSION_RATE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a base-currency amount for display (e.g. `₹657.02`).
#[must_use]
pub fn display_price(base: Decimal) -> String {
    format!("{DISPLAY_CURRENCY_SYMBOL}{:.2}", display_amount(base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_amount() {
        // 7.99 * 82.23 = 657.0177
        assert_eq!(display_amount(Decimal::new(799, 2)), Decimal::new(65702, 2));
    }

    #[test]
    fn test_display_price_keeps_two_places() {
        assert_eq!(display_price(Decimal::ONE), "₹82.23");
        assert_eq!(display_price(Decimal::ZERO), "₹0.00");
    }
}
