//! Derived order pricing.
//!
//! Totals are computed once from a cart subtotal and frozen onto the order at
//! submission time; nothing recomputes them afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sales tax rate applied to the subtotal (8%).
#[must_use]
pub fn tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// Flat service fee added to every order ($2.00).
#[must_use]
pub fn service_fee() -> Decimal {
    Decimal::new(200, 2)
}

/// The derived money fields of a cart or order.
///
/// Invariant: `total == subtotal + tax + service_fee`, with tax rounded to
/// the cent before the sum so the identity holds exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of `unit_price * quantity` over the lines.
    pub subtotal: Decimal,
    /// `subtotal * 0.08`, rounded to the cent.
    pub tax: Decimal,
    /// Flat fee, currently $2.00.
    pub service_fee: Decimal,
    /// `subtotal + tax + service_fee`.
    pub total: Decimal,
}

impl OrderTotals {
    /// Derive tax, fee, and total from a subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let tax = (subtotal * tax_rate()).round_dp(2);
        let service_fee = service_fee();
        Self {
            subtotal,
            tax,
            service_fee,
            total: subtotal + tax + service_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_for_the_reference_cart() {
        // 2 x 10.00 + 1 x 5.00
        let totals = OrderTotals::from_subtotal(Decimal::new(2500, 2));
        assert_eq!(totals.subtotal, Decimal::new(2500, 2));
        assert_eq!(totals.tax, Decimal::new(200, 2));
        assert_eq!(totals.service_fee, Decimal::new(200, 2));
        assert_eq!(totals.total, Decimal::new(2900, 2));
    }

    #[test]
    fn tax_is_rounded_to_the_cent() {
        // 10.55 * 0.08 = 0.844 -> 0.84
        let totals = OrderTotals::from_subtotal(Decimal::new(1055, 2));
        assert_eq!(totals.tax, Decimal::new(84, 2));
        assert_eq!(totals.total, totals.subtotal + totals.tax + totals.service_fee);
    }

    #[test]
    fn empty_subtotal_still_carries_the_fee() {
        let totals = OrderTotals::from_subtotal(Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, service_fee());
    }
}
