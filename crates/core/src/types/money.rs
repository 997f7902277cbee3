//! Money formatting and delivery charges.
//!
//! Amounts are held as [`Decimal`] because the API returns them either as
//! JSON strings (`"1499.00"`) or as numbers. All storefront prices are in
//! Indian rupees and are rendered in the `en-US` currency style, so
//! `1234.5` displays as `₹1,234.50`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Flat delivery charge added to any non-empty order.
pub const DELIVERY_CHARGE: Decimal = Decimal::from_parts(280, 0, 0, false, 0);

const CURRENCY_SYMBOL: &str = "₹";

/// Format an amount as rupees with thousands separators and two decimals.
///
/// Halves round away from zero.
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    format!("{sign}{CURRENCY_SYMBOL}{}.{fraction}", group_thousands(whole))
}

/// Delivery charge for a cart with the given subtotal.
///
/// Empty carts pay nothing.
#[must_use]
pub fn delivery_charge_for(subtotal: Decimal) -> Decimal {
    if subtotal > Decimal::ZERO {
        DELIVERY_CHARGE
    } else {
        Decimal::ZERO
    }
}

fn group_thousands(whole: &str) -> String {
    let len = whole.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, ch) in whole.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap_or_default()
    }

    #[test]
    fn test_format_small_amounts() {
        assert_eq!(format_inr(Decimal::ZERO), "₹0.00");
        assert_eq!(format_inr(dec("5")), "₹5.00");
        assert_eq!(format_inr(dec("99.9")), "₹99.90");
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(format_inr(dec("1234.5")), "₹1,234.50");
        assert_eq!(format_inr(dec("100000")), "₹100,000.00");
        assert_eq!(format_inr(dec("1234567.891")), "₹1,234,567.89");
    }

    #[test]
    fn test_format_rounds_half_away_from_zero() {
        assert_eq!(format_inr(dec("0.005")), "₹0.01");
        assert_eq!(format_inr(dec("2.345")), "₹2.35");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_inr(dec("-1500")), "-₹1,500.00");
    }

    #[test]
    fn test_delivery_charge_only_for_non_empty_subtotal() {
        assert_eq!(delivery_charge_for(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(delivery_charge_for(dec("0.01")), dec("280"));
        assert_eq!(DELIVERY_CHARGE, dec("280"));
    }
}
