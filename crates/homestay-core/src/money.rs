//! # Money
//!
//! Amounts are carried as [`Decimal`] in Indian Rupees. Arithmetic never
//! rounds; rounding to paise (2 dp, midpoint away from zero) happens here,
//! at the display boundary.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places in the currency minor unit (paise).
pub const CURRENCY_SCALE: u32 = 2;

/// Round an amount to the currency minor unit, midpoint away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CURRENCY_SCALE);
    rounded
}

/// Format an amount as Indian Rupees with Indian digit grouping.
///
/// The last three integer digits form one group and every two digits
/// before them form another: `106200` renders as `₹1,06,200.00`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_currency(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = rounded.abs().to_string();
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    format!("{sign}₹{}.{frac_part}", group_indian(int_part))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn small_amounts_have_no_separator() {
        assert_eq!(format_inr(dec("0")), "₹0.00");
        assert_eq!(format_inr(dec("999")), "₹999.00");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(format_inr(dec("1000")), "₹1,000.00");
        assert_eq!(format_inr(dec("10620")), "₹10,620.00");
        assert_eq!(format_inr(dec("106200")), "₹1,06,200.00");
        assert_eq!(format_inr(dec("12345678.9")), "₹1,23,45,678.90");
    }

    #[test]
    fn rounds_midpoint_away_from_zero() {
        assert_eq!(round_currency(dec("2.345")), dec("2.35"));
        assert_eq!(round_currency(dec("-2.345")), dec("-2.35"));
        assert_eq!(format_inr(dec("0.005")), "₹0.01");
    }

    #[test]
    fn negative_amounts_carry_sign() {
        assert_eq!(format_inr(dec("-1500.5")), "-₹1,500.50");
        assert_eq!(format_inr(dec("-0.001")), "₹0.00");
    }

    #[test]
    fn round_currency_always_has_two_places() {
        assert_eq!(round_currency(dec("7")).to_string(), "7.00");
        assert_eq!(round_currency(dec("7.1")).to_string(), "7.10");
    }

    proptest! {
        #[test]
        fn grouping_preserves_digits(n in 0u64..10_000_000_000u64) {
            let formatted = format_inr(Decimal::from(n));
            let digits: String = formatted
                .trim_start_matches('₹')
                .trim_end_matches(".00")
                .chars()
                .filter(|c| *c != ',')
                .collect();
            prop_assert_eq!(digits, n.to_string());
        }
    }
}
