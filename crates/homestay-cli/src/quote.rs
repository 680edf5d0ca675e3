//! # Quote CLI: price a stay.
//!
//! ```bash
//! homestay quote --rate 3000 --check-in 2024-06-10 --check-out 2024-06-13
//! homestay quote --rate 2500 --check-in 2024-12-30 --check-out 2025-01-02 --tax-rate 12
//! ```

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use homestay_calc::{check_capacity, quote_stay, StayQuote, DEFAULT_GST_RATE_PERCENT};
use homestay_core::format_inr;
use rust_decimal::Decimal;

use crate::{emit, parse_date_arg};

/// Quote subcommand arguments.
#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Nightly room rate in rupees.
    #[arg(long)]
    pub rate: Decimal,

    /// Arrival date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg)]
    pub check_in: NaiveDate,

    /// Departure date (YYYY-MM-DD). Must be after the arrival date.
    #[arg(long, value_parser = parse_date_arg)]
    pub check_out: NaiveDate,

    /// GST rate in percent.
    #[arg(long, default_value_t = DEFAULT_GST_RATE_PERCENT)]
    pub tax_rate: Decimal,

    /// Party size, checked against --max-occupancy when both are given.
    #[arg(long, requires = "max_occupancy")]
    pub guests: Option<u32>,

    /// Maximum occupancy of the room.
    #[arg(long)]
    pub max_occupancy: Option<u32>,
}

/// Price the stay described by `args`.
pub fn build_quote(args: &QuoteArgs) -> Result<StayQuote> {
    if let (Some(guests), Some(max)) = (args.guests, args.max_occupancy) {
        check_capacity(guests, max)?;
    }
    Ok(quote_stay(args.rate, args.check_in, args.check_out, args.tax_rate)?)
}

/// Human-readable quote.
pub fn render_quote(quote: &StayQuote) -> String {
    format!(
        "Stay:      {} to {} ({} night{})\n\
         Rate:      {} per night\n\
         Subtotal:  {}\n\
         GST ({}%): {}\n\
         Total:     {}\n",
        quote.check_in,
        quote.check_out,
        quote.nights,
        if quote.nights == 1 { "" } else { "s" },
        format_inr(quote.rate_per_night),
        format_inr(quote.cost.subtotal),
        quote.tax_rate_percent,
        format_inr(quote.cost.tax),
        format_inr(quote.cost.total),
    )
}

/// Execute the quote subcommand.
pub fn run_quote(args: &QuoteArgs, json: bool) -> Result<u8> {
    let quote = build_quote(args)?;
    emit(&quote, json, render_quote)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(rate: &str, check_in: &str, check_out: &str) -> QuoteArgs {
        QuoteArgs {
            rate: rate.parse().unwrap(),
            check_in: parse_date_arg(check_in).unwrap(),
            check_out: parse_date_arg(check_out).unwrap(),
            tax_rate: DEFAULT_GST_RATE_PERCENT,
            guests: None,
            max_occupancy: None,
        }
    }

    #[test]
    fn three_nights_at_3000() {
        let quote = build_quote(&args("3000", "2024-06-10", "2024-06-13")).unwrap();
        assert_eq!(quote.nights, 3);
        assert_eq!(quote.cost.total, Decimal::from(10620));
        let text = render_quote(&quote);
        assert!(text.contains("(3 nights)"));
        assert!(text.contains("₹10,620.00"));
    }

    #[test]
    fn single_night_is_singular() {
        let quote = build_quote(&args("1000", "2024-06-10", "2024-06-11")).unwrap();
        assert!(render_quote(&quote).contains("(1 night)"));
    }

    #[test]
    fn same_day_checkout_is_rejected() {
        assert!(build_quote(&args("1000", "2024-06-10", "2024-06-10")).is_err());
    }

    #[test]
    fn over_capacity_is_rejected() {
        let mut a = args("1000", "2024-06-10", "2024-06-12");
        a.guests = Some(3);
        a.max_occupancy = Some(2);
        assert!(build_quote(&a).is_err());
    }
}
