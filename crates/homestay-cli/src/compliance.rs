//! # Compliance CLI: status of a document on a given day.
//!
//! ```bash
//! homestay compliance --issue 2023-07-01 --expiry 2024-07-01
//! homestay compliance --issue 2023-07-01 --expiry 2024-07-01 --reminder-days 60 --today 2024-05-15
//! ```

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;
use homestay_calc::{DocumentValidity, DEFAULT_REMINDER_DAYS};
use homestay_core::{Clock, ComplianceStatus, SystemClock};
use serde::Serialize;

use crate::{emit, parse_date_arg};

/// Compliance subcommand arguments.
#[derive(Args, Debug)]
pub struct ComplianceArgs {
    /// Issue date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg)]
    pub issue: NaiveDate,

    /// Expiry date (YYYY-MM-DD). Omit for documents that never expire.
    #[arg(long, value_parser = parse_date_arg)]
    pub expiry: Option<NaiveDate>,

    /// Days before expiry at which renewal becomes due.
    #[arg(long, default_value_t = DEFAULT_REMINDER_DAYS)]
    pub reminder_days: u32,

    /// Evaluate as of this date instead of today.
    #[arg(long, value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,
}

/// A document's status on one day.
#[derive(Debug, Serialize)]
pub struct ComplianceReport {
    pub as_of: NaiveDate,
    pub status: ComplianceStatus,
    pub days_until_expiry: Option<i64>,
    pub renewal_due_on: Option<NaiveDate>,
}

/// Evaluate the document described by `args` as of `today`.
pub fn evaluate(args: &ComplianceArgs, today: NaiveDate) -> Result<ComplianceReport> {
    if args.reminder_days == 0 {
        bail!("--reminder-days must be at least 1");
    }
    let validity = DocumentValidity::new(args.issue, args.expiry, args.reminder_days)?;
    Ok(ComplianceReport {
        as_of: today,
        status: validity.status_on(today),
        days_until_expiry: validity.days_until_expiry(today),
        renewal_due_on: validity.renewal_due_on(),
    })
}

pub fn render_compliance(report: &ComplianceReport) -> String {
    let mut out = format!("Status:  {} (as of {})\n", report.status, report.as_of);
    match report.days_until_expiry {
        Some(days) if days < 0 => out.push_str(&format!("Expired: {} days ago\n", -days)),
        Some(days) => out.push_str(&format!("Expires: in {days} days\n")),
        None => out.push_str("Expires: never\n"),
    }
    if let Some(due) = report.renewal_due_on {
        out.push_str(&format!("Renew:   from {due}\n"));
    }
    out
}

/// Execute the compliance subcommand.
pub fn run_compliance(args: &ComplianceArgs, json: bool) -> Result<u8> {
    let today = args.today.unwrap_or_else(|| SystemClock.today());
    let report = evaluate(args, today)?;
    emit(&report, json, render_compliance)?;
    Ok(0)
}
