//! # Report CLI: aggregate JSON exports.
//!
//! `occupancy` reads a rooms export and counts rooms per status.
//! `revenue` reads a payments export and totals amounts per status.
//! Only the fields the aggregation needs are read; the rest are ignored.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use homestay_calc::{OccupancyBreakdown, PaymentTotals};
use homestay_core::{format_inr, PaymentStatus, RoomStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{emit, load_export};

/// Occupancy subcommand arguments.
#[derive(Args, Debug)]
pub struct OccupancyArgs {
    /// Rooms export (JSON array or list envelope).
    #[arg(long)]
    pub rooms: PathBuf,
}

/// Revenue subcommand arguments.
#[derive(Args, Debug)]
pub struct RevenueArgs {
    /// Payments export (JSON array or list envelope).
    #[arg(long)]
    pub payments: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RoomRow {
    status: RoomStatus,
}

#[derive(Debug, Deserialize)]
struct PaymentRow {
    status: PaymentStatus,
    #[serde(default)]
    total: Option<Decimal>,
    #[serde(default)]
    amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct OccupancyReport {
    #[serde(flatten)]
    pub breakdown: OccupancyBreakdown,
    pub occupancy_rate: u8,
}

impl From<OccupancyBreakdown> for OccupancyReport {
    fn from(breakdown: OccupancyBreakdown) -> Self {
        Self {
            occupancy_rate: breakdown.rate(),
            breakdown,
        }
    }
}

pub fn render_occupancy(report: &OccupancyReport) -> String {
    let b = &report.breakdown;
    format!(
        "Rooms:       {}\n\
         Occupied:    {}\n\
         Available:   {}\n\
         Maintenance: {}\n\
         Occupancy:   {}%\n",
        b.total, b.occupied, b.available, b.maintenance, report.occupancy_rate
    )
}

#[derive(Debug, Serialize)]
pub struct RevenueReport {
    #[serde(flatten)]
    pub totals: PaymentTotals,
    pub revenue_display: String,
    pub pending_display: String,
    pub refunded_display: String,
}

impl From<PaymentTotals> for RevenueReport {
    fn from(totals: PaymentTotals) -> Self {
        Self {
            revenue_display: format_inr(totals.revenue),
            pending_display: format_inr(totals.pending),
            refunded_display: format_inr(totals.refunded),
            totals,
        }
    }
}

pub fn render_revenue(report: &RevenueReport) -> String {
    let t = &report.totals;
    format!(
        "Revenue:  {} ({} completed)\n\
         Pending:  {} ({} pending)\n\
         Refunded: {} ({} refunded)\n\
         Failed:   {}\n",
        report.revenue_display,
        t.completed_count,
        report.pending_display,
        t.pending_count,
        report.refunded_display,
        t.refunded_count,
        t.failed_count,
    )
}

/// Count rooms per status in the export at `args.rooms`.
pub fn occupancy_report(args: &OccupancyArgs) -> Result<OccupancyReport> {
    let rows: Vec<RoomRow> = load_export(&args.rooms)?;
    Ok(OccupancyBreakdown::from_statuses(rows.into_iter().map(|r| r.status)).into())
}

/// Total payments per status in the export at `args.payments`.
///
/// Each row's `total` is used, falling back to `amount` for exports
/// that predate GST being recorded separately.
pub fn revenue_report(args: &RevenueArgs) -> Result<RevenueReport> {
    let rows: Vec<PaymentRow> = load_export(&args.payments)?;
    let pairs = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let value = row
                .total
                .or(row.amount)
                .with_context(|| format!("payment row {i} has neither total nor amount"))?;
            Ok((row.status, value))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PaymentTotals::from_payments(pairs).into())
}

/// Execute the occupancy subcommand.
pub fn run_occupancy(args: &OccupancyArgs, json: bool) -> Result<u8> {
    let report = occupancy_report(args)?;
    emit(&report, json, render_occupancy)?;
    Ok(0)
}

/// Execute the revenue subcommand.
pub fn run_revenue(args: &RevenueArgs, json: bool) -> Result<u8> {
    let report = revenue_report(args)?;
    emit(&report, json, render_revenue)?;
    Ok(0)
}
