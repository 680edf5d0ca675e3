//! # homestay-cli: Calculator on the Command Line
//!
//! Provides the `homestay` command, which runs the derived-value
//! calculator without the API service.
//!
//! ## Subcommands
//!
//! - `homestay quote`: nights, GST, and total for a stay.
//! - `homestay compliance`: status of a document on a given day.
//! - `homestay occupancy`: occupancy breakdown of a rooms export.
//! - `homestay revenue`: payment totals of a payments export.
//!
//! ```bash
//! homestay quote --rate 3000 --check-in 2024-06-10 --check-out 2024-06-13
//! homestay compliance --issue 2023-07-01 --expiry 2024-07-01 --today 2024-06-10
//! homestay --json occupancy --rooms rooms.json
//! ```
//!
//! Exports may be a bare JSON array or the API's `{"count", "results"}`
//! list envelope.

pub mod compliance;
pub mod quote;
pub mod report;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    homestay_core::parse_date(value).map_err(|e| e.to_string())
}

/// Print `report` as pretty JSON or through its text renderer.
pub fn emit<T: Serialize>(report: &T, json: bool, text: impl Fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", text(report));
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Export<T> {
    Envelope { results: Vec<T> },
    Rows(Vec<T>),
}

/// Read rows from a JSON export file.
pub fn load_export<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let export: Export<T> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    let rows = match export {
        Export::Envelope { results } => results,
        Export::Rows(rows) => rows,
    };
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded export");
    Ok(rows)
}
