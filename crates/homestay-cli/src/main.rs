//! # homestay CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use homestay_cli::compliance::{run_compliance, ComplianceArgs};
use homestay_cli::quote::{run_quote, QuoteArgs};
use homestay_cli::report::{run_occupancy, run_revenue, OccupancyArgs, RevenueArgs};

/// Homestay calculator.
///
/// Prices stays, derives compliance document status, and aggregates
/// occupancy and revenue from JSON exports of the API.
#[derive(Parser, Debug)]
#[command(name = "homestay", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Nights, GST, and total for a stay.
    Quote(QuoteArgs),

    /// Status of a compliance document on a given day.
    Compliance(ComplianceArgs),

    /// Occupancy breakdown of a rooms export.
    Occupancy(OccupancyArgs),

    /// Payment totals of a payments export.
    Revenue(RevenueArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Quote(args) => run_quote(args, cli.json),
        Commands::Compliance(args) => run_compliance(args, cli.json),
        Commands::Occupancy(args) => run_occupancy(args, cli.json),
        Commands::Revenue(args) => run_revenue(args, cli.json),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
