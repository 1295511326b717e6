use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser, Debug)]
#[command(name = "robin-pnl")]
#[command(
    version,
    about = "Realized short/long-term P&L from brokerage activity using FIFO tax lots"
)]
#[command(
    long_about = "Reads a brokerage activity export (e.g. Robinhood Activity CSV), matches every sale of the reporting year against the oldest remaining purchase lots, and reports realized gains split into short-term and long-term."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to a TOML config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate realized P&L for a calendar year
    Pnl {
        /// Path to the activity CSV file
        file: PathBuf,

        /// Reporting year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Show every lot match, not just the per-symbol summary
        #[arg(short, long)]
        detail: bool,

        /// Export the per-symbol summary to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Fail on unparseable quantities/prices instead of using 0
        #[arg(long)]
        strict: bool,

        /// Let sales from earlier years consume lots before the reporting year
        #[arg(long)]
        include_prior_sells: bool,
    },

    /// Inspect a CSV file's headers and resolved column mapping
    Inspect {
        /// Path to the CSV file
        file: PathBuf,
    },
}
