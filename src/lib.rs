//! robin-pnl - realized P&L from brokerage activity
//!
//! This library imports brokerage activity ledgers, matches sales against
//! purchase lots first-in-first-out, and reports realized gains split into
//! short-term and long-term.

pub mod config;
pub mod error;
pub mod importers;
pub mod models;
pub mod reports;
pub mod tax;
pub mod utils;
