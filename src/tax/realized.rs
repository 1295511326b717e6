use anyhow::Result;
use chrono::Datelike;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::cost_basis::{FifoMatcher, MatchResult, Term, LONG_TERM_DAYS};
use crate::models::Transaction;

/// Knobs for a matching run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Holding days that must be exceeded for a long-term classification
    pub long_term_days: i64,
    /// Let sales from years before the reference year consume lots first
    pub include_prior_sells: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            long_term_days: LONG_TERM_DAYS,
            include_prior_sells: false,
        }
    }
}

/// Realized gains for one symbol, split by term
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionSummary {
    pub short_term_gain_loss: Decimal,
    pub long_term_gain_loss: Decimal,
    pub short_term_count: usize,
    pub long_term_count: usize,
    /// Sales that could not be fully matched against purchase history
    pub partial_match_warning: usize,
    pub unmatched_quantity: Decimal,
}

impl PositionSummary {
    pub fn record(&mut self, result: &MatchResult) {
        match result.term {
            Term::Short => {
                self.short_term_gain_loss += result.gain_loss;
                self.short_term_count += 1;
            }
            Term::Long => {
                self.long_term_gain_loss += result.gain_loss;
                self.long_term_count += 1;
            }
        }
    }

    pub fn record_unmatched(&mut self, quantity: Decimal) {
        self.partial_match_warning += 1;
        self.unmatched_quantity += quantity;
    }

    pub fn total_gain_loss(&self) -> Decimal {
        self.short_term_gain_loss + self.long_term_gain_loss
    }

    fn merge(&mut self, other: &PositionSummary) {
        self.short_term_gain_loss += other.short_term_gain_loss;
        self.long_term_gain_loss += other.long_term_gain_loss;
        self.short_term_count += other.short_term_count;
        self.long_term_count += other.long_term_count;
        self.partial_match_warning += other.partial_match_warning;
        self.unmatched_quantity += other.unmatched_quantity;
    }
}

/// Matching output for a single symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPnl {
    pub summary: PositionSummary,
    pub matches: Vec<MatchResult>,
}

/// Realized P&L for every symbol sold in a calendar year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlReport {
    pub year: i32,
    pub positions: BTreeMap<String, PositionSummary>,
    /// Every lot match, in the order it was realized (by symbol, then sale date)
    #[serde(skip)]
    pub matches: Vec<MatchResult>,
}

impl PnlReport {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn totals(&self) -> PositionSummary {
        self.positions
            .values()
            .fold(PositionSummary::default(), |mut acc, summary| {
                acc.merge(summary);
                acc
            })
    }
}

/// Compute realized P&L per symbol for sales made in `reference_year`.
pub fn compute_pnl(
    transactions: &[Transaction],
    reference_year: i32,
) -> Result<BTreeMap<String, PositionSummary>> {
    Ok(compute_pnl_report(transactions, reference_year, &MatchOptions::default())?.positions)
}

/// Compute the full report (summaries plus individual lot matches).
///
/// Purchases are never year-filtered: the whole history is FIFO supply.
/// Transactions are indexed by symbol once, so each symbol only walks its
/// own purchases.
pub fn compute_pnl_report(
    transactions: &[Transaction],
    reference_year: i32,
    options: &MatchOptions,
) -> Result<PnlReport> {
    let mut by_symbol: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions {
        by_symbol.entry(tx.symbol.as_str()).or_default().push(tx);
    }

    let mut positions = BTreeMap::new();
    let mut matches = Vec::new();

    for (symbol, txs) in by_symbol {
        if let Some(pnl) = match_symbol(symbol, &txs, reference_year, options)? {
            positions.insert(symbol.to_string(), pnl.summary);
            matches.extend(pnl.matches);
        }
    }

    info!(
        "Computed realized P&L for {} symbol(s) in {} ({} lot matches)",
        positions.len(),
        reference_year,
        matches.len()
    );

    Ok(PnlReport {
        year: reference_year,
        positions,
        matches,
    })
}

/// Compute realized P&L for a single symbol.
///
/// Returns `None` when the symbol has no sales in `reference_year`. Lets
/// callers isolate failures symbol by symbol.
pub fn compute_symbol_pnl<'a, I>(
    symbol: &str,
    transactions: I,
    reference_year: i32,
    options: &MatchOptions,
) -> Result<Option<SymbolPnl>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let txs: Vec<&Transaction> = transactions
        .into_iter()
        .filter(|tx| tx.symbol == symbol)
        .collect();
    match_symbol(symbol, &txs, reference_year, options)
}

fn match_symbol(
    symbol: &str,
    txs: &[&Transaction],
    reference_year: i32,
    options: &MatchOptions,
) -> Result<Option<SymbolPnl>> {
    let sells: Vec<&Transaction> = txs
        .iter()
        .copied()
        .filter(|tx| tx.is_sell())
        .filter(|tx| {
            let year = tx.date.year();
            year == reference_year || (options.include_prior_sells && year < reference_year)
        })
        .sorted_by_key(|tx| (tx.date, tx.row))
        .collect();

    if !sells.iter().any(|tx| tx.date.year() == reference_year) {
        return Ok(None);
    }

    let mut matcher = FifoMatcher::new(symbol).with_long_term_days(options.long_term_days);
    for buy in txs
        .iter()
        .filter(|tx| tx.is_buy())
        .sorted_by_key(|tx| (tx.date, tx.row))
    {
        matcher.add_purchase(buy);
    }

    let mut summary = PositionSummary::default();
    let mut matches = Vec::new();

    for sell in sells {
        let sale = matcher.match_sale(sell)?;
        if sell.date.year() != reference_year {
            continue;
        }

        if sale.is_partial() {
            warn!(
                "{}: sale of {} on {} matched only {} unit(s) against purchase history; {} excluded from P&L",
                symbol,
                sell.quantity,
                sell.date,
                sale.matched_quantity(),
                sale.unmatched_quantity
            );
            summary.record_unmatched(sale.unmatched_quantity);
        }
        for result in &sale.matches {
            summary.record(result);
        }
        matches.extend(sale.matches);
    }

    debug!(
        "{}: {} unit(s) left in open lots",
        symbol,
        matcher.remaining_quantity()
    );

    Ok(Some(SymbolPnl { summary, matches }))
}
