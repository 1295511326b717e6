use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Transaction;

/// Holding period (in days) that must be exceeded for a long-term gain
pub const LONG_TERM_DAYS: i64 = 365;

/// Tax term of a realized gain or loss
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Short,
    Long,
}

impl Term {
    /// Long-term only when the holding period is strictly greater than the threshold
    pub fn classify(holding_days: i64, long_term_days: i64) -> Self {
        if holding_days > long_term_days {
            Term::Long
        } else {
            Term::Short
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Short => "SHORT",
            Term::Long => "LONG",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Term::Short => "Short-term",
            Term::Long => "Long-term",
        }
    }
}

/// Unconsumed slice of a purchase
#[derive(Debug, Clone, PartialEq)]
pub struct Lot {
    pub remaining_quantity: Decimal,
    pub unit_cost: Decimal,
    pub acquired_date: NaiveDate,
}

/// Part (or all) of a sale matched against a single lot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub symbol: String,
    pub sell_date: NaiveDate,
    pub acquired_date: NaiveDate,
    pub matched_quantity: Decimal,
    pub sell_price: Decimal,
    pub unit_cost: Decimal,
    pub proceeds: Decimal,
    pub cost: Decimal,
    pub gain_loss: Decimal,
    pub holding_days: i64,
    pub term: Term,
}

/// Outcome of matching one sale against the lot queue
#[derive(Debug, Clone, PartialEq)]
pub struct SaleMatch {
    pub matches: Vec<MatchResult>,
    /// Quantity left over once every lot was exhausted
    pub unmatched_quantity: Decimal,
}

impl SaleMatch {
    pub fn matched_quantity(&self) -> Decimal {
        self.matches.iter().map(|m| m.matched_quantity).sum()
    }

    pub fn is_partial(&self) -> bool {
        self.unmatched_quantity > Decimal::ZERO
    }
}

/// First-in-first-out lot queue for a single symbol.
///
/// Lots are kept in acquisition order; purchases on the same date keep the
/// order they were added in. Consumption is shared across every sale matched
/// through the same matcher, so sales must be fed in date order.
pub struct FifoMatcher {
    symbol: String,
    lots: Vec<Lot>,
    /// Index of the oldest lot that still has quantity
    head: usize,
    long_term_days: i64,
}

impl FifoMatcher {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            lots: Vec::new(),
            head: 0,
            long_term_days: LONG_TERM_DAYS,
        }
    }

    pub fn with_long_term_days(mut self, days: i64) -> Self {
        self.long_term_days = days;
        self
    }

    /// Add a purchase as a new lot, placed after every open lot acquired on or before its date
    pub fn add_purchase(&mut self, tx: &Transaction) {
        if !tx.is_buy() {
            return;
        }

        let open = &self.lots[self.head..];
        let offset = open.partition_point(|lot| lot.acquired_date <= tx.date);
        self.lots.insert(
            self.head + offset,
            Lot {
                remaining_quantity: tx.quantity,
                unit_cost: tx.price,
                acquired_date: tx.date,
            },
        );
    }

    /// Match a sale against the oldest open lots, consuming them
    pub fn match_sale(&mut self, tx: &Transaction) -> Result<SaleMatch> {
        if !tx.is_sell() {
            return Err(anyhow!("Transaction is not a sale"));
        }
        if tx.symbol != self.symbol {
            return Err(anyhow!(
                "Sale of {} cannot be matched against {} lots",
                tx.symbol,
                self.symbol
            ));
        }

        let mut outstanding = tx.quantity;
        let mut matches = Vec::new();

        while outstanding > Decimal::ZERO {
            let Some(lot) = self.lots.get_mut(self.head) else {
                break;
            };
            if lot.remaining_quantity <= Decimal::ZERO {
                self.head += 1;
                continue;
            }

            let quantity = outstanding.min(lot.remaining_quantity);
            let proceeds = quantity * tx.price;
            let cost = quantity * lot.unit_cost;
            let holding_days = (tx.date - lot.acquired_date).num_days();

            let result = MatchResult {
                symbol: tx.symbol.clone(),
                sell_date: tx.date,
                acquired_date: lot.acquired_date,
                matched_quantity: quantity,
                sell_price: tx.price,
                unit_cost: lot.unit_cost,
                proceeds,
                cost,
                gain_loss: proceeds - cost,
                holding_days,
                term: Term::classify(holding_days, self.long_term_days),
            };

            debug!(
                "{}: sell {} @ {} on {} matched with buy @ {} on {} ({} days, {})",
                result.symbol,
                result.matched_quantity,
                result.sell_price,
                result.sell_date,
                result.unit_cost,
                result.acquired_date,
                result.holding_days,
                result.term.as_str()
            );

            lot.remaining_quantity -= quantity;
            outstanding -= quantity;
            if lot.remaining_quantity <= Decimal::ZERO {
                self.head += 1;
            }
            matches.push(result);
        }

        Ok(SaleMatch {
            matches,
            unmatched_quantity: outstanding.max(Decimal::ZERO),
        })
    }

    /// Lots that still hold quantity, oldest first
    pub fn open_lots(&self) -> impl Iterator<Item = &Lot> {
        self.lots[self.head..]
            .iter()
            .filter(|lot| lot.remaining_quantity > Decimal::ZERO)
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.open_lots().map(|lot| lot.remaining_quantity).sum()
    }
}
