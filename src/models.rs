use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction side (buy or sell)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

/// One ledger entry (a buy or sell of a security)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub symbol: String,
    pub side: Side,
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub price: Decimal,
    /// Position in the source ledger; breaks same-day ties when matching.
    /// Transactions built without one keep their slice order.
    pub row: usize,
}

impl Transaction {
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        date: NaiveDate,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            date,
            quantity,
            price,
            row: 0,
        }
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }
}
