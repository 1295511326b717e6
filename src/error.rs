//! Error handling for robin-pnl
//!
//! Defines the typed errors the importer and config layer can raise and
//! establishes a unified Result type using anyhow for context chaining.

use thiserror::Error;

/// Logical ledger fields the importer has to locate in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerField {
    Date,
    Side,
    Symbol,
    Quantity,
    Price,
}

impl LedgerField {
    pub const ALL: [LedgerField; 5] = [
        LedgerField::Date,
        LedgerField::Side,
        LedgerField::Symbol,
        LedgerField::Quantity,
        LedgerField::Price,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerField::Date => "date",
            LedgerField::Side => "type",
            LedgerField::Symbol => "symbol",
            LedgerField::Quantity => "quantity",
            LedgerField::Price => "price",
        }
    }
}

impl std::fmt::Display for LedgerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error types for P&L operations
#[derive(Error, Debug)]
pub enum PnlError {
    #[error("missing column: no {field} column found (tried: {tried})")]
    MissingColumn { field: LedgerField, tried: String },

    #[error("unparseable amount in row {row}")]
    AmountParse {
        row: usize,
        #[source]
        source: AmountParseError,
    },

    #[error("config error: {0}")]
    Config(String),
}

/// Failure to turn a ledger cell into a decimal amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,

    #[error("invalid amount: {0:?}")]
    Invalid(String),
}

/// Result type alias for P&L operations
pub type Result<T> = anyhow::Result<T>;
