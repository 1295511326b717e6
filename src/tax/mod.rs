// Tax module - FIFO lot matching and realized short/long-term P&L

pub mod cost_basis;
pub mod realized;

pub use cost_basis::{FifoMatcher, Lot, MatchResult, SaleMatch, Term, LONG_TERM_DAYS};
pub use realized::{
    compute_pnl, compute_pnl_report, compute_symbol_pnl, MatchOptions, PnlReport,
    PositionSummary, SymbolPnl,
};
