// Reports module - machine-readable renderings of realized P&L

pub mod realized;

pub use realized::{export_to_csv, matches_to_csv, report_json};
