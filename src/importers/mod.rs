// Import module - brokerage activity ledgers (CSV)

pub mod activity_csv;
pub mod amount;

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::info;

use crate::config::Config;

pub use activity_csv::{
    decode_activity_bytes, inspect_activity, parse_activity_date, ActivityImport, ActivityReader,
    ColumnMapping, ColumnSynonyms, FileInspection, ImportStats, ResolvedColumn, SideClassifier,
};
pub use amount::{parse_amount, NumericPolicy};

impl ActivityReader {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.columns.clone(),
            config.classification.classifier()?,
            config.parsing.numeric,
        ))
    }
}

/// Import an activity ledger, checking the file type by extension
pub fn import_file<P: AsRef<Path>>(file_path: P, config: &Config) -> Result<ActivityImport> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("File has no extension"))?
        .to_lowercase();

    info!("Importing activity file: {:?} (type: {})", path, extension);

    match extension.as_str() {
        "csv" | "txt" => ActivityReader::from_config(config)?.read_path(path),
        _ => Err(anyhow!(
            "Unsupported file format: {}. Supported formats: .csv, .txt",
            extension
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_extension() {
        let err = import_file("activity.xlsx", &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));

        let err = import_file("activity", &Config::default()).unwrap_err();
        assert!(err.to_string().contains("no extension"));
    }

    #[test]
    fn test_imports_csv_with_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        std::fs::write(&path, "Date,Ticker,Type,Shares,Price\n2024-01-01,msft,buy,3,$10\n").unwrap();

        let import = import_file(&path, &Config::default()).unwrap();
        assert_eq!(import.transactions.len(), 1);
        assert_eq!(import.transactions[0].symbol, "MSFT");
        assert_eq!(import.encoding, "UTF-8");
    }
}
