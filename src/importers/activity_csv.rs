use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use encoding_rs::{UTF_8, WINDOWS_1252};
use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use super::amount::{parse_amount, NumericPolicy};
use crate::error::{LedgerField, PnlError};
use crate::models::{Side, Transaction};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Accepted header names for each ledger field, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSynonyms {
    pub date: Vec<String>,
    pub side: Vec<String>,
    pub symbol: Vec<String>,
    pub quantity: Vec<String>,
    pub price: Vec<String>,
}

impl Default for ColumnSynonyms {
    fn default() -> Self {
        Self {
            date: names(&["Activity Date", "Date", "Trans Date", "Transaction Date", "date"]),
            side: names(&[
                "Trans Code",
                "Type",
                "Trans Type",
                "Transaction Type",
                "Side",
                "Description",
            ]),
            symbol: names(&["Instrument", "Symbol", "Ticker", "Stock"]),
            quantity: names(&["Quantity", "Qty", "Shares", "Amount"]),
            price: names(&["Price", "Unit Price", "Share Price", "Average Price"]),
        }
    }
}

impl ColumnSynonyms {
    pub fn candidates(&self, field: LedgerField) -> &[String] {
        match field {
            LedgerField::Date => &self.date,
            LedgerField::Side => &self.side,
            LedgerField::Symbol => &self.symbol,
            LedgerField::Quantity => &self.quantity,
            LedgerField::Price => &self.price,
        }
    }

    pub fn validate(&self) -> Result<(), PnlError> {
        for field in LedgerField::ALL {
            if self.candidates(field).is_empty() {
                return Err(PnlError::Config(format!(
                    "columns.{} needs at least one header name",
                    field
                )));
            }
        }
        Ok(())
    }

    /// Locate one field's column; exact names win over case-insensitive ones
    fn locate(&self, field: LedgerField, headers: &[String]) -> Option<ResolvedColumn> {
        let candidates = self.candidates(field);
        let exact = candidates
            .iter()
            .find_map(|name| headers.iter().position(|h| h == name));
        let index = exact.or_else(|| {
            candidates.iter().find_map(|name| {
                headers
                    .iter()
                    .position(|h| h.eq_ignore_ascii_case(name))
            })
        })?;

        Some(ResolvedColumn {
            index,
            name: headers[index].clone(),
        })
    }

    /// Resolve every field against a header row
    pub fn resolve(&self, headers: &[String]) -> Result<ColumnMapping, PnlError> {
        let find = |field: LedgerField| {
            self.locate(field, headers)
                .ok_or_else(|| PnlError::MissingColumn {
                    field,
                    tried: self.candidates(field).join(", "),
                })
        };

        Ok(ColumnMapping {
            date: find(LedgerField::Date)?,
            side: find(LedgerField::Side)?,
            symbol: find(LedgerField::Symbol)?,
            quantity: find(LedgerField::Quantity)?,
            price: find(LedgerField::Price)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub name: String,
}

/// Header positions for the five ledger fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date: ResolvedColumn,
    pub side: ResolvedColumn,
    pub symbol: ResolvedColumn,
    pub quantity: ResolvedColumn,
    pub price: ResolvedColumn,
}

impl ColumnMapping {
    pub fn get(&self, field: LedgerField) -> &ResolvedColumn {
        match field {
            LedgerField::Date => &self.date,
            LedgerField::Side => &self.side,
            LedgerField::Symbol => &self.symbol,
            LedgerField::Quantity => &self.quantity,
            LedgerField::Price => &self.price,
        }
    }
}

/// Maps free-form transaction codes ("Buy", "BOT", "SLD", ...) to a side
#[derive(Debug, Clone)]
pub struct SideClassifier {
    buy: Regex,
    sell: Regex,
}

impl SideClassifier {
    pub const DEFAULT_BUY_PATTERN: &'static str = "buy|^b$|bot";
    pub const DEFAULT_SELL_PATTERN: &'static str = "sell|^s$|sld";

    pub fn new(buy_pattern: &str, sell_pattern: &str) -> Result<Self> {
        let build = |pattern: &str| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| PnlError::Config(format!("invalid pattern {:?}: {}", pattern, e)))
        };

        Ok(Self {
            buy: build(buy_pattern)?,
            sell: build(sell_pattern)?,
        })
    }

    /// Sells are checked first; anything else (dividends, transfers) is `None`
    pub fn classify(&self, code: &str) -> Option<Side> {
        let code = code.trim();
        if code.is_empty() {
            None
        } else if self.sell.is_match(code) {
            Some(Side::Sell)
        } else if self.buy.is_match(code) {
            Some(Side::Buy)
        } else {
            None
        }
    }
}

/// Counters describing what happened to each data row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub rows: usize,
    pub blank_symbol: usize,
    pub unclassified: usize,
    pub invalid_date: usize,
    /// Amounts replaced by zero under the lenient policy
    pub coerced_amounts: usize,
}

/// Parsed activity file
#[derive(Debug, Clone)]
pub struct ActivityImport {
    pub transactions: Vec<Transaction>,
    pub mapping: ColumnMapping,
    pub encoding: &'static str,
    pub stats: ImportStats,
}

/// Reader for brokerage activity CSV exports
#[derive(Debug, Clone)]
pub struct ActivityReader {
    columns: ColumnSynonyms,
    classifier: SideClassifier,
    numeric: NumericPolicy,
}

impl ActivityReader {
    pub fn new(columns: ColumnSynonyms, classifier: SideClassifier, numeric: NumericPolicy) -> Self {
        Self {
            columns,
            classifier,
            numeric,
        }
    }

    pub fn read_path<P: AsRef<Path>>(&self, file_path: P) -> Result<ActivityImport> {
        let path = file_path.as_ref();
        info!("Parsing activity CSV file: {:?}", path);

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
        self.read_bytes(&bytes)
    }

    pub fn read_bytes(&self, bytes: &[u8]) -> Result<ActivityImport> {
        let (content, encoding) = decode_activity_bytes(bytes);
        let mut import = self.read_str(&content)?;
        import.encoding = encoding;
        Ok(import)
    }

    pub fn read_str(&self, content: &str) -> Result<ActivityImport> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = read_headers(&mut reader)?;
        debug!("CSV headers: {:?}", headers);

        let mapping = self.columns.resolve(&headers)?;
        info!(
            "Using columns - Date: {}, Type: {}, Symbol: {}, Qty: {}, Price: {}",
            mapping.date.name,
            mapping.side.name,
            mapping.symbol.name,
            mapping.quantity.name,
            mapping.price.name
        );

        let mut stats = ImportStats::default();
        let mut transactions = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let row_num = idx + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable row {}: {}", row_num, e);
                    continue;
                }
            };
            stats.rows += 1;

            if let Some(tx) = self.parse_row(&record, &mapping, row_num, &mut stats)? {
                transactions.push(tx);
            }
        }

        info!(
            "Successfully parsed {} transactions from {} rows",
            transactions.len(),
            stats.rows
        );

        Ok(ActivityImport {
            transactions,
            mapping,
            encoding: UTF_8.name(),
            stats,
        })
    }

    fn parse_row(
        &self,
        record: &csv::StringRecord,
        mapping: &ColumnMapping,
        row_num: usize,
        stats: &mut ImportStats,
    ) -> Result<Option<Transaction>> {
        let cell = |column: &ResolvedColumn| record.get(column.index).unwrap_or("").trim();

        let symbol = cell(&mapping.symbol).to_uppercase();
        if symbol.is_empty() {
            stats.blank_symbol += 1;
            return Ok(None);
        }

        let Some(side) = self.classifier.classify(cell(&mapping.side)) else {
            debug!(
                "Row {}: {:?} is neither a buy nor a sell, skipping",
                row_num,
                cell(&mapping.side)
            );
            stats.unclassified += 1;
            return Ok(None);
        };

        let Some(date) = parse_activity_date(cell(&mapping.date)) else {
            warn!(
                "Skipping row {}: could not parse date {:?}",
                row_num,
                cell(&mapping.date)
            );
            stats.invalid_date += 1;
            return Ok(None);
        };

        let quantity = self.read_amount(cell(&mapping.quantity), row_num, LedgerField::Quantity, stats)?;
        let price = self.read_amount(cell(&mapping.price), row_num, LedgerField::Price, stats)?;

        Ok(Some(
            Transaction::new(symbol, side, date, quantity.abs(), price.abs()).with_row(row_num),
        ))
    }

    fn read_amount(
        &self,
        text: &str,
        row_num: usize,
        field: LedgerField,
        stats: &mut ImportStats,
    ) -> Result<Decimal> {
        match parse_amount(text) {
            Ok(value) => Ok(value),
            Err(source) => match self.numeric {
                NumericPolicy::Strict => Err(anyhow::Error::new(PnlError::AmountParse {
                    row: row_num,
                    source,
                })
                .context(format!("Invalid {} value", field))),
                NumericPolicy::Lenient => {
                    warn!(
                        "Row {}: {} {:?} is not a number, using 0",
                        row_num, field, text
                    );
                    stats.coerced_amounts += 1;
                    Ok(Decimal::ZERO)
                }
            },
        }
    }
}

/// Header row and column resolution of a file, without parsing its rows
#[derive(Debug, Clone)]
pub struct FileInspection {
    pub headers: Vec<String>,
    pub rows: usize,
    pub encoding: &'static str,
    pub resolved: Vec<(LedgerField, Option<String>)>,
}

/// Describe a CSV file's structure and how its columns would be resolved
pub fn inspect_activity<P: AsRef<Path>>(file_path: P, columns: &ColumnSynonyms) -> Result<FileInspection> {
    let path = file_path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
    let (content, encoding) = decode_activity_bytes(&bytes);

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = read_headers(&mut reader)?;
    let rows = reader.records().filter(|r| r.is_ok()).count();

    let resolved = LedgerField::ALL
        .iter()
        .map(|field| (*field, columns.locate(*field, &headers).map(|c| c.name)))
        .collect();

    Ok(FileInspection {
        headers,
        rows,
        encoding,
        resolved,
    })
}

fn read_headers<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<String>> {
    let headers = reader.headers().context("Failed to read CSV headers")?;
    if headers.is_empty() {
        return Err(anyhow!("CSV file has no header row"));
    }
    Ok(headers.iter().map(|h| h.trim().to_string()).collect())
}

/// Decode as UTF-8 (BOM stripped), falling back to Windows-1252/Latin-1
pub fn decode_activity_bytes(bytes: &[u8]) -> (String, &'static str) {
    let (decoded, encoding, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return (decoded.into_owned(), encoding.name());
    }

    debug!("File is not valid UTF-8, decoding as {}", WINDOWS_1252.name());
    let (decoded, encoding, _) = WINDOWS_1252.decode(bytes);
    (decoded.into_owned(), encoding.name())
}

/// Parse the date formats seen in US brokerage exports.
///
/// Two-digit year formats are tried first: chrono's `%Y` also accepts a
/// short year, which would turn `3/5/24` into year 24.
pub fn parse_activity_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date = ["%m/%d/%y", "%m-%d-%y", "%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            [
                "%Y-%m-%d %H:%M:%S",
                "%Y-%m-%dT%H:%M:%S",
                "%m/%d/%y %H:%M",
                "%m/%d/%Y %H:%M",
                "%m/%d/%Y %H:%M:%S",
            ]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|datetime| datetime.date())
        })?;

    // Years below 1000 only come from a truncated year field
    (date.year() >= 1000).then_some(date)
}
