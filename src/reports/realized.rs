use anyhow::{Context, Result};
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use crate::tax::PnlReport;

/// JSON payload: per-symbol summaries plus a totals block
pub fn report_json(report: &PnlReport) -> Value {
    let totals = report.totals();
    json!({
        "year": report.year,
        "positions": report.positions,
        "totals": {
            "short_term_gain_loss": totals.short_term_gain_loss,
            "long_term_gain_loss": totals.long_term_gain_loss,
            "total_gain_loss": totals.total_gain_loss(),
            "short_term_count": totals.short_term_count,
            "long_term_count": totals.long_term_count,
            "partial_match_warning": totals.partial_match_warning,
            "unmatched_quantity": totals.unmatched_quantity,
        },
    })
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    symbol: &'a str,
    short_term_gain_loss: String,
    long_term_gain_loss: String,
    total_gain_loss: String,
    short_term_count: usize,
    long_term_count: usize,
    partial_match_warning: usize,
    unmatched_quantity: String,
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Per-symbol summary as CSV, closed by a TOTAL row
pub fn export_to_csv(report: &PnlReport) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());

    let totals = report.totals();
    let rows = report
        .positions
        .iter()
        .map(|(symbol, p)| (symbol.as_str(), p))
        .chain(std::iter::once(("TOTAL", &totals)));

    for (symbol, p) in rows {
        writer
            .serialize(SummaryRow {
                symbol,
                short_term_gain_loss: money(p.short_term_gain_loss),
                long_term_gain_loss: money(p.long_term_gain_loss),
                total_gain_loss: money(p.total_gain_loss()),
                short_term_count: p.short_term_count,
                long_term_count: p.long_term_count,
                partial_match_warning: p.partial_match_warning,
                unmatched_quantity: p.unmatched_quantity.normalize().to_string(),
            })
            .context("Failed to write CSV row")?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// One CSV row per lot match
pub fn matches_to_csv(report: &PnlReport) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record([
        "symbol",
        "sell_date",
        "acquired_date",
        "quantity",
        "sell_price",
        "unit_cost",
        "proceeds",
        "cost",
        "gain_loss",
        "holding_days",
        "term",
    ])?;

    for m in &report.matches {
        writer.write_record([
            m.symbol.clone(),
            m.sell_date.to_string(),
            m.acquired_date.to_string(),
            m.matched_quantity.normalize().to_string(),
            money(m.sell_price),
            money(m.unit_cost),
            money(m.proceeds),
            money(m.cost),
            money(m.gain_loss),
            m.holding_days.to_string(),
            m.term.as_str().to_string(),
        ])?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Side, Transaction};
    use crate::tax::{compute_pnl_report, MatchOptions};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_report() -> PnlReport {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let txs = vec![
            Transaction::new("AAPL", Side::Buy, d("2023-01-01"), dec!(10), dec!(100)),
            Transaction::new("AAPL", Side::Buy, d("2023-06-01"), dec!(10), dec!(110)),
            Transaction::new("AAPL", Side::Sell, d("2024-02-01"), dec!(12), dec!(130)),
            Transaction::new("GME", Side::Sell, d("2024-05-01"), dec!(2), dec!(20)),
        ];
        compute_pnl_report(&txs, 2024, &MatchOptions::default()).unwrap()
    }

    #[test]
    fn test_summary_csv_has_total_row() {
        let csv = export_to_csv(&sample_report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert!(lines[0].starts_with("symbol,short_term_gain_loss,long_term_gain_loss"));
        assert_eq!(lines[1], "AAPL,40.00,300.00,340.00,1,1,0,0");
        assert_eq!(lines[2], "GME,0.00,0.00,0.00,0,0,1,2");
        assert_eq!(lines[3], "TOTAL,40.00,300.00,340.00,1,1,1,2");
    }

    #[test]
    fn test_matches_csv() {
        let csv = matches_to_csv(&sample_report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "AAPL,2024-02-01,2023-01-01,10,130.00,100.00,1300.00,1000.00,300.00,396,LONG"
        );
        assert!(lines[2].ends_with("245,SHORT"));
    }

    #[test]
    fn test_report_json_shape() {
        let value = report_json(&sample_report());
        assert_eq!(value["year"], 2024);
        assert_eq!(value["positions"]["AAPL"]["long_term_gain_loss"], "300");
        assert_eq!(value["positions"]["AAPL"]["short_term_count"], 1);
        assert_eq!(value["totals"]["total_gain_loss"], "340");
        assert_eq!(value["totals"]["partial_match_warning"], 1);
        assert_eq!(value["totals"]["unmatched_quantity"], "2");
        assert_eq!(value["positions"]["GME"]["unmatched_quantity"], "2");
    }
}
