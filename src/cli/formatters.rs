//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of P&L calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use robin_pnl::error::LedgerField;
use robin_pnl::importers::{ActivityImport, FileInspection};
use robin_pnl::tax::{PnlReport, PositionSummary};
use robin_pnl::utils::{format_gain, format_quantity, format_usd};

fn colorize(value: Decimal, text: String) -> String {
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Short summary of what the importer kept and skipped
pub fn format_import_summary(import: &ActivityImport) -> String {
    let stats = &import.stats;
    let mut output = format!(
        "\n{} Parsed {} buy/sell transactions from {} rows ({})\n",
        "✓".green().bold(),
        import.transactions.len(),
        stats.rows,
        import.encoding
    );
    let columns = LedgerField::ALL
        .iter()
        .map(|field| format!("{}={}", field, import.mapping.get(*field).name))
        .collect::<Vec<_>>()
        .join(", ");
    output.push_str(&format!("  Columns: {}\n", columns));

    let skipped = stats.blank_symbol + stats.unclassified + stats.invalid_date;
    if skipped > 0 {
        output.push_str(&format!(
            "  Skipped: {} (other activity: {}, no symbol: {}, bad date: {})\n",
            skipped.to_string().yellow(),
            stats.unclassified,
            stats.blank_symbol,
            stats.invalid_date
        ));
    }
    if stats.coerced_amounts > 0 {
        output.push_str(&format!(
            "  {} {} unparseable amount(s) counted as 0\n",
            "⚠".yellow().bold(),
            stats.coerced_amounts
        ));
    }
    output
}

/// Per-symbol summary table with totals and tax implications
pub fn format_pnl_summary(report: &PnlReport) -> String {
    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Short-Term P&L")]
        short_term: String,
        #[tabled(rename = "Long-Term P&L")]
        long_term: String,
        #[tabled(rename = "Total P&L")]
        total: String,
        #[tabled(rename = "ST Lots")]
        short_count: usize,
        #[tabled(rename = "LT Lots")]
        long_count: usize,
        #[tabled(rename = "Unmatched")]
        unmatched: String,
    }

    fn row(symbol: String, p: &PositionSummary) -> SummaryRow {
        SummaryRow {
            symbol,
            short_term: colorize(p.short_term_gain_loss, format_usd(p.short_term_gain_loss)),
            long_term: colorize(p.long_term_gain_loss, format_usd(p.long_term_gain_loss)),
            total: colorize(p.total_gain_loss(), format_usd(p.total_gain_loss())),
            short_count: p.short_term_count,
            long_count: p.long_term_count,
            unmatched: if p.partial_match_warning > 0 {
                format_quantity(p.unmatched_quantity).yellow().to_string()
            } else {
                "-".to_string()
            },
        }
    }

    let totals = report.totals();
    let mut rows: Vec<SummaryRow> = report
        .positions
        .iter()
        .map(|(symbol, p)| row(symbol.clone(), p))
        .collect();
    rows.push(row("TOTAL".bold().to_string(), &totals));

    let mut output = format!("\n{} Realized P&L - {}\n\n", "📊".cyan().bold(), report.year);

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());

    output.push_str(&format!("\n\n{} Tax Implications", "━".repeat(60).bright_black()));
    output.push_str(&format!(
        "\n{:<46} {}",
        "Short-term gains (taxed as ordinary income):".bold(),
        colorize(totals.short_term_gain_loss, format_gain(totals.short_term_gain_loss))
    ));
    output.push_str(&format!(
        "\n{:<46} {}",
        "Long-term gains (preferential tax rate):".bold(),
        colorize(totals.long_term_gain_loss, format_gain(totals.long_term_gain_loss))
    ));
    output.push_str(&format!(
        "\n{:<46} {}\n",
        "Total gains/losses:".bold(),
        colorize(totals.total_gain_loss(), format_gain(totals.total_gain_loss()))
    ));

    if totals.partial_match_warning > 0 {
        output.push_str(&format!(
            "\n{} {} sale(s) had no remaining purchase lots for {} share(s); those shares are excluded above.\n",
            "⚠".yellow().bold(),
            totals.partial_match_warning,
            format_quantity(totals.unmatched_quantity)
        ));
    }

    output
}

/// One row per lot match, in realization order
pub fn format_match_details(report: &PnlReport) -> String {
    #[derive(Tabled)]
    struct MatchRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Sold")]
        sold: String,
        #[tabled(rename = "Qty")]
        quantity: String,
        #[tabled(rename = "Sell Price")]
        sell_price: String,
        #[tabled(rename = "Bought")]
        bought: String,
        #[tabled(rename = "Cost/Unit")]
        unit_cost: String,
        #[tabled(rename = "Days")]
        days: i64,
        #[tabled(rename = "Term")]
        term: String,
        #[tabled(rename = "P&L")]
        gain_loss: String,
    }

    let rows: Vec<MatchRow> = report
        .matches
        .iter()
        .map(|m| MatchRow {
            symbol: m.symbol.clone(),
            sold: m.sell_date.to_string(),
            quantity: format_quantity(m.matched_quantity),
            sell_price: format_usd(m.sell_price),
            bought: m.acquired_date.to_string(),
            unit_cost: format_usd(m.unit_cost),
            days: m.holding_days,
            term: m.term.label().to_string(),
            gain_loss: colorize(m.gain_loss, format_gain(m.gain_loss)),
        })
        .collect();

    let mut output = format!("\n{} Lot Matches (FIFO)\n\n", "🔎".cyan().bold());
    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..4), Alignment::right());
    table.modify(Columns::new(5..7), Alignment::right());
    table.modify(Columns::new(8..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Message for a year without any sales
pub fn format_empty_report(year: i32) -> String {
    format!(
        "\n{} No sales found for {}\nCheck the --year option or the activity file's date column.\n",
        "ℹ".blue().bold(),
        year
    )
}

/// Header list and column resolution of an inspected file
pub fn format_inspection(inspection: &FileInspection) -> String {
    let mut output = format!(
        "\n{} {} data row(s), encoding {}\n\n{}\n",
        "📄".cyan().bold(),
        inspection.rows,
        inspection.encoding,
        "Headers:".bold()
    );
    for (idx, header) in inspection.headers.iter().enumerate() {
        output.push_str(&format!("  Col {}: {}\n", idx + 1, header.yellow()));
    }

    output.push_str(&format!("\n{}\n", "Column mapping:".bold()));
    for (field, column) in &inspection.resolved {
        let shown = match column {
            Some(name) => name.green().to_string(),
            None => "NOT FOUND".red().bold().to_string(),
        };
        output.push_str(&format!("  {:<10} {}\n", field.as_str(), shown));
    }
    output
}
