//! Command dispatcher that routes parsed clap Commands to their handlers.

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::{formatters, Commands};
use robin_pnl::config::Config;
use robin_pnl::importers::{self, NumericPolicy};
use robin_pnl::reports;
use robin_pnl::tax;

/// Route a parsed command to its handler
pub fn dispatch_command(command: Commands, config: Config, json_output: bool) -> Result<()> {
    match command {
        Commands::Pnl {
            file,
            year,
            detail,
            export,
            strict,
            include_prior_sells,
        } => {
            let mut config = config;
            if strict {
                config.parsing.numeric = NumericPolicy::Strict;
            }
            if include_prior_sells {
                config.matching.include_prior_sells = true;
            }
            let year = year.unwrap_or_else(|| Local::now().year());
            dispatch_pnl(&file, year, detail, export.as_deref(), &config, json_output)
        }
        Commands::Inspect { file } => dispatch_inspect(&file, &config, json_output),
    }
}

fn dispatch_pnl(
    file: &Path,
    year: i32,
    detail: bool,
    export: Option<&Path>,
    config: &Config,
    json_output: bool,
) -> Result<()> {
    info!(
        "Calculating realized P&L for {} from {:?} (numeric policy: {})",
        year,
        file,
        config.parsing.numeric.as_str()
    );

    let import = importers::import_file(file, config)
        .with_context(|| format!("Failed to import {}", file.display()))?;
    let report = tax::compute_pnl_report(&import.transactions, year, &config.matching)?;

    if let Some(path) = export {
        let csv_content = reports::export_to_csv(&report)?;
        std::fs::write(path, csv_content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if detail {
            let details_path = details_path(path);
            std::fs::write(&details_path, reports::matches_to_csv(&report)?)
                .with_context(|| format!("Failed to write {}", details_path.display()))?;
        }
        info!("Exported P&L summary to {:?}", path);
    }

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports::report_json(&report))?
        );
        return Ok(());
    }

    print!("{}", formatters::format_import_summary(&import));

    if report.is_empty() {
        print!("{}", formatters::format_empty_report(year));
        return Ok(());
    }

    if detail {
        print!("{}", formatters::format_match_details(&report));
    }
    print!("{}", formatters::format_pnl_summary(&report));

    if let Some(path) = export {
        println!(
            "\n{} Report exported to: {}",
            "✓".green().bold(),
            path.display()
        );
    }

    Ok(())
}

/// `summary.csv` -> `summary_matches.csv`
fn details_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pnl".to_string());
    path.with_file_name(format!("{}_matches.csv", stem))
}

fn dispatch_inspect(file: &Path, config: &Config, json_output: bool) -> Result<()> {
    let inspection = importers::inspect_activity(file, &config.columns)?;

    if json_output {
        let mapping: serde_json::Map<String, serde_json::Value> = inspection
            .resolved
            .iter()
            .map(|(field, column)| (field.as_str().to_string(), serde_json::json!(column)))
            .collect();
        let payload = serde_json::json!({
            "headers": inspection.headers,
            "rows": inspection.rows,
            "encoding": inspection.encoding,
            "mapping": mapping,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    print!("{}", formatters::format_inspection(&inspection));
    Ok(())
}
