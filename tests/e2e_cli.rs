use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use rust_decimal_macros::dec;
use tempfile::TempDir;

mod cli_helpers;
use cli_helpers::{base_cmd, decimal_from_value, pnl_json, run_cmd, write_file, FIXTURE};

fn setup_temp_home() -> TempDir {
    TempDir::new().expect("failed to create temp home")
}

#[test]
fn pnl_summary_table_without_color() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.args(["pnl", FIXTURE, "--year", "2024"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Realized P&L - 2024"))
        .stdout(predicate::str::contains("AAPL"))
        .stdout(predicate::str::contains("TSLA"))
        .stdout(predicate::str::contains("$300.00"))
        .stdout(predicate::str::contains("$-100.00"))
        .stdout(predicate::str::contains("$+240.00"))
        .stdout(predicate::str::contains("no remaining purchase lots"))
        .stdout(predicate::str::contains("MSFT").not())
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn pnl_json_matches_fifo_expectations() -> Result<()> {
    let home = setup_temp_home();
    let report = pnl_json(&home, FIXTURE, "2024")?;

    let aapl = &report["positions"]["AAPL"];
    assert_eq!(decimal_from_value(&aapl["long_term_gain_loss"])?, dec!(300));
    assert_eq!(decimal_from_value(&aapl["short_term_gain_loss"])?, dec!(40));
    assert_eq!(aapl["long_term_count"], 1);
    assert_eq!(aapl["short_term_count"], 1);

    let tsla = &report["positions"]["TSLA"];
    assert_eq!(decimal_from_value(&tsla["short_term_gain_loss"])?, dec!(-100));

    let gme = &report["positions"]["GME"];
    assert_eq!(gme["partial_match_warning"], 1);
    assert_eq!(decimal_from_value(&gme["unmatched_quantity"])?, dec!(4));

    assert!(report["positions"].get("MSFT").is_none());
    assert_eq!(decimal_from_value(&report["totals"]["total_gain_loss"])?, dec!(240));

    Ok(())
}

#[test]
fn pnl_for_previous_year_uses_that_years_sales() -> Result<()> {
    let home = setup_temp_home();
    let report = pnl_json(&home, FIXTURE, "2023")?;

    let msft = &report["positions"]["MSFT"];
    assert_eq!(decimal_from_value(&msft["short_term_gain_loss"])?, dec!(120));
    assert!(report["positions"].get("AAPL").is_none());

    Ok(())
}

#[test]
fn pnl_detail_lists_lot_matches() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.args(["pnl", FIXTURE, "--year", "2024", "--detail"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Lot Matches"))
        .stdout(predicate::str::contains("2023-01-01"))
        .stdout(predicate::str::contains("396"))
        .stdout(predicate::str::contains("Long-term"));
}

#[test]
fn pnl_export_writes_csv() -> Result<()> {
    let home = setup_temp_home();
    let export = home.path().join("pnl_2024.csv");
    let export_str = export.to_string_lossy().to_string();

    run_cmd(&home, &["pnl", FIXTURE, "--year", "2024", "--export", export_str.as_str()])?;

    let content = std::fs::read_to_string(&export)?;
    assert!(content.contains("AAPL,40.00,300.00,340.00,1,1,0,0"));
    assert!(content.lines().last().unwrap_or("").starts_with("TOTAL,-60.00,300.00,240.00"));

    Ok(())
}

#[test]
fn empty_year_is_reported_not_an_error() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.args(["pnl", FIXTURE, "--year", "2019"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No sales found for 2019"));
}

#[test]
fn missing_price_column_fails_with_field_name() -> Result<()> {
    let home = setup_temp_home();
    let path = write_file(&home, "bad.csv", "Date,Symbol,Side,Qty\n2024-01-01,AAPL,Buy,1\n")?;

    let mut cmd = base_cmd(&home);
    cmd.arg("pnl").arg(&path).args(["--year", "2024"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing column: no price column"));

    Ok(())
}

#[test]
fn strict_flag_rejects_unparseable_amounts() -> Result<()> {
    let home = setup_temp_home();
    let csv = "Date,Symbol,Side,Qty,Price\n2024-01-01,AAPL,Buy,1,$10\n2024-02-01,AAPL,Sell,one,$12\n";
    let path = write_file(&home, "ledger.csv", csv)?;
    let path_str = path.to_string_lossy().to_string();

    // Lenient default: the bad quantity becomes 0 and the run succeeds
    let report = pnl_json(&home, &path_str, "2024")?;
    assert_eq!(decimal_from_value(&report["totals"]["total_gain_loss"])?, dec!(0));

    let mut cmd = base_cmd(&home);
    cmd.args(["pnl", path_str.as_str(), "--year", "2024", "--strict"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity value"));

    Ok(())
}

#[test]
fn config_file_overrides_column_names() -> Result<()> {
    let home = setup_temp_home();
    let csv = "When,Code,Kind,Units,Cost\n2024-01-01,ABC,Buy,2,10\n2024-03-01,ABC,Sell,2,15\n";
    let ledger = write_file(&home, "custom.csv", csv)?;
    let config = write_file(
        &home,
        "pnl.toml",
        "[columns]\ndate = [\"When\"]\nsymbol = [\"Code\"]\nside = [\"Kind\"]\nquantity = [\"Units\"]\nprice = [\"Cost\"]\n",
    )?;

    let config_str = config.to_string_lossy().to_string();
    let ledger_str = ledger.to_string_lossy().to_string();

    let output = run_cmd(
        &home,
        &[
            "--json",
            "--config",
            config_str.as_str(),
            "pnl",
            ledger_str.as_str(),
            "--year",
            "2024",
        ],
    )?;
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        decimal_from_value(&report["positions"]["ABC"]["short_term_gain_loss"])?,
        dec!(10)
    );

    Ok(())
}

#[test]
fn inspect_shows_column_mapping() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.args(["inspect", FIXTURE]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Trans Code"))
        .stdout(predicate::str::contains("Instrument"))
        .stdout(predicate::str::contains("NOT FOUND").not());
}
