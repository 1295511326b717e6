#![allow(dead_code)]

use anyhow::{bail, Context, Result};
use assert_cmd::cargo;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub const FIXTURE: &str = "tests/data/robinhood_activity.csv";

/// Command with an isolated HOME/XDG config dir and colors disabled
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("robin-pnl"));
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd.env_remove("RUST_LOG");
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn write_file(home: &TempDir, name: &str, content: &str) -> Result<PathBuf> {
    let path = home.path().join(name);
    std::fs::write(&path, content).with_context(|| format!("failed to write {}", name))?;
    Ok(path)
}

pub fn pnl_json(home: &TempDir, file: &str, year: &str) -> Result<Value> {
    let output = run_cmd(home, &["--json", "pnl", file, "--year", year])?;
    serde_json::from_slice(&output.stdout).context("stdout is not JSON")
}

pub fn decimal_from_value(value: &Value) -> Result<Decimal> {
    if let Some(s) = value.as_str() {
        return Decimal::from_str_exact(s).context("invalid decimal string");
    }
    if let Some(f) = value.as_f64() {
        return Decimal::try_from(f).context("invalid decimal number");
    }
    bail!("expected decimal value, got {}", value)
}
