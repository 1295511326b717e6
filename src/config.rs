//! Configuration loading
//!
//! Settings live in an optional TOML file. Every section has defaults that
//! match a Robinhood activity export, so running without a config file works.
//!
//! ```toml
//! [parsing]
//! numeric = "strict"
//!
//! [matching]
//! long_term_days = 365
//! include_prior_sells = false
//!
//! [columns]
//! symbol = ["Instrument", "Symbol"]
//!
//! [classification]
//! sell_pattern = "sell|^s$|sld"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::PnlError;
use crate::importers::{ColumnSynonyms, NumericPolicy, SideClassifier};
use crate::tax::MatchOptions;

const APP_DIR: &str = "robin-pnl";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    pub numeric: NumericPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub buy_pattern: String,
    pub sell_pattern: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            buy_pattern: SideClassifier::DEFAULT_BUY_PATTERN.to_string(),
            sell_pattern: SideClassifier::DEFAULT_SELL_PATTERN.to_string(),
        }
    }
}

impl ClassificationConfig {
    pub fn classifier(&self) -> Result<SideClassifier> {
        SideClassifier::new(&self.buy_pattern, &self.sell_pattern)
    }
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parsing: ParsingConfig,
    pub matching: MatchOptions,
    pub columns: ColumnSynonyms,
    pub classification: ClassificationConfig,
}

impl Config {
    /// Default config file location (`$XDG_CONFIG_HOME/robin-pnl/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
    }

    /// Load settings from an explicit path, or from the default location if present.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading config from {:?}", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| PnlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.matching.long_term_days < 0 {
            return Err(PnlError::Config("matching.long_term_days must not be negative".into()).into());
        }
        self.columns.validate()?;
        self.classification.classifier()?;
        Ok(())
    }
}
