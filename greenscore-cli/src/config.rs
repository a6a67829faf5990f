use anyhow::{Context, Result};
use greenscore_classify::{DEFAULT_ENDPOINT, MIN_CONFIDENCE};
use greenscore_core::HISTORY_CAPACITY;
use greenscore_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::state::{ensure_greenscore_home, read_if_exists, write_replace};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierSection,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub endpoint: String,
    pub min_confidence: f64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub history_capacity: usize,
    /// Record the best guess even under the confidence threshold
    pub proceed_on_low_confidence: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// trace | debug | info | warn | error
    pub level: String,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            min_confidence: MIN_CONFIDENCE,
            timeout_secs: 30,
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            proceed_on_low_confidence: false,
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            min_confidence: self.classifier.min_confidence,
            timeout: Duration::from_secs(self.classifier.timeout_secs.max(1)),
            history_capacity: self.engine.history_capacity,
            proceed_on_low_confidence: self.engine.proceed_on_low_confidence,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_greenscore_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    match read_if_exists(&config_path()?)? {
        Some(s) => parse_config(&s),
        None => Ok(Config::default()),
    }
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

/// Write the default config unless one exists. Returns the path and whether
/// it was written.
pub fn init_config() -> Result<(PathBuf, bool)> {
    let p = config_path()?;
    if p.exists() {
        return Ok((p, false));
    }
    let s = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    write_replace(&p, &s)?;
    Ok((p, true))
}
