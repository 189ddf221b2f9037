use std::path::{Path, PathBuf};

use anyhow::Context;
use proptrail_ledger::{LedgerConfig, RecordFormat};
use serde::{Deserialize, Serialize};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "proptrail.toml";

/// Settings for the command-line tool, read from TOML.
///
/// ```toml
/// store_path = "data/proptrail.db"
/// namespace = "productProperty"
/// record_format = "json"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store_path: PathBuf,
    pub namespace: Option<String>,
    pub record_format: RecordFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("proptrail.db"),
            namespace: None,
            record_format: RecordFormat::Json,
        }
    }
}

impl CliConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load `path` if given (it must exist), else `./proptrail.toml` if
    /// present, else defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, store: Option<PathBuf>, namespace: Option<String>) -> Self {
        if let Some(store) = store {
            self.store_path = store;
        }
        if namespace.is_some() {
            self.namespace = namespace;
        }
        self
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            namespace: self.namespace.clone(),
        }
    }
}
