//! CLI configuration file
//!
//! ```toml
//! [backend]
//! url = "https://xyz.supabase.co"
//! anon_key = "..."
//! poll_interval_ms = 5000
//!
//! [roster]
//! collection = "strays"
//! limit = 100
//!
//! [log]
//! filter = "info,pawchive_roster=debug"
//! json = false
//! ```

use anyhow::{Context, Result};
use pawchive_roster::RosterConfig;
use pawchive_store::BackendConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read from the working directory when `--config` is not given
pub(crate) const DEFAULT_CONFIG_FILE: &str = "pawchive.toml";

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LogConfig {
    /// Filter directives used when `RUST_LOG` is unset
    pub(crate) filter: String,
    /// Emit JSON lines instead of text
    pub(crate) json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Whole CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PawchiveConfig {
    pub(crate) backend: BackendConfig,
    pub(crate) roster: RosterConfig,
    pub(crate) log: LogConfig,
}

impl PawchiveConfig {
    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] if present, then apply
    /// environment overrides
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if default_path.is_file() => Self::from_file(default_path)?,
            None => Self::default(),
        };
        Ok(config.apply_env())
    }

    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub(crate) fn apply_env(mut self) -> Self {
        self.backend = self.backend.apply_env();
        self
    }
}
