//! Configuration loading and management.

use std::path::{Path, PathBuf};

use att_core::{RuleConfig, RuleEngine, Tz, ValidationError, resolve_timezone};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// The acting user's IANA timezone. UTC when unset.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Late threshold and leave window.
    #[serde(default)]
    pub rules: RuleConfig,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("att.db"),
            timezone: None,
            rules: RuleConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ATT_*, nested keys split on `__`)
        figment = figment.merge(Env::prefixed("ATT_").split("__"));

        figment.extract()
    }

    /// Resolves the acting timezone, preferring `override_name` when given.
    pub fn resolve_timezone(&self, override_name: Option<&str>) -> Tz {
        resolve_timezone(override_name.or(self.timezone.as_deref()))
    }

    /// Builds a rule engine from the configured thresholds.
    pub fn rule_engine(&self) -> Result<RuleEngine, ValidationError> {
        RuleEngine::new(self.rules)
    }
}

/// Returns the platform-specific config directory for att.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("att"))
}

/// Returns the platform-specific data directory for att.
///
/// On Linux: `~/.local/share/att`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("att"))
}
