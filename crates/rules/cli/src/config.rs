//! CLI configuration

use crate::error::{CliError, CliResult};
use rules_compiler::CompilerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration, read from `config.toml`
///
/// ```toml
/// [compiler]
/// max_depth = 32
/// allow_empty = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    /// Settings handed to the policy compiler
    pub compiler: CompilerConfig,
}

impl CliConfig {
    /// Load configuration from file, falling back to defaults when the file
    /// does not exist
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config = Self::from_toml(&contents)?;
            tracing::debug!(path = %config_path.display(), "Loaded configuration");
            Ok(config)
        } else {
            tracing::debug!(path = %config_path.display(), "No configuration file, using defaults");
            Ok(CliConfig::default())
        }
    }

    pub fn from_toml(contents: &str) -> CliResult<Self> {
        toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("rulesc").join("config.toml"))
    }
}
