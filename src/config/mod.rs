//! Configuration of the exporter.
//!
//! The configuration is a single TOML file. Its location is resolved in this
//! order:
//!
//! 1. the path passed with `--config`
//! 2. the path in the `FIE_CONFIG` environment variable
//! 3. `<config dir>/factorio-export/config.toml`, e.g.
//!    `~/.config/factorio-export/config.toml` on Linux
//!
//! A missing file at the default location is not an error, the defaults are
//! used instead. An explicitly requested file must exist.
//!
//! ```toml
//! factorio_directory = "~/factorio"
//! mods_directory = "~/factorio/mods"
//! instances_directory = "/tmp/fie-instances"
//! data_directory = "$HOME/fie-data"
//! dump_mod_directory = "~/fie/dump-mod"
//! number_of_instances = 8
//! ```
//!
//! All paths support `~` and `$VAR` expansion.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_NUMBER_OF_INSTANCES, DEFAULT_PROCESS_TIMEOUT,
    DEFAULT_RETRY_DELAY_MS,
};
use crate::core::ExportError;

/// Environment variable overriding the location of the configuration file.
pub const CONFIG_ENV_VAR: &str = "FIE_CONFIG";

const fn default_number_of_instances() -> usize {
    DEFAULT_NUMBER_OF_INSTANCES
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_process_timeout_secs() -> u64 {
    DEFAULT_PROCESS_TIMEOUT.as_secs()
}

const fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

/// Settings of an export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Game installation, containing `bin/x64/factorio` and `data/base`
    #[serde(default = "defaults::factorio_directory")]
    pub factorio_directory: PathBuf,

    /// Directory holding the mod zip files
    #[serde(default = "defaults::mods_directory")]
    pub mods_directory: PathBuf,

    /// Directory the game instances get their working directories in
    #[serde(default = "defaults::instances_directory")]
    pub instances_directory: PathBuf,

    /// Directory of the exported data
    #[serde(default = "defaults::data_directory")]
    pub data_directory: PathBuf,

    /// Directory of the in-game dump mod
    #[serde(default = "defaults::dump_mod_directory")]
    pub dump_mod_directory: PathBuf,

    /// Directory with the extracted locale files, `<mod>.json` each
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_directory: Option<PathBuf>,

    /// Number of game processes running in parallel
    #[serde(default = "default_number_of_instances")]
    pub number_of_instances: usize,

    /// Attempts per combination before it is skipped
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Timeout of a single game process in seconds
    #[serde(default = "default_process_timeout_secs")]
    pub process_timeout_secs: u64,

    /// Delay between two attempts of the same combination in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

mod defaults {
    use std::path::PathBuf;

    pub fn factorio_directory() -> PathBuf {
        PathBuf::from("factorio")
    }

    pub fn mods_directory() -> PathBuf {
        PathBuf::from("factorio/mods")
    }

    pub fn instances_directory() -> PathBuf {
        PathBuf::from("instances")
    }

    pub fn data_directory() -> PathBuf {
        PathBuf::from("data")
    }

    pub fn dump_mod_directory() -> PathBuf {
        PathBuf::from("dump-mod")
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            factorio_directory: defaults::factorio_directory(),
            mods_directory: defaults::mods_directory(),
            instances_directory: defaults::instances_directory(),
            data_directory: defaults::data_directory(),
            dump_mod_directory: defaults::dump_mod_directory(),
            locale_directory: None,
            number_of_instances: DEFAULT_NUMBER_OF_INSTANCES,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            process_timeout_secs: default_process_timeout_secs(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl ExportConfig {
    /// Load the configuration, see the module documentation for the lookup order.
    ///
    /// The loaded configuration has its paths expanded and is validated.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let config = match explicit {
            Some(path) => Self::load_from(&path).await?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path).await?,
                _ => {
                    tracing::debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        let config = config.expanded()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the configuration file at `path`, without expansion or validation.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(ExportError::from).with_context(|| {
            format!("Failed to parse configuration from {}", path.display())
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// The default location of the configuration file, if a config directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("factorio-export").join("config.toml"))
    }

    /// Expand `~` and environment variables in all paths.
    pub fn expanded(mut self) -> Result<Self> {
        self.factorio_directory = expand_path(&self.factorio_directory)?;
        self.mods_directory = expand_path(&self.mods_directory)?;
        self.instances_directory = expand_path(&self.instances_directory)?;
        self.data_directory = expand_path(&self.data_directory)?;
        self.dump_mod_directory = expand_path(&self.dump_mod_directory)?;
        self.locale_directory = self.locale_directory.as_deref().map(expand_path).transpose()?;
        Ok(self)
    }

    /// Reject settings the exporter cannot work with.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.number_of_instances == 0 {
            return Err(ExportError::Config {
                message: "number_of_instances must be at least 1".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ExportError::Config {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        if self.process_timeout_secs == 0 {
            return Err(ExportError::Config {
                message: "process_timeout_secs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Timeout of a single game process.
    #[must_use]
    pub const fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }

    /// Delay between two attempts of the same combination.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map_err(|e| ExportError::Config {
            message: format!("Failed to expand path '{raw}': {e}"),
        })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_values_use_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "number_of_instances = 2\ndata_directory = \"/srv/fie\"\n")
            .await
            .unwrap();

        let config = ExportConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.number_of_instances, 2);
        assert_eq!(config.data_directory, PathBuf::from("/srv/fie"));
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.process_timeout(), DEFAULT_PROCESS_TIMEOUT);
        assert!(config.locale_directory.is_none());
    }

    #[tokio::test]
    async fn test_zero_instances_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "number_of_instances = 0\n").await.unwrap();

        let error = ExportConfig::load(Some(&path)).await.unwrap_err();
        assert!(matches!(error.downcast_ref::<ExportError>(), Some(ExportError::Config { .. })));
    }

    #[tokio::test]
    async fn test_explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(ExportConfig::load(Some(&temp.path().join("missing.toml"))).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "number_of_instances = \"many\"\n").await.unwrap();

        let error = ExportConfig::load_from(&path).await.unwrap_err();
        assert!(error.chain().any(|e| e.downcast_ref::<ExportError>().is_some()));
    }

    #[test]
    fn test_home_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let config = ExportConfig {
            data_directory: PathBuf::from("~/fie-data"),
            ..ExportConfig::default()
        }
        .expanded()
        .unwrap();
        assert_eq!(config.data_directory, home.join("fie-data"));
    }

    #[test]
    fn test_serialized_config_parses_back() {
        let config = ExportConfig {
            locale_directory: Some(PathBuf::from("/srv/locale")),
            ..ExportConfig::default()
        };
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: ExportConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }
}
