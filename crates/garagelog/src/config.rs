//! Configuration management for garagelog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "garagelog";

/// Default store database file name.
const DATABASE_FILE_NAME: &str = "vehicle.db";

/// Default filename prefix for generated backup archives.
const DEFAULT_BACKUP_PREFIX: &str = "garagelog_backup";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `GARAGELOG_`)
/// 2. TOML config file at `~/.config/garagelog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration.
    pub store: StoreConfig,
    /// Backup configuration.
    pub backup: BackupConfig,
}

/// Store-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the store database file.
    /// Defaults to `~/.local/share/garagelog/vehicle.db`
    pub database_path: Option<PathBuf>,
}

/// Backup-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Directory where archives are written when no output path is given.
    /// Defaults to the data directory.
    pub archive_dir: Option<PathBuf>,
    /// Filename prefix for generated archive names.
    pub filename_prefix: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            archive_dir: None,
            filename_prefix: DEFAULT_BACKUP_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `GARAGELOG_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("GARAGELOG_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.backup.filename_prefix.is_empty() {
            return Err(Error::ConfigValidation {
                message: "filename_prefix must not be empty".to_string(),
            });
        }

        // The prefix is joined onto the archive directory and must stay a
        // bare file stem.
        if self.backup.filename_prefix.contains(['/', '\\']) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "filename_prefix must not contain path separators: {}",
                    self.backup.filename_prefix
                ),
            });
        }

        Ok(())
    }

    /// Get the store database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the backup archive directory, resolving defaults if not set.
    #[must_use]
    pub fn archive_dir(&self) -> PathBuf {
        self.backup
            .archive_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Build the default archive path for an export started now.
    #[must_use]
    pub fn default_archive_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.archive_dir()
            .join(format!("{}_{stamp}.zip", self.backup.filename_prefix))
    }
}
