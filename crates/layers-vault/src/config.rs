//! Vault configuration — parsed from TOML file + environment variable overrides.
//!
//! Priority: environment variables > config file > defaults.

use anyhow::{Context, Result};
use layers_core::DEFAULT_SEED_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Shortest seed length `validate` accepts for generated keys
pub const MIN_SEED_LENGTH: usize = 8;

/// Top-level vault configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Where the key database lives
    #[serde(default)]
    pub storage: StorageSection,

    /// Key generation settings
    #[serde(default)]
    pub keys: KeysSection,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Storage location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// Data directory holding the database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Database file name inside `data_dir`
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_file: default_db_file(),
        }
    }
}

/// Key generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysSection {
    /// Number of characters in generated seeds
    #[serde(default = "default_seed_length")]
    pub seed_length: usize,
}

impl Default for KeysSection {
    fn default() -> Self {
        Self {
            seed_length: default_seed_length(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Filter in `env_logger` syntax (error, warn, info, debug, trace, or
    /// per-module directives)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("layers-data")
}

fn default_db_file() -> String {
    "vault.db".to_string()
}

fn default_seed_length() -> usize {
    DEFAULT_SEED_LENGTH
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// Loading & environment override
// ============================================================================

impl VaultConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: VaultConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment
    /// overrides on top.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LAYERS_DATA_DIR`
    /// - `LAYERS_DB_FILE`
    /// - `LAYERS_SEED_LENGTH`
    /// - `LAYERS_LOG_LEVEL`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LAYERS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("LAYERS_DB_FILE") {
            self.storage.db_file = v;
        }
        if let Ok(v) = std::env::var("LAYERS_SEED_LENGTH") {
            match v.parse::<usize>() {
                Ok(len) => self.keys.seed_length = len,
                Err(_) => log::warn!("Ignoring LAYERS_SEED_LENGTH={:?}: not a number", v),
            }
        }
        if let Ok(v) = std::env::var("LAYERS_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Full path of the key database.
    pub fn db_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.db_file)
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.storage.db_file.is_empty(),
            "storage.db_file must not be empty"
        );
        anyhow::ensure!(
            self.keys.seed_length >= MIN_SEED_LENGTH,
            "keys.seed_length must be >= {}",
            MIN_SEED_LENGTH
        );
        Ok(())
    }
}

/// Install `env_logger` with the configured filter.
///
/// Safe to call more than once; later calls leave the first logger in place.
pub fn init_logging(config: &VaultConfig) {
    let _ = env_logger::Builder::new()
        .parse_filters(&config.logging.level)
        .try_init();
}

// ============================================================================
// Tests
// ============================================================================
