//! Configuration loading and resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file is not fatal; it is logged and the
//! remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable naming the reference database
pub const ENV_DATABASE_PATH: &str = "BROKER_DATABASE_PATH";
/// Environment variable naming the log level filter
pub const ENV_LOG_LEVEL: &str = "BROKER_LOG_LEVEL";
/// Environment variable naming the derivation worker count
pub const ENV_WORKERS: &str = "BROKER_WORKERS";

/// Logging section of the TOML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// On-disk TOML configuration; every key is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub workers: Option<usize>,
    pub batch_size: Option<usize>,
}

/// Values used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub log_level: String,
    pub workers: usize,
    pub batch_size: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            database_path: default_data_folder().join("broker.db"),
            log_level: default_log_level(),
            workers: 4,
            batch_size: 500,
        }
    }
}

/// Fully resolved configuration handed to hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    pub workers: usize,
    pub batch_size: usize,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub workers: Option<usize>,
}

/// Resolves a [`BrokerConfig`] from CLI overrides, environment, TOML and defaults
pub struct ConfigResolver {
    cli: CliOverrides,
}

impl ConfigResolver {
    pub fn new(cli: CliOverrides) -> Self {
        Self { cli }
    }

    pub fn resolve(&self) -> Result<BrokerConfig> {
        let defaults = CompiledDefaults::for_current_platform();
        let toml_config = self.load_toml();

        let database_path = self
            .cli
            .database_path
            .clone()
            .or_else(|| std::env::var(ENV_DATABASE_PATH).ok().map(PathBuf::from))
            .or_else(|| toml_config.database_path.clone())
            .unwrap_or(defaults.database_path);

        let log_level = self
            .cli
            .log_level
            .clone()
            .or_else(|| std::env::var(ENV_LOG_LEVEL).ok())
            .unwrap_or_else(|| toml_config.logging.level.clone());

        let workers = match self.cli.workers {
            Some(workers) => workers,
            None => match std::env::var(ENV_WORKERS) {
                Ok(raw) => raw.trim().parse::<usize>().map_err(|e| {
                    Error::Config(format!("{} must be a positive integer: {}", ENV_WORKERS, e))
                })?,
                Err(_) => toml_config.workers.unwrap_or(defaults.workers),
            },
        };

        if workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }

        let batch_size = toml_config.batch_size.unwrap_or(defaults.batch_size).max(1);

        Ok(BrokerConfig {
            database_path,
            log_level,
            workers,
            batch_size,
        })
    }

    /// Load the TOML tier, falling back to an empty config on any failure
    fn load_toml(&self) -> TomlConfig {
        let path = match self.cli.config_file.clone().or_else(default_config_file) {
            Some(path) => path,
            None => return TomlConfig::default(),
        };

        if !path.exists() {
            if self.cli.config_file.is_some() {
                warn!("Config file not found: {} (using defaults)", path.display());
            }
            return TomlConfig::default();
        }

        match load_toml_config(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring unreadable config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Platform config file location (`<config_dir>/broker/config.toml`)
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("broker").join("config.toml"))
}

/// Get OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/broker (or /var/lib/broker for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("broker"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/broker"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("broker"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/broker"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("broker"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\broker"))
    } else {
        PathBuf::from("./broker_data")
    }
}
