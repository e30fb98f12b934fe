//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::ircd::IrcdConfig;
use super::services::{ChanServConfig, ConsoleConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Services configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Services server information.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: Option<DatabaseConfig>,
    /// ChanServ settings.
    #[serde(default)]
    pub chanserv: ChanServConfig,
    /// Capabilities of the linked IRC daemon.
    #[serde(default)]
    pub ircd: IrcdConfig,
    /// Local operator console.
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Database path, falling back to `services.db`.
    pub fn database_path(&self) -> &str {
        self.database
            .as_ref()
            .map(|d| d.path.as_str())
            .unwrap_or("services.db")
    }
}

/// Services server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Services server name (e.g., "services.straylight.net").
    pub name: String,
    /// Network name (e.g., "Straylight").
    pub network: String,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file, or `:memory:`.
    pub path: String,
}
