//! Application configuration for `DAMWallet`.
//!
//! Settings come from an optional `damwallet.toml` in the working directory, then the
//! `DAMWALLET_DATABASE` environment variable. Every field has a default, so running
//! without any configuration uses `BaseDeDatos/Movements.db`.

/// Database connection and table creation
pub mod database;

/// Record of the last wallet file that was opened
pub mod last_file;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "damwallet.toml";

/// Environment variable overriding [`AppConfig::database_path`].
pub const DATABASE_ENV: &str = "DAMWALLET_DATABASE";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Wallet file used when nothing else selects one
    pub database_path: PathBuf,
    /// File remembering the last wallet that was opened
    pub last_file_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: Path::new("BaseDeDatos").join("Movements.db"),
            last_file_path: Path::new("config").join("last_path.txt"),
        }
    }
}

impl AppConfig {
    /// Applies the value of [`DATABASE_ENV`], if set and not blank.
    #[must_use]
    pub fn with_database_override(mut self, value: Option<String>) -> Self {
        if let Some(path) = value.filter(|v| !v.trim().is_empty()) {
            debug!("Database path overridden by {}: {}", DATABASE_ENV, path);
            self.database_path = PathBuf::from(path.trim());
        }
        self
    }

    /// Picks the wallet file to open.
    ///
    /// An explicit path wins, then the remembered last file (when it still points at a
    /// file), then [`AppConfig::database_path`].
    #[must_use]
    pub fn resolve_database_path(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return last_file::normalize_separators(&path.to_string_lossy());
        }
        last_file::read_last_path(&self.last_file_path)
            .unwrap_or_else(|| self.database_path.clone())
    }
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads [`CONFIG_FILE`] if present (defaults otherwise) and applies the environment.
pub fn load_app_configuration() -> Result<AppConfig> {
    let config = if Path::new(CONFIG_FILE).is_file() {
        info!("Loading configuration from {}", CONFIG_FILE);
        load_config(CONFIG_FILE)?
    } else {
        debug!("No {} found, using defaults", CONFIG_FILE);
        AppConfig::default()
    };

    Ok(config.with_database_override(std::env::var(DATABASE_ENV).ok()))
}
