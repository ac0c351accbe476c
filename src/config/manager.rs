//! Loading and saving importer settings
//!
//! Settings live in %APPDATA%\GameImport\settings.json. Saves go through a
//! temporary file in the same directory that is persisted over the target.

use crate::config::models::ImporterSettings;
use crate::error::{ImportError, Result, StringError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SETTINGS_FILE: &str = "settings.json";

/// Settings manager
pub struct ConfigManager;

impl ConfigManager {
    /// Application data directory
    ///
    /// Returns: %APPDATA%\GameImport, or .\GameImport when APPDATA is unset
    pub fn data_dir() -> PathBuf {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("GameImport")
    }

    /// Get the path to the settings file
    pub fn get_config_path() -> PathBuf {
        Self::data_dir().join(SETTINGS_FILE)
    }

    /// Load settings from the default location
    pub fn load() -> Result<ImporterSettings> {
        Self::load_from(&Self::get_config_path())
    }

    /// Load settings from `path`
    ///
    /// A missing or corrupt file yields default settings.
    pub fn load_from(path: &Path) -> Result<ImporterSettings> {
        if !path.exists() {
            info!("Settings file not found, using defaults");
            return Ok(ImporterSettings::default());
        }

        let json = std::fs::read_to_string(path)?;
        match serde_json::from_str(&json) {
            Ok(settings) => {
                info!("Settings loaded from {}", path.display());
                Ok(settings)
            }
            Err(e) => {
                warn!("Failed to parse settings, using defaults: {}", e);
                Ok(ImporterSettings::default())
            }
        }
    }

    /// Save settings to the default location
    pub fn save(settings: &ImporterSettings) -> Result<()> {
        Self::save_to(&Self::get_config_path(), settings)
    }

    /// Save settings to `path` with an atomic write
    pub fn save_to(path: &Path, settings: &ImporterSettings) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| ImportError::ConfigError(StringError::new("Invalid settings path")))?;
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(settings)?;
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(json.as_bytes())?;
        temp.persist(path)
            .map_err(|e| ImportError::ConfigError(Box::new(e)))?;

        info!("Settings saved to {}", path.display());
        Ok(())
    }
}
