//! Settings data model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted importer settings
///
/// Unknown or missing fields fall back to their defaults so settings files
/// written by older versions keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterSettings {
    /// Initial state of the "hide imported" toggle
    pub hide_imported: bool,
    /// Scan subfolders when scanning a folder
    pub scan_recursive: bool,
    /// Append store apps to full detection on supported systems
    pub detect_store_apps: bool,
    /// Propagate scan errors instead of logging them (debug builds only)
    pub surface_all_errors: bool,
    /// Library directory override
    pub library_dir: Option<PathBuf>,
}

impl Default for ImporterSettings {
    fn default() -> Self {
        Self {
            hide_imported: true,
            scan_recursive: true,
            detect_store_apps: true,
            surface_all_errors: false,
            library_dir: None,
        }
    }
}

impl ImporterSettings {
    /// Whether scan errors propagate out of the apply point
    ///
    /// Always false in release builds.
    pub fn surface_errors(&self) -> bool {
        cfg!(debug_assertions) && self.surface_all_errors
    }
}
