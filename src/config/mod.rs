//! Importer settings
//!
//! Settings are stored in %APPDATA%\GameImport\settings.json and written
//! atomically so an interrupted save never leaves a truncated file.

pub mod manager;
pub mod models;

pub use manager::ConfigManager;
pub use models::ImporterSettings;
