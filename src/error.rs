//! Error types for `gameimport`
//!
//! This module defines all error types used throughout the importer,
//! providing clear error messages and proper error propagation.
//!
//! Variants wrapping foreign failures use `#[source]` so the full chain is
//! available to logging at the boundaries where errors are swallowed.

use thiserror::Error;
use uuid::Uuid;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for the importer
#[derive(Debug, Error)]
pub enum ImportError {
    /// Enumerating installed programs or folder contents failed
    #[error("Failed to enumerate programs: {0}")]
    Enumeration(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Enumerating store applications failed
    #[error("Failed to enumerate store apps: {0}")]
    StoreEnumeration(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation is only available on another platform
    #[error("{0} is not supported on this platform")]
    UnsupportedPlatform(&'static str),

    /// Extracting an embedded icon from a binary failed
    #[error("Icon extraction failed: {0}")]
    IconExtraction(String),

    /// Decoding an icon or image file failed
    #[error("Image decoding failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Encoding an icon as PNG failed
    #[error("PNG encoding failed: {0}")]
    PngEncoding(#[source] image::ImageError),

    /// Database collaborator failure
    #[error("Database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Game id is not present in the library
    #[error("Game not found: {0}")]
    GameNotFound(Uuid),

    /// Background scan worker stopped without reporting a result
    #[error("Scan worker failed: {0}")]
    ScanWorker(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Windows API error
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for importer operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Convert an error to a message suitable for printing from the CLI
pub fn get_user_friendly_error(error: &ImportError) -> String {
    match error {
        ImportError::Enumeration(e) => format!(
            "Could not list installed programs:\n\n{e}\n\n\
             Check that the folder exists and is readable."
        ),
        ImportError::StoreEnumeration(_) => "Could not list Microsoft Store apps.\n\n\
             Store apps require Windows 10 or later."
            .to_string(),
        ImportError::UnsupportedPlatform(what) => {
            format!("{what} is only available on Windows.")
        }
        ImportError::GameNotFound(id) => {
            format!("The game {id} is no longer in the library.")
        }
        ImportError::Io(e) => format!(
            "A file system error occurred:\n\n{e}\n\n\
             Please check file permissions and disk space."
        ),
        ImportError::Json(e) => format!(
            "The library or settings file is corrupted:\n\n{e}"
        ),
        other => other.to_string(),
    }
}
