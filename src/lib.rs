//! `gameimport` - Import installed programs into a game library
//!
//! Enumerates locally installed executables and store applications, lets the
//! caller pick which ones to import, and converts the picks into library
//! records. `InstalledGamesController` owns the session state and runs at most
//! one cancellable background scan, `JsonGameLibrary` is a file-backed
//! database the records can be inserted into.
//!
//! # Platform
//!
//! Registry, store-app and embedded-icon enumeration need Windows 10+. On other
//! platforms folder scans and manual picks still work; the Windows-only sources
//! report empty results.

// Module declarations
pub mod config;
pub mod controller;
pub mod dialogs;
pub mod error;
pub mod icon;
pub mod library;
pub mod programs;
pub mod utils;

// Store application support
pub mod uwp;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use controller::{InstalledGamesController, ScanState};
pub use error::{ImportError, Result};
pub use library::{GameDatabase, GameMetadata, JsonGameLibrary, add_importable_games};
pub use programs::{CancelToken, Enumeration, Program, ProgramSource, SystemProgramSource};
