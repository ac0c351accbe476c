//! Game library
//!
//! The import workflow writes through the `GameDatabase` trait.
//! `JsonGameLibrary` is the file-backed implementation the binary uses.

pub mod database;
pub mod json_library;
pub mod models;

pub use database::{BufferedUpdate, GameDatabase, add_importable_games};
pub use json_library::{JsonGameLibrary, LibraryEvent};
pub use models::{
    CompletionStatusSettings, Game, GameAction, GameActionType, GameMetadata,
    INSTALLATION_DIRECTORY, MICROSOFT_STORE_SOURCE, MetadataFile, MetadataProperty,
    PC_WINDOWS_PLATFORM,
};
