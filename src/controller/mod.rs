//! Import workflow controller module
//!
//! This module turns discovered programs into library-ready game metadata.
//!
//! # Overview
//!
//! - `ImportableProgram`: a program plus its import mark and memoized icon
//! - `ImportedPaths` / `is_visible`: dedup filter hiding already imported games
//! - `ScanState`: lifecycle of the background scans
//! - `finalize`: converts marked items into `GameMetadata`
//! - `InstalledGamesController`: the state container tying these together
//!
//! # Data Flow
//!
//! ```text
//! ProgramSource → scan worker → ScanMessage → poll_scan/wait_for_scan
//!                                                   ↓
//!                        programs → dedup filter → user marks items
//!                                                   ↓
//!                              confirm_dialog → Vec<GameMetadata> → database
//! ```
//!
//! # Threading
//!
//! The controller lives on one thread. Scans run on worker threads and hand
//! their results back over a channel; nothing outside the controller writes
//! the item list.

pub mod filter;
pub mod finalizer;
pub mod importable;
pub mod installed_games;
pub mod scan;

pub use filter::{ImportedPaths, is_visible};
pub use finalizer::{build_game_metadata, finalize};
pub use importable::{ImportableProgram, STORE_DISPLAY_PATH};
pub use installed_games::{EXECUTABLE_FILTER, InstalledGamesController};
pub use scan::{ScanKind, ScanState};
