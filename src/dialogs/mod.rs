//! Dialog and window collaborators
//!
//! The controller asks a `DialogHost` for file and folder choices, waits
//! for scans under a `ProgressHost` and is shown modally by a `WindowHost`.
//! `NativeDialogs` (Windows only) backs the choosers with the system file
//! dialogs.

#[cfg(windows)]
pub mod native;

#[cfg(windows)]
pub use native::NativeDialogs;

use crate::controller::InstalledGamesController;
use crate::error::Result;
use std::path::PathBuf;

/// How a modal session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResult {
    /// Confirmed; selected games are available
    Accepted,
    /// Dismissed without importing
    Cancelled,
}

/// File filter offered by a file chooser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter<'a> {
    /// Label shown to the user
    pub name: &'a str,
    /// Accepted extensions, lowercase without dot
    pub extensions: &'a [&'a str],
}

/// Modal file and folder choosers
pub trait DialogHost {
    /// Ask for one file, `None` when the user cancels
    fn select_file(&self, filter: FileFilter<'_>) -> Option<PathBuf>;

    /// Ask for a folder, `None` when the user cancels
    fn select_folder(&self) -> Option<PathBuf>;
}

/// How a progress session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOutcome {
    /// The operation ran to completion
    Finished,
    /// The user aborted; the caller cancels the operation
    Cancelled,
}

/// Cancellable global progress indicator
pub trait ProgressHost {
    /// Show `title` and call `step` until it returns true
    ///
    /// Each call to `step` blocks for a short interval at most. When the
    /// user aborts, stop calling it and return `ProgressOutcome::Cancelled`.
    /// Errors from `step` end the session and are returned as is.
    fn run(
        &self,
        title: &str,
        step: &mut dyn FnMut() -> Result<bool>,
    ) -> Result<ProgressOutcome>;
}

/// Modal host showing the import workflow
///
/// `show` returns once the session ends; the host reports the outcome by
/// calling `InstalledGamesController::close_view` or
/// `InstalledGamesController::confirm_dialog`.
pub trait WindowHost {
    /// Run the modal session
    fn show(&self, controller: &mut InstalledGamesController);
}
