//! Program source adapter
//!
//! This module defines the discovered-program model and the `ProgramSource`
//! trait the import workflow enumerates through.
//!
//! # Overview
//!
//! - `Program`: a launchable thing found on disk, in the registry or in the store
//! - `ProgramSource`: enumeration seam; `SystemProgramSource` talks to the OS,
//!   tests plug in fakes
//! - `Enumeration`: result of a cancellable enumeration, either the complete
//!   list or `Cancelled`
//! - `CancelToken`: cooperative cancellation flag threaded through enumeration
//!
//! # Sources
//!
//! | Entry point            | Windows                         | Other platforms |
//! |------------------------|---------------------------------|-----------------|
//! | `installed_programs`   | Uninstall registry keys         | empty           |
//! | `store_apps`           | WinRT `PackageManager`          | empty           |
//! | `executables_in_folder`| walkdir                         | walkdir         |
//! | `program_from_path`    | exe version info for the name   | file stem       |

pub mod cancel;
pub mod folder;
#[cfg(windows)]
pub mod registry;
pub mod system;

pub use cancel::CancelToken;
pub use system::SystemProgramSource;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File extensions accepted as importable executables (lowercase, no dot)
pub const EXECUTABLE_EXTENSIONS: [&str; 3] = ["exe", "lnk", "bat"];

/// A program discovered on the system
///
/// Paths are kept as strings; they are compared case-insensitively and
/// rewritten textually when turned into library records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Display name
    pub name: String,
    /// Path of the executable, shortcut or launcher
    pub path: String,
    /// Working directory the program expects to be started in
    pub work_dir: Option<String>,
    /// Launch arguments
    pub arguments: Option<String>,
    /// Application id (package family name for store apps)
    pub app_id: Option<String>,
    /// Icon reference: `"<path>,<index>"`, a bare path, or a URI for store apps
    pub icon: Option<String>,
}

/// Platform kind of a discovered program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramKind {
    /// Desktop executable, shortcut or batch file
    Win32,
    /// Packaged application installed through the Microsoft Store
    StoreApp,
}

/// Outcome of a cancellable enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enumeration {
    /// Enumeration ran to the end
    Complete(Vec<Program>),
    /// The cancel token was observed before the end
    Cancelled,
}

/// Enumerates programs for the import workflow
///
/// Implementations must be usable from a background thread. Cancellable
/// operations check the token at natural iteration boundaries and return
/// `Enumeration::Cancelled` rather than an error.
pub trait ProgramSource: Send + Sync {
    /// Enumerate installed Win32 programs
    fn installed_programs(&self, cancel: &CancelToken) -> Result<Enumeration>;

    /// Enumerate installed store applications
    fn store_apps(&self) -> Result<Vec<Program>>;

    /// Enumerate executables below `root`
    fn executables_in_folder(
        &self,
        root: &Path,
        recursive: bool,
        cancel: &CancelToken,
    ) -> Result<Enumeration>;

    /// Build a program description for a single file
    fn program_from_path(&self, path: &Path) -> Result<Program>;

    /// Whether this source can enumerate store apps on the running system
    fn supports_store_apps(&self) -> bool {
        true
    }
}

/// Check whether `path` has one of the importable executable extensions
pub fn has_executable_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            EXECUTABLE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Check whether `path` points at a Windows shortcut
pub fn is_shortcut(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("lnk"))
}
