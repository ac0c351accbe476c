//! Executable discovery below a folder
//!
//! Walks a directory tree with `walkdir` and describes every `.exe` found.
//! The cancel token is checked before each directory entry is processed.

use super::{CancelToken, Enumeration, Program};
use crate::error::{ImportError, Result, StringError};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Enumerate executables below `root`
///
/// `describe` turns a file path into a `Program`; files it fails on are
/// logged and skipped. Unreadable subdirectories are skipped as well, only a
/// missing or unreadable root is an error.
pub fn executables_in_folder<F>(
    root: &Path,
    recursive: bool,
    cancel: &CancelToken,
    mut describe: F,
) -> Result<Enumeration>
where
    F: FnMut(&Path) -> Result<Program>,
{
    if !root.is_dir() {
        return Err(ImportError::Enumeration(StringError::new(format!(
            "{} is not a directory",
            root.display()
        ))));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut programs = Vec::new();

    for entry in WalkDir::new(root).max_depth(max_depth).follow_links(false) {
        if cancel.is_cancelled() {
            info!("Folder scan of {} cancelled", root.display());
            return Ok(Enumeration::Cancelled);
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ImportError::Enumeration(Box::new(e)));
            }
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_exe(entry.path()) {
            continue;
        }

        match describe(entry.path()) {
            Ok(program) => programs.push(program),
            Err(e) => warn!("Failed to describe {}: {}", entry.path().display(), e),
        }
    }

    debug!(
        "Found {} executables under {}",
        programs.len(),
        root.display()
    );
    Ok(Enumeration::Complete(programs))
}

fn is_exe(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}
