//! Program source backed by the running operating system

use super::{CancelToken, Enumeration, Program, ProgramSource, folder, is_shortcut};
use crate::error::Result;
use crate::utils::{file_info, os_version};
use std::path::Path;
use tracing::debug;

/// Enumerates programs from the registry, the store and the file system
///
/// Registry and store enumeration only yield results on Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProgramSource;

impl SystemProgramSource {
    /// Create a new system program source
    pub fn new() -> Self {
        Self
    }
}

impl ProgramSource for SystemProgramSource {
    fn installed_programs(&self, cancel: &CancelToken) -> Result<Enumeration> {
        #[cfg(windows)]
        {
            super::registry::installed_programs(cancel)
        }

        #[cfg(not(windows))]
        {
            debug!("Installed program detection not supported on non-Windows platforms");
            if cancel.is_cancelled() {
                return Ok(Enumeration::Cancelled);
            }
            Ok(Enumeration::Complete(Vec::new()))
        }
    }

    fn store_apps(&self) -> Result<Vec<Program>> {
        crate::uwp::enumerate_store_apps()
    }

    fn executables_in_folder(
        &self,
        root: &Path,
        recursive: bool,
        cancel: &CancelToken,
    ) -> Result<Enumeration> {
        folder::executables_in_folder(root, recursive, cancel, describe_file)
    }

    fn program_from_path(&self, path: &Path) -> Result<Program> {
        describe_file(path)
    }

    fn supports_store_apps(&self) -> bool {
        os_version::store_apps_supported()
    }
}

/// Describe a single executable, batch file or shortcut
///
/// The working directory is the containing folder. Executables and shortcuts
/// reference themselves as the icon source; batch files carry no icon.
pub fn describe_file(path: &Path) -> Result<Program> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is a directory", path.display()),
        )
        .into());
    }

    let is_batch = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bat"));

    let name = if is_batch || is_shortcut(path) {
        file_info::file_stem_name(path)
    } else {
        file_info::display_name(path)
    };

    let path_string = path.to_string_lossy().into_owned();
    let program = Program {
        name,
        work_dir: path.parent().map(|dir| dir.to_string_lossy().into_owned()),
        arguments: None,
        app_id: None,
        icon: (!is_batch).then(|| path_string.clone()),
        path: path_string,
    };

    debug!("Described {}: {:?}", path.display(), program.name);
    Ok(program)
}
