//! System file dialogs via `rfd`

use super::{DialogHost, FileFilter};
use std::path::PathBuf;

/// `DialogHost` backed by the native Windows file dialogs
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDialogs;

impl DialogHost for NativeDialogs {
    fn select_file(&self, filter: FileFilter<'_>) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select executable")
            .add_filter(filter.name, filter.extensions)
            .pick_file()
    }

    fn select_folder(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select folder to scan")
            .pick_folder()
    }
}
