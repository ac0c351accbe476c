//! Dedup filter over importable items

use super::importable::ImportableProgram;
use std::collections::HashSet;

/// Executable paths already present in the library, compared case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedPaths {
    paths: HashSet<String>,
}

impl ImportedPaths {
    /// Build the set from paths reported by the database
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|path| path.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether `path` is already imported
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(&path.to_lowercase())
    }

    /// Number of distinct paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no paths are imported
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Whether `item` is shown in the list
///
/// With `hide_imported` off every item is visible.
pub fn is_visible(item: &ImportableProgram, hide_imported: bool, imported: &ImportedPaths) -> bool {
    !hide_imported || !imported.contains(item.path())
}
