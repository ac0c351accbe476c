//! Shared helpers for unit tests

use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes tests that point APPDATA somewhere else
static APPDATA_LOCK: Mutex<()> = Mutex::new(());

/// Create a temporary directory removed on drop
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Points APPDATA at a temporary directory for the guard's lifetime
///
/// Holds `APPDATA_LOCK` until dropped, so tests touching APPDATA run one at
/// a time even under the parallel test runner. The previous value is
/// restored on drop, including when the test panics.
pub struct AppdataGuard {
    original: Option<String>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only environment mutation serialized by APPDATA_LOCK"
)]
impl AppdataGuard {
    /// Set APPDATA to `temp_dir`
    pub fn new(temp_dir: &TempDir) -> Self {
        // A panicking test poisons the lock; the guarded state is still valid
        let lock = APPDATA_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let original = std::env::var("APPDATA").ok();
        // SAFETY: APPDATA_LOCK is held, no other test reads or writes APPDATA
        unsafe {
            std::env::set_var("APPDATA", temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only environment mutation serialized by APPDATA_LOCK"
)]
impl Drop for AppdataGuard {
    fn drop(&mut self) {
        // SAFETY: the lock is still held by this guard
        unsafe {
            match &self.original {
                Some(original) => std::env::set_var("APPDATA", original),
                None => std::env::remove_var("APPDATA"),
            }
        }
    }
}
