//! Display names from executable version resources
//!
//! On Windows the `FileDescription` entry of the version resource is used
//! when present; otherwise, and on other platforms, the file stem.

use std::path::Path;
use tracing::debug;

#[cfg(windows)]
use windows::core::PCWSTR;

const UNKNOWN_NAME: &str = "Unknown Application";

/// Get the display name of an executable, falling back to its file stem
pub fn display_name(path: &Path) -> String {
    #[cfg(windows)]
    {
        if let Some(description) = file_description(path) {
            return description;
        }
    }

    debug!("Using file name as display name for {}", path.display());
    file_stem_name(path)
}

/// File name without extension
pub fn file_stem_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_string()
}

/// Query `FileDescription` from the version resource
///
/// # Safety
///
/// Buffers are sized by `GetFileVersionInfoSizeW`; `VerQueryValueW` results are
/// checked for null and zero length before the returned slice is read.
#[cfg(windows)]
#[expect(
    unsafe_code,
    reason = "Windows FFI for reading version resources via GetFileVersionInfoW/VerQueryValueW"
)]
fn file_description(path: &Path) -> Option<String> {
    use std::os::windows::ffi::OsStrExt;
    use windows::Win32::Storage::FileSystem::{
        GetFileVersionInfoSizeW, GetFileVersionInfoW, VerQueryValueW,
    };

    let wide_path: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    unsafe {
        let mut handle: u32 = 0;
        let size = GetFileVersionInfoSizeW(PCWSTR(wide_path.as_ptr()), Some(&raw mut handle));
        if size == 0 {
            return None;
        }

        let mut buffer = vec![0u8; size as usize];
        GetFileVersionInfoW(
            PCWSTR(wide_path.as_ptr()),
            Some(handle),
            size,
            buffer.as_mut_ptr().cast(),
        )
        .ok()?;

        // English (US), English (US) Windows-1252, language neutral
        let queries = [
            "\\StringFileInfo\\040904B0\\FileDescription\0",
            "\\StringFileInfo\\040904E4\\FileDescription\0",
            "\\StringFileInfo\\000004B0\\FileDescription\0",
        ];

        for query in &queries {
            let query_wide: Vec<u16> = query.encode_utf16().collect();
            let mut value_ptr: *mut u16 = std::ptr::null_mut();
            let mut value_len: u32 = 0;

            let found = VerQueryValueW(
                buffer.as_ptr().cast(),
                PCWSTR(query_wide.as_ptr()),
                (&raw mut value_ptr).cast(),
                &raw mut value_len,
            )
            .as_bool();

            if !found || value_ptr.is_null() || value_len == 0 {
                continue;
            }

            let chars = std::slice::from_raw_parts(value_ptr, value_len as usize);
            let len = chars.iter().position(|&c| c == 0).unwrap_or(chars.len());
            if let Ok(description) = String::from_utf16(&chars[..len]) {
                let description = description.trim().to_string();
                if !description.is_empty() {
                    return Some(description);
                }
            }
        }
    }

    None
}
