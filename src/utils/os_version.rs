//! Operating system version detection
//!
//! Store applications are only enumerated on Windows 10 and 11.

/// Windows version as reported by `RtlGetVersion`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowsVersion {
    /// Major version (10 for both Windows 10 and 11)
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Build number (22000+ is Windows 11)
    pub build: u32,
}

impl WindowsVersion {
    /// Whether this version ships the packaged-app model the store enumeration needs
    pub fn supports_store_apps(self) -> bool {
        self.major >= 10
    }
}

/// Detect the running Windows version, `None` on other platforms or on failure
pub fn detect() -> Option<WindowsVersion> {
    #[cfg(windows)]
    {
        match rtl_get_version() {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!("Failed to detect Windows version: {}", e);
                None
            }
        }
    }

    #[cfg(not(windows))]
    {
        None
    }
}

/// Whether store apps can be enumerated on this system
pub fn store_apps_supported() -> bool {
    detect().is_some_and(WindowsVersion::supports_store_apps)
}

/// Gets the Windows version using `RtlGetVersion`.
///
/// # Safety
///
/// Sound FFI call: ntdll.dll and `RtlGetVersion` guaranteed present on Windows;
/// function pointer validated before transmute; structure correctly sized with
/// `dwOSVersionInfoSize`; return status checked before data access.
#[cfg(windows)]
#[expect(
    unsafe_code,
    reason = "Required for Windows FFI to call RtlGetVersion from ntdll.dll"
)]
fn rtl_get_version() -> crate::error::Result<WindowsVersion> {
    use crate::error::{ImportError, StringError};
    use std::mem::{size_of, transmute};
    use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
    use windows::Win32::System::SystemInformation::OSVERSIONINFOEXW;
    use windows::core::HSTRING;

    type RtlGetVersionFn = unsafe extern "system" fn(*mut OSVERSIONINFOEXW) -> i32;

    unsafe {
        let ntdll = LoadLibraryW(&HSTRING::from("ntdll.dll"))?;

        let Some(proc) = GetProcAddress(ntdll, windows::core::s!("RtlGetVersion")) else {
            return Err(ImportError::ConfigError(StringError::new(
                "RtlGetVersion not found in ntdll.dll",
            )));
        };

        let rtl_get_version: RtlGetVersionFn = transmute(proc);

        #[expect(
            clippy::cast_possible_truncation,
            reason = "size_of::<OSVERSIONINFOEXW>() is a compile-time constant that fits in u32"
        )]
        let mut info = OSVERSIONINFOEXW {
            dwOSVersionInfoSize: size_of::<OSVERSIONINFOEXW>() as u32,
            ..Default::default()
        };

        let status = rtl_get_version(&raw mut info);
        if status != 0 {
            return Err(ImportError::ConfigError(StringError::new(format!(
                "RtlGetVersion failed with status: {status}"
            ))));
        }

        Ok(WindowsVersion {
            major: info.dwMajorVersion,
            minor: info.dwMinorVersion,
            build: info.dwBuildNumber,
        })
    }
}
