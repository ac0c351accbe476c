//! Icon extraction from executables
//!
//! Extracts the primary embedded icon of a binary using Shell32 and converts
//! it to RGBA pixels. `SHGetFileInfoW` is used when the file has no icon
//! resources of its own (shortcuts, some launchers).

use crate::error::{ImportError, Result};
use image::RgbaImage;
use std::path::Path;

#[cfg(windows)]
use tracing::{debug, warn};
#[cfg(windows)]
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAP, BITMAPINFO, BITMAPINFOHEADER, CreateCompatibleDC, DIB_RGB_COLORS, DeleteDC,
    DeleteObject, GetDIBits, GetObjectW, SelectObject,
};
#[cfg(windows)]
use windows::Win32::Storage::FileSystem::FILE_FLAGS_AND_ATTRIBUTES;
#[cfg(windows)]
use windows::Win32::UI::Shell::{
    ExtractIconExW, SHFILEINFOW, SHGFI_ICON, SHGFI_LARGEICON, SHGetFileInfoW,
};
#[cfg(windows)]
use windows::Win32::UI::WindowsAndMessaging::{DestroyIcon, GetIconInfo, HICON, ICONINFO};
#[cfg(windows)]
use windows::core::PCWSTR;

/// Extract the primary icon embedded in `path`
pub fn extract_main_icon(#[allow(unused_variables)] path: &Path) -> Result<RgbaImage> {
    #[cfg(windows)]
    {
        extract_main_icon_windows(path)
    }

    #[cfg(not(windows))]
    {
        Err(ImportError::UnsupportedPlatform("Embedded icon extraction"))
    }
}

/// Owned icon handle destroyed on drop
#[cfg(windows)]
struct IconHandle(HICON);

#[cfg(windows)]
impl Drop for IconHandle {
    #[expect(unsafe_code, reason = "Windows FFI for icon handle cleanup")]
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyIcon(self.0);
        }
    }
}

#[cfg(windows)]
#[expect(
    unsafe_code,
    reason = "Windows FFI for ExtractIconExW and SHGetFileInfoW"
)]
fn extract_main_icon_windows(path: &Path) -> Result<RgbaImage> {
    use std::os::windows::ffi::OsStrExt;

    let wide_path: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    debug!("Extracting icon from: {}", path.display());

    let mut large_icon = HICON::default();
    let extracted = unsafe {
        ExtractIconExW(
            PCWSTR(wide_path.as_ptr()),
            0,
            Some(&raw mut large_icon),
            None,
            1,
        )
    };

    let icon = if extracted == 0 || large_icon.is_invalid() {
        debug!("ExtractIconExW found nothing in {}, trying SHGetFileInfoW", path.display());
        let mut file_info = SHFILEINFOW::default();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "size_of::<SHFILEINFOW>() is a compile-time constant that fits in u32"
        )]
        let result = unsafe {
            SHGetFileInfoW(
                PCWSTR(wide_path.as_ptr()),
                FILE_FLAGS_AND_ATTRIBUTES(0),
                Some(&raw mut file_info),
                std::mem::size_of::<SHFILEINFOW>() as u32,
                SHGFI_ICON | SHGFI_LARGEICON,
            )
        };
        if result == 0 || file_info.hIcon.is_invalid() {
            warn!("No icon available for {}", path.display());
            return Err(ImportError::IconExtraction(format!(
                "no icon in {}",
                path.display()
            )));
        }
        IconHandle(file_info.hIcon)
    } else {
        IconHandle(large_icon)
    };

    hicon_to_rgba(&icon)
}

/// Convert an icon handle to RGBA pixels
///
/// # Safety
///
/// The icon bitmaps returned by `GetIconInfo` are owned by this function and
/// deleted on every exit path; the DIB buffer is sized from the bitmap header.
#[cfg(windows)]
#[expect(unsafe_code, reason = "Windows GDI calls to read icon bitmap bits")]
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    reason = "Bitmap dimensions are small positive values reported by GDI"
)]
fn hicon_to_rgba(icon: &IconHandle) -> Result<RgbaImage> {
    unsafe {
        let mut icon_info = ICONINFO::default();
        GetIconInfo(icon.0, &raw mut icon_info)?;

        let color_bitmap = icon_info.hbmColor;
        let mask_bitmap = icon_info.hbmMask;
        let cleanup = || {
            let _ = DeleteObject(color_bitmap.into());
            let _ = DeleteObject(mask_bitmap.into());
        };

        let mut bitmap = BITMAP::default();
        if GetObjectW(
            color_bitmap.into(),
            std::mem::size_of::<BITMAP>() as i32,
            Some((&raw mut bitmap).cast()),
        ) == 0
        {
            cleanup();
            return Err(ImportError::IconExtraction(
                "icon has no color bitmap".to_string(),
            ));
        }

        let width = bitmap.bmWidth as u32;
        let height = bitmap.bmHeight as u32;

        let hdc = CreateCompatibleDC(None);
        if hdc.is_invalid() {
            cleanup();
            return Err(windows::core::Error::from_thread().into());
        }
        let old_bitmap = SelectObject(hdc, color_bitmap.into());

        let mut bmi = BITMAPINFO::default();
        bmi.bmiHeader.biSize = std::mem::size_of::<BITMAPINFOHEADER>() as u32;
        bmi.bmiHeader.biWidth = width as i32;
        bmi.bmiHeader.biHeight = -(height as i32); // Negative for top-down DIB
        bmi.bmiHeader.biPlanes = 1;
        bmi.bmiHeader.biBitCount = 32;
        bmi.bmiHeader.biCompression = BI_RGB.0;

        let mut buffer = vec![0u8; width as usize * height as usize * 4];
        let lines = GetDIBits(
            hdc,
            color_bitmap,
            0,
            height,
            Some(buffer.as_mut_ptr().cast()),
            &raw mut bmi,
            DIB_RGB_COLORS,
        );

        let _ = SelectObject(hdc, old_bitmap);
        let _ = DeleteDC(hdc);
        cleanup();

        if lines == 0 {
            return Err(windows::core::Error::from_thread().into());
        }

        bgra_to_rgba(&mut buffer);
        RgbaImage::from_raw(width, height, buffer).ok_or_else(|| {
            ImportError::IconExtraction("bitmap size does not match pixel buffer".to_string())
        })
    }
}

/// Swap BGRA to RGBA in place; icons without alpha data become opaque
#[cfg_attr(not(windows), allow(dead_code))]
fn bgra_to_rgba(buffer: &mut [u8]) {
    let has_alpha = buffer.chunks_exact(4).any(|px| px[3] != 0);
    for px in buffer.chunks_exact_mut(4) {
        px.swap(0, 2);
        if !has_alpha {
            px[3] = 255;
        }
    }
}
