//! Program icons
//!
//! This module turns a program's icon reference into a renderable image.
//!
//! # Overview
//!
//! - `IconImage`: shared, cheaply cloned RGBA image
//! - Empty sentinel: one process-wide zero-sized `IconImage` standing for
//!   "the program had an icon reference but nothing could be loaded"
//! - `IconState`: per-item memo (unresolved, resolved or empty)
//! - `resolve_icon`: the resolution rules for Win32 and store programs
//! - `extractor`: embedded icon extraction from executables (Windows)
//!
//! # Icon References
//!
//! | Program kind | Reference                    | Resolution                        |
//! |--------------|------------------------------|-----------------------------------|
//! | Store app    | `file:///…/StoreLogo.png`    | decode the referenced file        |
//! | Win32        | `C:\x\game.ico`              | decode the icon file              |
//! | Win32        | `C:\x\game.exe,0` / `,0`     | extract primary embedded icon     |
//!
//! A reference whose file does not exist resolves to nothing, any decoding
//! or extraction failure resolves to the empty sentinel.

pub mod extractor;
pub mod resolver;

pub use resolver::{IconState, resolve_icon};

use crate::error::{ImportError, Result};
use image::{ImageFormat, RgbaImage};
use std::fmt;
use std::io::Cursor;
use std::sync::{Arc, LazyLock};

/// Typical PNG size for a 32x32 to 256x256 icon
const PNG_CAPACITY: usize = 8192;

static EMPTY_ICON: LazyLock<IconImage> =
    LazyLock::new(|| IconImage(Arc::new(RgbaImage::new(0, 0))));

/// Decoded icon pixels shared between an item and the records built from it
#[derive(Clone)]
pub struct IconImage(Arc<RgbaImage>);

impl IconImage {
    /// Wrap decoded pixels
    pub fn new(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    /// The shared empty sentinel
    pub fn empty() -> Self {
        EMPTY_ICON.clone()
    }

    /// Whether this is the shared empty sentinel
    pub fn is_empty_sentinel(&self) -> bool {
        Arc::ptr_eq(&self.0, &EMPTY_ICON.0)
    }

    /// Whether both handles refer to the same decoded image
    pub fn same_image(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Borrow the RGBA pixels
    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }

    /// Encode as PNG
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::with_capacity(PNG_CAPACITY);
        self.0
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(ImportError::PngEncoding)?;
        Ok(png_bytes)
    }
}

impl fmt::Debug for IconImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty_sentinel() {
            f.write_str("IconImage(empty)")
        } else {
            write!(f, "IconImage({}x{})", self.width(), self.height())
        }
    }
}

/// Split an icon reference of the form `<path>,<index>`
///
/// The last comma followed by a digit separates path and index. References
/// without such a comma are returned whole with no index.
pub fn split_icon_reference(reference: &str) -> (&str, Option<u32>) {
    for (comma, _) in reference.rmatch_indices(',') {
        let tail = &reference[comma + 1..];
        let digits_len = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        if digits_len > 0 {
            return (&reference[..comma], tail[..digits_len].parse().ok());
        }
    }

    (reference, None)
}
