//! Icon resolution and per-item memoization

use super::{IconImage, extractor, split_icon_reference};
use crate::error::Result;
use crate::programs::{Program, ProgramKind};
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Memoized icon of one importable item
///
/// Moves from `Unresolved` to `Resolved` or `Empty` on the first resolution
/// that produces an image or the sentinel, and never leaves those states.
#[derive(Debug, Clone, Default)]
pub enum IconState {
    /// Not resolved yet
    #[default]
    Unresolved,
    /// Resolved to a decoded image
    Resolved(IconImage),
    /// A reference existed but no image could be produced
    Empty,
}

impl IconState {
    /// Return the memoized icon, resolving it on first use
    ///
    /// Returns `None` when the program has no icon reference or the
    /// referenced file does not exist. That outcome is not memoized and the
    /// state stays `Unresolved`, so a later call looks for the file again.
    pub fn get_or_resolve(&mut self, kind: ProgramKind, program: &Program) -> Option<IconImage> {
        match self {
            Self::Resolved(icon) => return Some(icon.clone()),
            Self::Empty => return Some(IconImage::empty()),
            Self::Unresolved => {}
        }

        let icon = resolve_icon(kind, program)?;
        *self = if icon.is_empty_sentinel() {
            Self::Empty
        } else {
            Self::Resolved(icon.clone())
        };
        Some(icon)
    }

    /// The memoized icon without attempting resolution
    pub fn cached(&self) -> Option<IconImage> {
        match self {
            Self::Resolved(icon) => Some(icon.clone()),
            Self::Empty => Some(IconImage::empty()),
            Self::Unresolved => None,
        }
    }
}

/// Resolve a program's icon reference to an image
///
/// - no reference: `None`
/// - store app: decode the image the URI points at
/// - Win32: split off `,<index>` (an empty path means the program's own
///   executable), `None` if the file is missing, decode `.ico` files
///   directly and extract the primary embedded icon otherwise
///
/// Any decode or extraction failure is logged and yields the empty sentinel.
pub fn resolve_icon(kind: ProgramKind, program: &Program) -> Option<IconImage> {
    let reference = program.icon.as_deref().filter(|r| !r.is_empty())?;

    let image = match kind {
        ProgramKind::StoreApp => load_from_uri(reference),
        ProgramKind::Win32 => {
            let (path, _) = split_icon_reference(reference);
            let path = path.trim().trim_matches('"');
            let path = if path.is_empty() {
                program.path.as_str()
            } else {
                path
            };

            let path = Path::new(path);
            if !path.exists() {
                debug!("Icon source {} does not exist", path.display());
                return None;
            }

            if is_ico(path) {
                load_from_file(path)
            } else {
                match extractor::extract_main_icon(path) {
                    Ok(pixels) => Some(IconImage::new(pixels)),
                    Err(e) => {
                        warn!("Failed to extract icon from {}: {}", path.display(), e);
                        None
                    }
                }
            }
        }
    };

    Some(image.unwrap_or_else(IconImage::empty))
}

fn is_ico(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ico"))
}

fn load_from_file(path: &Path) -> Option<IconImage> {
    match decode_file(path) {
        Ok(icon) => Some(icon),
        Err(e) => {
            warn!("Failed to load icon {}: {}", path.display(), e);
            None
        }
    }
}

fn decode_file(path: &Path) -> Result<IconImage> {
    let decoded = image::open(path)?;
    Ok(IconImage::new(decoded.into_rgba8()))
}

fn load_from_uri(uri: &str) -> Option<IconImage> {
    match uri_to_path(uri) {
        Some(path) => load_from_file(&path),
        None => {
            warn!("Unsupported icon URI: {}", uri);
            None
        }
    }
}

/// Convert a `file:` URI or a plain path to a file system path
///
/// `file:///C:/x` keeps the drive letter, `file:///opt/x` is absolute and
/// `file://server/share/x` names a UNC share. Invalid escapes are kept
/// literally.
fn uri_to_path(uri: &str) -> Option<PathBuf> {
    let Some(rest) = uri.strip_prefix("file:") else {
        // Plain paths have no scheme, or a single drive letter before the colon
        return match uri.split_once(':') {
            Some((scheme, _)) if scheme.len() > 1 => None,
            _ => Some(PathBuf::from(uri)),
        };
    };

    let (host, path) = match rest.strip_prefix("//") {
        Some(authority) => authority.split_once('/').unwrap_or((authority, "")),
        None => ("", rest.trim_start_matches('/')),
    };
    let host = decode(host)?;
    let path = decode(path.trim_start_matches('/'))?;

    if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
        return Some(PathBuf::from(format!("//{host}/{path}")));
    }
    if path.as_bytes().get(1) == Some(&b':') {
        Some(PathBuf::from(path))
    } else {
        Some(PathBuf::from(format!("/{path}")))
    }
}

fn decode(input: &str) -> Option<String> {
    percent_decode_str(input)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
