//! Installed Win32 programs from the Uninstall registry keys
//!
//! Reads `HKLM` (native and WOW6432Node views) and `HKCU` Uninstall entries.
//! An entry is importable when its `DisplayIcon` points at an executable;
//! that executable becomes the program path, `InstallLocation` the working
//! directory.

use super::{CancelToken, Enumeration, Program};
use crate::error::Result;
use std::collections::HashSet;
use tracing::debug;
use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

/// Enumerate installed programs that expose a launchable executable
pub fn installed_programs(cancel: &CancelToken) -> Result<Enumeration> {
    let mut programs = Vec::new();
    let mut seen_paths = HashSet::new();
    let uninstall_keys = [
        (
            HKEY_LOCAL_MACHINE,
            r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
        ),
        (
            HKEY_LOCAL_MACHINE,
            r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
        ),
        (
            HKEY_CURRENT_USER,
            r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
        ),
    ];

    for (hkey, path) in &uninstall_keys {
        let key = match RegKey::predef(*hkey).open_subkey(path) {
            Ok(key) => key,
            Err(e) => {
                debug!("Cannot open registry path {}: {}", path, e);
                continue;
            }
        };

        for name in key.enum_keys().filter_map(std::result::Result::ok) {
            if cancel.is_cancelled() {
                return Ok(Enumeration::Cancelled);
            }

            let Ok(subkey) = key.open_subkey(&name) else {
                continue;
            };

            if let Some(program) = parse_uninstall_entry(&subkey)
                && seen_paths.insert(program.path.to_lowercase())
            {
                programs.push(program);
            }
        }
    }

    debug!("Found {} installed programs in registry", programs.len());
    Ok(Enumeration::Complete(programs))
}

fn parse_uninstall_entry(subkey: &RegKey) -> Option<Program> {
    let name: String = subkey.get_value("DisplayName").ok()?;
    if name.starts_with("KB") {
        return None;
    }

    let system_component: u32 = subkey.get_value("SystemComponent").unwrap_or(0);
    if system_component == 1 {
        return None;
    }

    let display_icon: String = subkey.get_value("DisplayIcon").ok()?;
    let exe_path = executable_from_icon(&display_icon)?;

    let work_dir = subkey
        .get_value::<String, _>("InstallLocation")
        .ok()
        .map(|dir| dir.trim().trim_matches('"').to_string())
        .filter(|dir| !dir.is_empty())
        .or_else(|| {
            std::path::Path::new(&exe_path)
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
        });

    Some(Program {
        name,
        path: exe_path,
        work_dir,
        arguments: None,
        app_id: None,
        icon: Some(display_icon),
    })
}

/// Extract the executable path from a `DisplayIcon` value such as `"C:\x\a.exe",0`
fn executable_from_icon(display_icon: &str) -> Option<String> {
    let (path, _) = crate::icon::split_icon_reference(display_icon.trim());
    let path = path.trim().trim_matches('"');
    let lower = path.to_lowercase();

    if !lower.ends_with(".exe") || lower.contains("unins") {
        return None;
    }

    Some(path.to_string())
}
