//! Store package enumeration via Windows Runtime APIs
//!
//! Uses the `WinRT` `PackageManager` to list the packages installed for the
//! current user and converts each application package to a `Program`.
//!
//! # Filtering
//!
//! Framework and resource packages, and packages without a display name
//! (mostly system components), are skipped.

use crate::Result;
use crate::programs::Program;

/// Launcher used for store applications
pub const STORE_LAUNCHER: &str = "explorer.exe";

/// Application id used when the manifest entry point is not read
pub const DEFAULT_APP_ID: &str = "App";

/// Metadata of an installed store package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePackage {
    /// User-visible display name (e.g., "Calculator")
    pub display_name: String,

    /// Stable package identifier (e.g., "`Microsoft.WindowsCalculator_8wekyb3d8bbwe`")
    pub package_family_name: String,

    /// Application id within the package (typically "App")
    pub app_id: String,

    /// Package install directory
    pub install_location: Option<String>,

    /// Logo URI
    pub logo_uri: Option<String>,
}

impl StorePackage {
    /// Shell argument launching this package's application
    pub fn launch_arguments(&self) -> String {
        format!(
            "shell:AppsFolder\\{}!{}",
            self.package_family_name, self.app_id
        )
    }

    /// Convert to an importable program
    pub fn into_program(self) -> Program {
        let arguments = self.launch_arguments();
        Program {
            name: self.display_name,
            path: STORE_LAUNCHER.to_string(),
            work_dir: self.install_location,
            arguments: Some(arguments),
            app_id: Some(self.package_family_name),
            icon: self.logo_uri,
        }
    }
}

/// Enumerate store applications installed for the current user
///
/// # Platform
///
/// Windows 10 or later. Returns an empty vector on non-Windows platforms.
#[cfg(windows)]
pub fn enumerate_store_apps() -> Result<Vec<Program>> {
    use crate::error::ImportError;
    use windows::Management::Deployment::PackageManager;
    use windows::core::HSTRING;

    let package_manager =
        PackageManager::new().map_err(|e| ImportError::StoreEnumeration(Box::new(e)))?;

    // An empty security id means the current user
    let packages = package_manager
        .FindPackagesByUserSecurityId(&HSTRING::new())
        .map_err(|e| ImportError::StoreEnumeration(Box::new(e)))?;

    let mut programs = Vec::new();
    for package in packages {
        match read_package(&package) {
            Ok(Some(info)) => programs.push(info.into_program()),
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read store package: {}", e),
        }
    }

    tracing::debug!("Found {} store apps", programs.len());
    Ok(programs)
}

/// Read metadata of one package, `Ok(None)` for packages that are not apps
#[cfg(windows)]
fn read_package(package: &windows::ApplicationModel::Package) -> Result<Option<StorePackage>> {
    use crate::error::ImportError;

    let store_error = |e: windows::core::Error| ImportError::StoreEnumeration(Box::new(e));

    if package.IsFramework().map_err(store_error)?
        || package.IsResourcePackage().map_err(store_error)?
    {
        return Ok(None);
    }

    let display_name = package.DisplayName().map_err(store_error)?.to_string();
    if display_name.is_empty() {
        return Ok(None);
    }

    let package_family_name = package
        .Id()
        .and_then(|id| id.FamilyName())
        .map_err(store_error)?
        .to_string();

    // Location and logo are optional, packages being staged may lack both
    let install_location = package
        .InstalledLocation()
        .and_then(|folder| folder.Path())
        .ok()
        .map(|path| path.to_string());

    let logo_uri = package
        .Logo()
        .and_then(|uri| uri.ToString())
        .ok()
        .map(|uri| uri.to_string())
        .filter(|uri| !uri.is_empty());

    Ok(Some(StorePackage {
        display_name,
        package_family_name,
        app_id: DEFAULT_APP_ID.to_string(),
        install_location,
        logo_uri,
    }))
}

/// Enumerate store applications (always empty off Windows)
#[cfg(not(windows))]
pub fn enumerate_store_apps() -> Result<Vec<Program>> {
    Ok(Vec::new())
}
