//! Microsoft Store application support
//!
//! Store (UWP) applications have no standalone executable. They are launched
//! through the shell's `AppsFolder` namespace using the package family name
//! and the application id from the manifest, and their icon is a logo asset
//! inside the package referenced by URI.
//!
//! # Windows API Dependencies
//!
//! - `Management_Deployment`: package enumeration (`PackageManager`)
//! - `ApplicationModel`: package metadata types
//! - `Storage`: package install location
//! - `Foundation`: logo URIs
//!
//! On other platforms enumeration returns an empty list.

pub mod enumerator;

pub use enumerator::{StorePackage, enumerate_store_apps};
