//! Utility modules
//!
//! Provides logging setup, OS version detection, executable display names and
//! string helpers for names and Windows-style paths.

pub mod file_info;
pub mod logging;
pub mod os_version;
pub mod strings;

pub use logging::init_logging;
pub use strings::remove_trademarks;
