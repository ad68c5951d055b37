//! Utility functions and types used throughout the application.

use crate::error::{Error, Result};
use std::path::PathBuf;

pub mod file_system;

/// Converts a vector of string slices to a vector of owned strings.
pub fn to_owned(vec: Vec<impl AsRef<str>>) -> Vec<String> {
    vec.into_iter().map(|s| s.as_ref().to_owned()).collect()
}

/// Returns the platform-specific file name of an executable.
pub fn find_executable(name: impl AsRef<str>) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.exe", name.as_ref())
    } else {
        name.as_ref().to_string()
    }
}

/// Locates an executable, preferring an explicit path over a `PATH` lookup.
///
/// # Errors
///
/// Returns [`Error::MissingEngine`] when the executable cannot be found.
pub fn locate_executable(name: &str, explicit: Option<PathBuf>) -> Result<PathBuf> {
    #[cfg(feature = "tracing")]
    tracing::debug!("Locating executable {} (explicit: {:?})", name, explicit);

    match explicit {
        Some(path) if path.is_file() => Ok(path),
        Some(path) => Err(Error::MissingEngine(path.display().to_string())),
        None => which::which(find_executable(name)).map_err(|_| Error::MissingEngine(name.to_string())),
    }
}
