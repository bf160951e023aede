//! Utility functions and helpers.
//!
//! - [`hash`]: SHA-1 digests
//! - [`permissions`]: `st_mode` handling
//! - [`serialization`]: Binary encoding of stored values

/// SHA-1 content digests
pub mod hash;
/// Unix mode and permission handling
pub mod permissions;
/// Binary serialization utilities
pub mod serialization;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Expands a path starting with `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Path cannot be empty");
    }
    if path == "~" {
        return dirs::home_dir().context("Could not find home directory");
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Makes `path` absolute against the current directory without touching the
/// filesystem, so a trailing symlink is kept as the symlink itself.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Tilde-expand then absolutize a user supplied path.
///
/// # Errors
///
/// Returns an error if the path is empty or cannot be made absolute.
pub fn resolve_user_path(path: &str) -> Result<PathBuf> {
    absolute_path(&expand_tilde(path)?)
}
