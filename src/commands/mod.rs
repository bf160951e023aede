//! Operations on the index, the staging set and the working tree.
//!
//! Each module exposes a library function returning data and an `execute`
//! wrapper that prints for the CLI.

pub mod commit;
pub mod doctor;
pub mod list;
pub mod pick;
pub mod remove;
pub mod reset;
pub mod scan;
pub mod show;
pub mod uninstall;
pub mod unpick;
pub mod which;

use crate::utils::resolve_user_path;
use anyhow::Result;
use std::path::PathBuf;

/// Tilde-expand and absolutize command-line path arguments.
///
/// Symlinks are not resolved: a path naming a link stays the link.
///
/// # Errors
///
/// Returns an error if any argument is empty or cannot be made absolute.
pub fn resolve_paths(args: &[String]) -> Result<Vec<PathBuf>> {
    args.iter().map(|arg| resolve_user_path(arg)).collect()
}
