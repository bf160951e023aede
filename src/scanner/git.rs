//! Paths committed to git, used to keep them out of scan results.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Source of the set of paths tracked by a version-control system.
pub trait TrackedPaths {
    /// Absolute paths tracked at HEAD of the repository containing `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be queried.
    fn tracked_paths(&self, root: &Path) -> Result<HashSet<PathBuf>>;
}

/// Queries the `git` binary on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl GitCli {
    fn run(root: &Path, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .context("Failed to run git")?;

        if !output.status.success() {
            return Err(anyhow::anyhow!(
                "git {} failed in {}: {}",
                args.first().copied().unwrap_or_default(),
                root.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(output.stdout)
    }
}

impl TrackedPaths for GitCli {
    fn tracked_paths(&self, root: &Path) -> Result<HashSet<PathBuf>> {
        let toplevel = Self::run(root, &["rev-parse", "--show-toplevel"])?;
        let toplevel = PathBuf::from(OsStr::from_bytes(toplevel.trim_ascii_end()));

        let listing = Self::run(
            root,
            &["ls-tree", "-r", "--full-tree", "--name-only", "-z", "HEAD"],
        )?;

        let tracked: HashSet<PathBuf> = listing
            .split(|&b| b == 0)
            .filter(|entry| !entry.is_empty())
            .map(|entry| toplevel.join(OsStr::from_bytes(entry)))
            .collect();

        debug!(
            toplevel = %toplevel.display(),
            count = tracked.len(),
            "loaded git tracked paths"
        );
        Ok(tracked)
    }
}

/// A fixed set, for callers that already know the answer.
#[derive(Debug, Default, Clone)]
pub struct StaticPaths(pub HashSet<PathBuf>);

impl TrackedPaths for StaticPaths {
    fn tracked_paths(&self, _root: &Path) -> Result<HashSet<PathBuf>> {
        Ok(self.0.clone())
    }
}
