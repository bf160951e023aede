//! Working-tree scan: classifies paths against the index and staging set.

/// Prune and ignore pattern sets
pub mod filters;
/// Git tracked-path provider
pub mod git;

pub use filters::PathFilters;
pub use git::{GitCli, StaticPaths, TrackedPaths};

use crate::DeckContext;
use crate::storage::FileRecord;
use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of a scan, each list in walk order.
///
/// `new`, `modified` and `picked` are disjoint. `missing` comes from the
/// index alone and may overlap none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Not indexed, not staged
    pub new: Vec<PathBuf>,
    /// Staged
    pub picked: Vec<PathBuf>,
    /// Indexed and differing from the stored record
    pub modified: Vec<PathBuf>,
    /// Indexed but gone from the filesystem
    pub missing: Vec<PathBuf>,
}

impl ScanReport {
    /// True if every list is empty.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.new.is_empty()
            && self.picked.is_empty()
            && self.modified.is_empty()
            && self.missing.is_empty()
    }
}

/// Walk the root and classify every regular file and symlink.
///
/// Read-only: neither table is modified. Entries the walker cannot read are
/// logged and skipped.
///
/// # Errors
///
/// Returns an error if the store cannot be read or, with git-awareness on,
/// the git-tracked set cannot be loaded.
pub fn scan(ctx: &DeckContext, compute_hash: bool) -> Result<ScanReport> {
    let filters = ctx.filters();
    let tracked = ctx.git_tracked()?;
    let mut report = ScanReport::default();

    ctx.store().view(|view| {
        let walker = WalkDir::new(ctx.root())
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let pruned = e.file_type().is_dir() && filters.is_pruned(e.path());
                if pruned {
                    debug!(path = %e.path().display(), "pruned");
                }
                !pruned
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();

            if filters.is_ignored(path) {
                debug!(path = %path.display(), "ignored");
                continue;
            }
            if tracked.is_some_and(|t| t.contains(path)) {
                continue;
            }
            let file_type = entry.file_type();
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }

            if view.is_staged(path)? {
                report.picked.push(path.to_path_buf());
            } else if let Some(stored) = view.get_record(path)? {
                let current = match FileRecord::capture(path, compute_hash) {
                    Ok(current) => current,
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "skipping unreadable file");
                        continue;
                    }
                };
                if let Some(difference) = current.differs(&stored, compute_hash) {
                    debug!(path = %path.display(), %difference, "modified");
                    report.modified.push(path.to_path_buf());
                }
            } else {
                report.new.push(path.to_path_buf());
            }
        }

        for (path, _) in view.records()? {
            if let Err(err) = fs::symlink_metadata(&path)
                && err.kind() == io::ErrorKind::NotFound
            {
                report.missing.push(path);
            }
        }

        Ok(())
    })?;

    info!(
        new = report.new.len(),
        picked = report.picked.len(),
        modified = report.modified.len(),
        missing = report.missing.len(),
        "scan finished"
    );
    Ok(report)
}

/// Scan, then stage every new and modified path in one transaction.
///
/// # Errors
///
/// Returns an error if the scan or the staging transaction fails. On failure
/// nothing is staged.
pub fn scan_and_pick(ctx: &DeckContext, compute_hash: bool) -> Result<ScanReport> {
    let mut report = scan(ctx, compute_hash)?;

    ctx.store().update(|tables| {
        for path in report.new.iter().chain(&report.modified) {
            tables.stage(path)?;
        }
        Ok(())
    })?;

    report.picked.append(&mut report.new);
    report.picked.append(&mut report.modified);
    report.picked.sort();
    Ok(report)
}
