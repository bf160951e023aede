use crate::DeckContext;
use crate::error::DeckError;
use crate::output;
use crate::storage::{FileRecord, Package};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Commit every staged path under `package`.
///
/// Each path is captured with hashing on, tagged, written to the index and
/// copied into the blob store (symlinks have no blob), then unstaged. The
/// metadata changes land in one transaction: if any path fails, the index and
/// staging set are left as they were. Blobs already written stay behind,
/// unreferenced.
///
/// Returns the committed paths.
///
/// # Errors
///
/// Returns [`DeckError::InvalidPackage`] for an empty name or version, or the
/// first capture, copy or store failure.
pub fn commit(ctx: &DeckContext, package: &Package) -> Result<Vec<PathBuf>> {
    if package.name.trim().is_empty() || package.version.trim().is_empty() {
        return Err(DeckError::InvalidPackage {
            name: package.name.clone(),
            version: package.version.clone(),
        }
        .into());
    }

    let staged = ctx.store().view(|v| v.staged_paths())?;

    ctx.store().update(|tables| {
        for path in &staged {
            let mut record = FileRecord::capture(path, true)
                .with_context(|| format!("Failed to commit {}", path.display()))?;
            record.package = package.clone();

            if !record.is_symlink() {
                let digest = record
                    .digest
                    .ok_or_else(|| DeckError::MissingDigest(path.clone()))?;
                ctx.blobs().store(path, &digest)?;
            }

            tables.put_record(path, &record)?;
            tables.unstage(path)?;
            debug!(path = %path.display(), package = %package, "committed");
        }
        Ok(())
    })?;

    info!(package = %package, count = staged.len(), "commit finished");
    Ok(staged)
}

/// Execute commit command
///
/// # Errors
///
/// Returns an error if the commit fails.
pub fn execute(ctx: &DeckContext, name: &str, version: &str) -> Result<()> {
    let package = Package::new(name, version);
    let committed = commit(ctx, &package)?;

    if committed.is_empty() {
        output::warning("Nothing picked; use 'deck pick' or 'deck scan --pick' first");
        return Ok(());
    }

    for path in &committed {
        output::verbose(&format!("committed {}", path.display()));
    }
    output::success(&format!(
        "Committed {} file(s) as {package}",
        committed.len()
    ));
    Ok(())
}
