use crate::DeckContext;
use crate::error::DeckError;
use crate::output;
use crate::storage::FileRecord;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Restore `paths` in the working tree to their indexed state.
///
/// Every path is looked up before anything is touched, so an unindexed path
/// fails the call with the working tree unchanged. Symlinks are recreated with
/// their recorded target. Regular files get their blob content and recorded
/// permission bits back. The index and staging set are not modified.
///
/// # Errors
///
/// Returns [`DeckError::NotIndexed`] for an unknown path, or the first
/// restore failure.
pub fn reset(ctx: &DeckContext, paths: &[PathBuf]) -> Result<()> {
    let records = ctx.store().view(|view| {
        paths
            .iter()
            .map(|path| match view.get_record(path)? {
                Some(record) => Ok((path.clone(), record)),
                None => Err(DeckError::NotIndexed(path.clone()).into()),
            })
            .collect::<Result<Vec<_>>>()
    })?;

    for (path, record) in &records {
        restore(ctx, path, record)?;
        debug!(path = %path.display(), "reset");
    }

    info!(count = records.len(), "reset finished");
    Ok(())
}

fn restore(ctx: &DeckContext, path: &Path, record: &FileRecord) -> Result<()> {
    if record.is_symlink() {
        let target = record
            .symlink_target
            .as_deref()
            .with_context(|| format!("Symlink record without target: {}", path.display()))?;
        return restore_symlink(path, target);
    }

    let digest = record
        .digest
        .ok_or_else(|| DeckError::MissingDigest(path.to_path_buf()))?;
    ctx.blobs().restore(&digest, path)?;
    record.file_mode().apply_to_path(path)
}

fn restore_symlink(path: &Path, target: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?,
        Ok(_) => fs::remove_file(path)
            .with_context(|| format!("Failed to remove: {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to stat: {}", path.display()));
        }
    }

    std::os::unix::fs::symlink(target, path)
        .with_context(|| format!("Failed to create symlink: {}", path.display()))
}

/// Execute reset command
///
/// # Errors
///
/// Returns an error if any path cannot be reset.
pub fn execute(ctx: &DeckContext, args: &[String]) -> Result<()> {
    let paths = super::resolve_paths(args)?;
    reset(ctx, &paths)?;
    for path in &paths {
        output::action("reset", &path.display().to_string());
    }
    Ok(())
}
