use crate::DeckContext;
use crate::error::DeckError;
use crate::output;
use crate::utils::permissions::FileMode;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stage `paths` for the next commit.
///
/// All or nothing: the first path that is missing or is neither a regular
/// file nor a symlink aborts the batch and nothing is staged.
///
/// # Errors
///
/// Returns [`DeckError::PathNotFound`] or [`DeckError::InvalidPick`] for a bad
/// path, or a store error.
pub fn pick(ctx: &DeckContext, paths: &[PathBuf]) -> Result<()> {
    ctx.store().update(|tables| {
        for path in paths {
            check_pickable(path)?;
            tables.stage(path)?;
            debug!(path = %path.display(), "picked");
        }
        Ok(())
    })?;

    info!(count = paths.len(), "pick finished");
    Ok(())
}

fn check_pickable(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(DeckError::PathNotFound(path.to_path_buf()).into());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to stat: {}", path.display()));
        }
    };

    let mode = FileMode::from_metadata(&metadata);
    if mode.is_regular() || mode.is_symlink() {
        Ok(())
    } else {
        Err(DeckError::InvalidPick {
            path: path.to_path_buf(),
            kind: mode.kind(),
        }
        .into())
    }
}

/// Execute pick command
///
/// # Errors
///
/// Returns an error if any path cannot be picked.
pub fn execute(ctx: &DeckContext, args: &[String]) -> Result<()> {
    let paths = super::resolve_paths(args)?;
    pick(ctx, &paths)?;
    for path in &paths {
        output::action("picked", &path.display().to_string());
    }
    Ok(())
}
