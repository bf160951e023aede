use crate::DeckContext;
use crate::output;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// Forget `paths`: delete their index entries in one transaction.
///
/// Files and blobs are left alone; unindexed paths are skipped. Returns how
/// many entries were deleted.
///
/// # Errors
///
/// Returns an error if the store update fails.
pub fn remove(ctx: &DeckContext, paths: &[PathBuf]) -> Result<usize> {
    let removed = ctx.store().update(|tables| {
        let mut removed = 0;
        for path in paths {
            if tables.remove_record(path)? {
                debug!(path = %path.display(), "removed from index");
                removed += 1;
            }
        }
        Ok(removed)
    })?;

    info!(removed, "remove finished");
    Ok(removed)
}

/// Execute remove command
///
/// # Errors
///
/// Returns an error if the store update fails.
pub fn execute(ctx: &DeckContext, args: &[String]) -> Result<()> {
    let paths = super::resolve_paths(args)?;
    let removed = remove(ctx, &paths)?;
    if removed < paths.len() {
        output::info(&format!(
            "{} path(s) were not in the index",
            paths.len() - removed
        ));
    }
    output::success(&format!("Removed {removed} file(s) from the index"));
    Ok(())
}
