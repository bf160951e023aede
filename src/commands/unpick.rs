use crate::DeckContext;
use crate::output;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// Which staged paths to drop.
#[derive(Debug, Clone, Copy)]
pub enum UnpickTarget<'a> {
    /// Clear the staging set
    All,
    /// Only these paths; unstaged ones are skipped
    Paths(&'a [PathBuf]),
}

/// Remove paths from the staging set, returning how many were staged.
///
/// # Errors
///
/// Returns an error if the store cannot be read or updated.
pub fn unpick(ctx: &DeckContext, target: UnpickTarget<'_>) -> Result<usize> {
    let paths = match target {
        UnpickTarget::All => ctx.store().view(|v| v.staged_paths())?,
        UnpickTarget::Paths(paths) => paths.to_vec(),
    };

    let removed = ctx.store().update(|tables| {
        let mut removed = 0;
        for path in &paths {
            if tables.unstage(path)? {
                debug!(path = %path.display(), "unpicked");
                removed += 1;
            }
        }
        Ok(removed)
    })?;

    info!(removed, "unpick finished");
    Ok(removed)
}

/// Execute unpick command
///
/// # Errors
///
/// Returns an error if neither `--all` nor a path is given, or the update
/// fails.
pub fn execute(ctx: &DeckContext, all: bool, args: &[String]) -> Result<()> {
    let removed = if all {
        unpick(ctx, UnpickTarget::All)?
    } else {
        if args.is_empty() {
            anyhow::bail!("nothing to unpick: give paths or --all");
        }
        let paths = super::resolve_paths(args)?;
        unpick(ctx, UnpickTarget::Paths(&paths))?
    };

    output::success(&format!("Unpicked {removed} file(s)"));
    Ok(())
}
