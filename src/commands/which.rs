use crate::DeckContext;
use crate::storage::Package;
use anyhow::Result;
use std::path::PathBuf;

/// Owning package of each indexed path; unindexed paths are skipped.
///
/// # Errors
///
/// Returns an error if the index cannot be read.
pub fn which(ctx: &DeckContext, paths: &[PathBuf]) -> Result<Vec<(PathBuf, Package)>> {
    ctx.store().view(|view| {
        let mut owners = Vec::new();
        for path in paths {
            if let Some(record) = view.get_record(path)? {
                owners.push((path.clone(), record.package));
            }
        }
        Ok(owners)
    })
}

/// Execute which command
///
/// # Errors
///
/// Returns an error if the index cannot be read.
pub fn execute(ctx: &DeckContext, args: &[String]) -> Result<()> {
    let paths = super::resolve_paths(args)?;
    for (path, package) in which(ctx, &paths)? {
        println!("{}: {package}", path.display());
    }
    Ok(())
}
