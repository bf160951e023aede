use crate::DeckContext;
use anyhow::Result;
use std::path::PathBuf;

/// What `show` lists.
#[derive(Debug, Clone, Copy)]
pub enum ShowTarget<'a> {
    /// Paths of every version of the named package
    Package(&'a str),
    /// Every indexed path
    All,
}

/// Indexed paths, in path order.
///
/// # Errors
///
/// Returns an error if the index cannot be read.
pub fn show(ctx: &DeckContext, target: ShowTarget<'_>) -> Result<Vec<PathBuf>> {
    ctx.store().view(|view| {
        Ok(view
            .records()?
            .into_iter()
            .filter(|(_, record)| match target {
                ShowTarget::Package(name) => record.package.name == name,
                ShowTarget::All => true,
            })
            .map(|(path, _)| path)
            .collect())
    })
}

/// Execute show command
///
/// # Errors
///
/// Returns an error if the index cannot be read.
pub fn execute(ctx: &DeckContext, target: ShowTarget<'_>) -> Result<()> {
    for path in show(ctx, target)? {
        println!("{}", path.display());
    }
    Ok(())
}
