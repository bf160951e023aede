use crate::DeckContext;
use crate::storage::Package;
use anyhow::Result;
use std::collections::BTreeSet;

/// Distinct package identities in the index, ordered by name then version.
///
/// # Errors
///
/// Returns an error if the index cannot be read.
pub fn packages(ctx: &DeckContext) -> Result<Vec<Package>> {
    let catalog: BTreeSet<Package> = ctx.store().view(|view| {
        Ok(view
            .records()?
            .into_iter()
            .map(|(_, record)| record.package)
            .filter(|package| !package.is_empty())
            .collect())
    })?;
    Ok(catalog.into_iter().collect())
}

/// Execute list command
///
/// # Errors
///
/// Returns an error if the index cannot be read.
pub fn execute(ctx: &DeckContext, names_only: bool) -> Result<()> {
    let packages = packages(ctx)?;
    if names_only {
        let mut names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        names.dedup();
        for name in names {
            println!("{name}");
        }
    } else {
        for package in &packages {
            println!("{package}");
        }
    }
    Ok(())
}
