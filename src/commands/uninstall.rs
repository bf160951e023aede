use crate::DeckContext;
use crate::error::DeckError;
use crate::output;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

/// Delete every file of a package from the working tree and the index.
///
/// Entries match on package name, and on version too when one is given. Each
/// file is deleted before its entry; a file that is already gone is fine. Any
/// other delete failure aborts the transaction so no entry is removed, though
/// files deleted before the failure stay deleted and can be brought back with
/// reset.
///
/// Returns the uninstalled paths.
///
/// # Errors
///
/// Returns [`DeckError::PackageNotFound`] when nothing matches, or the first
/// delete or store failure.
pub fn uninstall(ctx: &DeckContext, name: &str, version: Option<&str>) -> Result<Vec<PathBuf>> {
    let targets: Vec<PathBuf> = ctx.store().view(|view| {
        Ok(view
            .records()?
            .into_iter()
            .filter(|(_, record)| {
                record.package.name == name
                    && version.is_none_or(|v| record.package.version == v)
            })
            .map(|(path, _)| path)
            .collect())
    })?;

    if targets.is_empty() {
        return Err(DeckError::PackageNotFound {
            name: name.to_string(),
            version: version.map(ToString::to_string),
        }
        .into());
    }

    ctx.store().update(|tables| {
        for path in &targets {
            match fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "deleted"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "already gone");
                }
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("Failed to delete: {}", path.display()));
                }
            }
            tables.remove_record(path)?;
        }
        Ok(())
    })?;

    info!(package = name, count = targets.len(), "uninstall finished");
    Ok(targets)
}

/// Execute uninstall command
///
/// # Errors
///
/// Returns an error if the uninstall fails.
pub fn execute(ctx: &DeckContext, name: &str, version: Option<&str>) -> Result<()> {
    let removed = uninstall(ctx, name, version)?;
    for path in &removed {
        output::action("deleted", &path.display().to_string());
    }
    output::success(&format!("Uninstalled {name} ({} file(s))", removed.len()));
    Ok(())
}
