use crate::DeckContext;
use crate::output;
use crate::utils::hash::Digest;
use anyhow::Result;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// A consistency problem between configuration, index and stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Indexed path that an ignore pattern now matches
    Ignored(PathBuf),
    /// Indexed path that git tracks
    GitTracked(PathBuf),
    /// Indexed regular file with no digest
    MissingDigest(PathBuf),
    /// Indexed regular file whose blob is not in the store
    MissingBlob {
        /// Indexed path
        path: PathBuf,
        /// Digest the record points at
        digest: Digest,
    },
    /// Staged path that no longer exists
    StaleStaged(PathBuf),
    /// Blob no index entry references
    UnreferencedBlob(Digest),
}

impl Finding {
    /// Unreferenced blobs are expected after a failed commit.
    #[must_use]
    pub const fn is_informational(&self) -> bool {
        matches!(self, Self::UnreferencedBlob(_))
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored(path) => write!(f, "indexed but ignored: {}", path.display()),
            Self::GitTracked(path) => write!(f, "indexed but tracked by git: {}", path.display()),
            Self::MissingDigest(path) => write!(f, "no content digest: {}", path.display()),
            Self::MissingBlob { path, digest } => {
                write!(f, "blob {digest} missing for {}", path.display())
            }
            Self::StaleStaged(path) => write!(f, "picked but gone: {}", path.display()),
            Self::UnreferencedBlob(digest) => write!(f, "unreferenced blob {digest}"),
        }
    }
}

/// Read-only consistency check.
///
/// # Errors
///
/// Returns an error if the stores cannot be read or the git-tracked set
/// cannot be loaded.
pub fn doctor(ctx: &DeckContext) -> Result<Vec<Finding>> {
    let tracked = ctx.git_tracked()?;
    let filters = ctx.filters();
    let (records, staged) = ctx
        .store()
        .view(|view| Ok((view.records()?, view.staged_paths()?)))?;

    let mut findings = Vec::new();
    let mut referenced = HashSet::new();

    for (path, record) in records {
        if filters.is_ignored(&path) {
            findings.push(Finding::Ignored(path.clone()));
        }
        if tracked.is_some_and(|t| t.contains(&path)) {
            findings.push(Finding::GitTracked(path.clone()));
        }
        if record.is_symlink() {
            continue;
        }
        match record.digest {
            Some(digest) => {
                if !ctx.blobs().contains(&digest) {
                    findings.push(Finding::MissingBlob { path, digest });
                }
                referenced.insert(digest);
            }
            None => findings.push(Finding::MissingDigest(path)),
        }
    }

    for path in staged {
        if std::fs::symlink_metadata(&path).is_err() {
            findings.push(Finding::StaleStaged(path));
        }
    }

    findings.extend(
        ctx.blobs()
            .digests()?
            .into_iter()
            .filter(|digest| !referenced.contains(digest))
            .map(Finding::UnreferencedBlob),
    );

    info!(findings = findings.len(), "doctor finished");
    Ok(findings)
}

/// Execute doctor command
///
/// # Errors
///
/// Returns an error if the check cannot run.
pub fn execute(ctx: &DeckContext) -> Result<()> {
    let findings = doctor(ctx)?;

    let mut problems = 0;
    for finding in &findings {
        if finding.is_informational() {
            output::info(&finding.to_string());
        } else {
            problems += 1;
            output::warning(&finding.to_string());
        }
    }

    if problems == 0 {
        output::success("No problems found");
    }
    Ok(())
}
