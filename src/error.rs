//! Typed failures raised by deck operations.
//!
//! Operations return `anyhow::Result`; the variants below are the conditions a
//! caller may want to recognise with `downcast_ref` instead of only printing.

use std::path::PathBuf;
use thiserror::Error;

/// Precondition and configuration failures.
#[derive(Debug, Error)]
pub enum DeckError {
    /// A path given on the command line does not exist.
    #[error("no such file: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Only regular files and symlinks can be picked.
    #[error("only regular files and symlinks can be picked: {} is a {kind}", path.display())]
    InvalidPick {
        /// Offending path
        path: PathBuf,
        /// Human readable file type
        kind: &'static str,
    },

    /// The operation needs an index entry that is not there.
    #[error("file not in index: {}", .0.display())]
    NotIndexed(PathBuf),

    /// Commit needs both a package name and a version.
    #[error("package name and version must not be empty (got {name:?} {version:?})")]
    InvalidPackage {
        /// Requested name
        name: String,
        /// Requested version
        version: String,
    },

    /// No index entry carries the requested package.
    #[error("no files installed for package {name}{}", .version.as_ref().map(|v| format!(" {v}")).unwrap_or_default())]
    PackageNotFound {
        /// Requested name
        name: String,
        /// Requested version, if any
        version: Option<String>,
    },

    /// A regular-file record without a content digest.
    #[error("index record for {} has no content digest", .0.display())]
    MissingDigest(PathBuf),

    /// The blob a record points at is not in the blob store.
    #[error("blob {digest} is missing from the store")]
    MissingBlob {
        /// Hex digest of the missing blob
        digest: String,
    },

    /// Configured root does not exist or is not a directory.
    #[error("root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// None of the candidate configuration files exist.
    #[error("can't find config file (tried {})", display_paths(.0))]
    ConfigNotFound(Vec<PathBuf>),

    /// A prune or ignore pattern is not a valid regular expression.
    #[error("invalid {list} pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// `prune` or `ignore`
        list: &'static str,
        /// The pattern as written in the configuration
        pattern: String,
        /// Underlying regex error
        source: regex::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
