//! File records: what deck remembers about a tracked path.

use crate::utils::hash::{Digest, hash_file};
use crate::utils::permissions::FileMode;
use crate::utils::serialization;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Package identity attached to committed files.
///
/// Ordering is by name, then version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
}

impl Package {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// True for the zero value carried by records that were never committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.version.is_empty()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Tracked attributes of one filesystem entry.
///
/// Symlinks carry `symlink_target` and never a digest; regular files carry
/// `size` and, once hashed, `digest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Raw `st_mode` from a non-following stat
    pub mode: u32,
    /// Length in bytes (regular files only)
    pub size: u64,
    /// SHA-1 of the content, when computed
    pub digest: Option<Digest>,
    /// Link target, symlinks only
    pub symlink_target: Option<PathBuf>,
    /// Owning package, empty until committed
    pub package: Package,
}

/// Why two records are considered different.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difference {
    /// File type or permission bits
    Mode,
    /// Symlink points elsewhere
    Target,
    /// Regular file length
    Size,
    /// Regular file content
    Digest,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::Mode => "mode",
            Self::Target => "symlink target",
            Self::Size => "size",
            Self::Digest => "digest",
        };
        write!(f, "{what} does not match")
    }
}

impl FileRecord {
    /// Capture the current state of `path` without following symlinks.
    ///
    /// Regular files are hashed only when `compute_hash` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the path vanished or cannot be read.
    pub fn capture(path: &Path, compute_hash: bool) -> Result<Self> {
        let metadata = fs::symlink_metadata(path)
            .with_context(|| format!("Failed to stat: {}", path.display()))?;
        let mode = FileMode::from_metadata(&metadata);

        if mode.is_symlink() {
            let target = fs::read_link(path)
                .with_context(|| format!("Failed to read symlink: {}", path.display()))?;
            return Ok(Self {
                mode: mode.mode(),
                size: 0,
                digest: None,
                symlink_target: Some(target),
                package: Package::default(),
            });
        }

        let digest = if compute_hash {
            Some(hash_file(path)?)
        } else {
            None
        };

        Ok(Self {
            mode: mode.mode(),
            size: metadata.len(),
            digest,
            symlink_target: None,
            package: Package::default(),
        })
    }

    #[must_use]
    pub const fn file_mode(&self) -> FileMode {
        FileMode::from_mode(self.mode)
    }

    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        self.file_mode().is_symlink()
    }

    /// Compare a fresh capture against a stored record.
    ///
    /// Without `compute_hash` only mode and size are compared for regular
    /// files, so a rewrite that keeps the size goes unnoticed. That is the
    /// fast path: callers wanting content sensitivity must hash.
    #[must_use]
    pub fn differs(&self, stored: &Self, compute_hash: bool) -> Option<Difference> {
        if self.mode != stored.mode {
            return Some(Difference::Mode);
        }
        if self.is_symlink() {
            return (self.symlink_target != stored.symlink_target).then_some(Difference::Target);
        }
        if self.size != stored.size {
            return Some(Difference::Size);
        }
        if compute_hash && self.digest != stored.digest {
            return Some(Difference::Digest);
        }
        None
    }

    /// Encode for the index table.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialization::serialize(self).context("Failed to encode file record")
    }

    /// Decode a value read from the index table.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serialization::deserialize(bytes).context("Failed to decode file record")
    }
}
