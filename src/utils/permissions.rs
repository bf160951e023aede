use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Mask selecting the file-type bits of `st_mode`.
pub const S_IFMT: u32 = 0o170_000;
/// File-type bits of a symbolic link.
pub const S_IFLNK: u32 = 0o120_000;
/// File-type bits of a regular file.
pub const S_IFREG: u32 = 0o100_000;
/// File-type bits of a directory.
pub const S_IFDIR: u32 = 0o040_000;
/// Permission bits including setuid, setgid and sticky.
pub const PERMISSION_BITS: u32 = 0o7777;

/// A raw `st_mode`: permission bits plus file-type flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMode {
    mode: u32,
}

impl FileMode {
    /// Create from a raw mode value
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Permission bits only (`mode & 0o7777`)
    #[must_use]
    pub const fn permissions(&self) -> u32 {
        self.mode & PERMISSION_BITS
    }

    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        self.mode & S_IFMT == S_IFLNK
    }

    #[must_use]
    pub const fn is_regular(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }

    #[must_use]
    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self::from_mode(metadata.mode())
    }

    /// Apply the permission bits to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Failed to set file permissions
    pub fn apply_to_path(&self, path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let permissions = fs::Permissions::from_mode(self.permissions());
        fs::set_permissions(path, permissions)
            .with_context(|| format!("Failed to set permissions for: {}", path.display()))?;
        Ok(())
    }

    /// Short name of the file type, for messages
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self.mode & S_IFMT {
            S_IFREG => "regular file",
            S_IFLNK => "symlink",
            S_IFDIR => "directory",
            0o060_000 => "block device",
            0o020_000 => "character device",
            0o010_000 => "fifo",
            0o140_000 => "socket",
            _ => "special file",
        }
    }
}
