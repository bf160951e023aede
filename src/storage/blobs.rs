//! Content-addressed blob store.
//!
//! Layout under the data directory:
//! ```text
//! <data>/
//!   11/
//!     11f6ad8ec52a2984abaafd7c3b516503785c2072
//!   a9/
//!     a9993e364706816aba3e25717850c26c9cd0d89d
//! ```
//! Each blob is named by the full lowercase hex digest of its content and lives
//! in the shard directory named by the digest's first byte.

use crate::error::DeckError;
use crate::utils::hash::Digest;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deduplicated file contents keyed by SHA-1 digest.
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Store rooted at the data directory. Nothing is created until the
    /// first blob is written.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn shard_dir(&self, digest: &Digest) -> PathBuf {
        self.root.join(digest.shard())
    }

    /// Where the blob for `digest` lives, whether or not it exists.
    #[must_use]
    pub fn blob_path(&self, digest: &Digest) -> PathBuf {
        self.shard_dir(digest).join(digest.to_hex())
    }

    #[must_use]
    pub fn contains(&self, digest: &Digest) -> bool {
        self.blob_path(digest).is_file()
    }

    /// Copy the file at `src` into the store under `digest`.
    ///
    /// An existing blob is kept: its content is identical by construction.
    /// New blobs are written to a temporary file in the shard and renamed into
    /// place, so a blob name never refers to a partial copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the shard directory cannot be created or the copy
    /// fails.
    pub fn store(&self, src: &Path, digest: &Digest) -> Result<PathBuf> {
        let blob_path = self.blob_path(digest);
        if blob_path.is_file() {
            debug!(digest = %digest, "blob already stored");
            return Ok(blob_path);
        }

        let shard = self.shard_dir(digest);
        fs::create_dir_all(&shard)
            .with_context(|| format!("Failed to create shard directory: {}", shard.display()))?;

        let mut source =
            fs::File::open(src).with_context(|| format!("Failed to open: {}", src.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&shard)
            .with_context(|| format!("Failed to create temporary blob in {}", shard.display()))?;
        io::copy(&mut source, tmp.as_file_mut())
            .with_context(|| format!("Failed to copy {} into the blob store", src.display()))?;
        tmp.as_file()
            .sync_all()
            .context("Failed to sync blob to disk")?;
        tmp.persist(&blob_path)
            .with_context(|| format!("Failed to write blob: {}", blob_path.display()))?;

        debug!(src = %src.display(), digest = %digest, "stored blob");
        Ok(blob_path)
    }

    /// Copy the blob for `digest` to `dest`.
    ///
    /// A symlink at `dest` is removed first so the content lands in a regular
    /// file rather than at the link's target. Missing parent directories are
    /// created.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is missing or the copy fails.
    pub fn restore(&self, digest: &Digest, dest: &Path) -> Result<()> {
        let blob_path = self.blob_path(digest);
        if !blob_path.is_file() {
            return Err(DeckError::MissingBlob {
                digest: digest.to_hex(),
            }
            .into());
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        if fs::symlink_metadata(dest).is_ok_and(|m| m.file_type().is_symlink()) {
            fs::remove_file(dest)
                .with_context(|| format!("Failed to remove symlink: {}", dest.display()))?;
        }

        let mut source = fs::File::open(&blob_path)
            .with_context(|| format!("Failed to open blob: {}", blob_path.display()))?;
        let mut target = fs::File::create(dest)
            .with_context(|| format!("Failed to create: {}", dest.display()))?;
        io::copy(&mut source, &mut target)
            .with_context(|| format!("Failed to restore {}", dest.display()))?;
        target
            .sync_all()
            .with_context(|| format!("Failed to sync: {}", dest.display()))?;

        debug!(digest = %digest, dest = %dest.display(), "restored blob");
        Ok(())
    }

    /// Every blob currently in the store, in shard order.
    ///
    /// Entries that are not `<hh>/<40 hex>` (the metadata database, stray
    /// temporary files) are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be read.
    pub fn digests(&self) -> Result<Vec<Digest>> {
        let mut digests = Vec::new();
        if !self.root.exists() {
            return Ok(digests);
        }

        let mut shards: Vec<_> = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read blob store: {}", self.root.display()))?
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .filter(|e| is_shard_name(&e.file_name().to_string_lossy()))
            .map(|e| e.path())
            .collect();
        shards.sort();

        for shard in shards {
            let mut names: Vec<_> = fs::read_dir(&shard)
                .with_context(|| format!("Failed to read shard: {}", shard.display()))?
                .filter_map(std::result::Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            digests.extend(names.iter().filter_map(|n| Digest::from_hex(n).ok()));
        }

        Ok(digests)
    }
}

fn is_shard_name(name: &str) -> bool {
    name.len() == 2 && name.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash::hash_bytes;
    use tempfile::tempdir;

    #[test]
    fn test_store_lays_out_shards() -> Result<()> {
        let dir = tempdir()?;
        let store = BlobStore::new(dir.path().join("data"));
        let src = dir.path().join("a.txt");
        fs::write(&src, "x")?;
        let digest = hash_bytes(b"x");

        let blob = store.store(&src, &digest)?;

        assert_eq!(
            blob,
            dir.path()
                .join("data/11/11f6ad8ec52a2984abaafd7c3b516503785c2072")
        );
        assert_eq!(fs::read(&blob)?, b"x");
        assert!(store.contains(&digest));
        Ok(())
    }

    #[test]
    fn test_store_twice_is_noop() -> Result<()> {
        let dir = tempdir()?;
        let store = BlobStore::new(dir.path().to_path_buf());
        let src = dir.path().join("a.txt");
        fs::write(&src, "same")?;
        let digest = hash_bytes(b"same");

        store.store(&src, &digest)?;
        store.store(&src, &digest)?;

        assert_eq!(store.digests()?, vec![digest]);
        Ok(())
    }

    #[test]
    fn test_restore_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let store = BlobStore::new(dir.path().join("data"));
        let src = dir.path().join("src.bin");
        fs::write(&src, [0u8, 1, 2, 255])?;
        let digest = hash_bytes(&[0u8, 1, 2, 255]);
        store.store(&src, &digest)?;

        let dest = dir.path().join("restored/nested/out.bin");
        store.restore(&digest, &dest)?;

        assert_eq!(fs::read(&dest)?, vec![0u8, 1, 2, 255]);
        Ok(())
    }

    #[test]
    fn test_restore_replaces_symlink_instead_of_following() -> Result<()> {
        let dir = tempdir()?;
        let store = BlobStore::new(dir.path().join("data"));
        let src = dir.path().join("src");
        fs::write(&src, "content")?;
        let digest = hash_bytes(b"content");
        store.store(&src, &digest)?;

        let victim = dir.path().join("victim");
        fs::write(&victim, "untouched")?;
        let dest = dir.path().join("dest");
        std::os::unix::fs::symlink(&victim, &dest)?;

        store.restore(&digest, &dest)?;

        assert!(!fs::symlink_metadata(&dest)?.file_type().is_symlink());
        assert_eq!(fs::read_to_string(&dest)?, "content");
        assert_eq!(fs::read_to_string(&victim)?, "untouched");
        Ok(())
    }

    #[test]
    fn test_restore_missing_blob() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path().to_path_buf());
        let err = store
            .restore(&hash_bytes(b"never stored"), &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeckError>(),
            Some(DeckError::MissingBlob { .. })
        ));
    }

    #[test]
    fn test_digests_skips_foreign_entries() -> Result<()> {
        let dir = tempdir()?;
        let store = BlobStore::new(dir.path().to_path_buf());
        fs::create_dir_all(dir.path().join("deck.db"))?;
        fs::create_dir_all(dir.path().join("ab"))?;
        fs::write(dir.path().join("ab/.tmpXYZ"), "partial")?;

        let src = dir.path().join("f");
        fs::write(&src, "f")?;
        let digest = hash_bytes(b"f");
        store.store(&src, &digest)?;

        assert_eq!(store.digests()?, vec![digest]);
        Ok(())
    }
}
