//! Transactional metadata store.
//!
//! One sled database at `<data>/deck.db` holding two trees:
//! - `index`: absolute path bytes → encoded [`FileRecord`]
//! - `staging`: absolute path bytes → empty marker
//!
//! Mutations go through [`MetaStore::update`], which applies every change to
//! both trees atomically or none of them. Reads go through [`MetaStore::view`].

use super::record::FileRecord;
use crate::DB_FILE;
use anyhow::{Context, Result};
use sled::Transactional;
use sled::transaction::{
    ConflictableTransactionError, TransactionError, TransactionalTree, UnabortableTransactionError,
};
use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::debug;

const INDEX_TREE: &str = "index";
const STAGING_TREE: &str = "staging";

/// Handle on the persisted index and staging set.
pub struct MetaStore {
    db: sled::Db,
    index: sled::Tree,
    staging: sled::Tree,
}

/// Mutable access to both tables inside one transaction.
pub struct Tables<'a> {
    index: &'a TransactionalTree,
    staging: &'a TransactionalTree,
}

/// Read-only access to both tables.
pub struct View<'a> {
    index: &'a sled::Tree,
    staging: &'a sled::Tree,
}

fn key_of(path: &Path) -> &[u8] {
    path.as_os_str().as_bytes()
}

fn path_of(key: &[u8]) -> PathBuf {
    PathBuf::from(OsStr::from_bytes(key))
}

impl MetaStore {
    /// Open (creating if needed) the store under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened, for instance because another process holds it.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join(DB_FILE);
        let db = sled::open(&db_path)
            .with_context(|| format!("Failed to open metadata store: {}", db_path.display()))?;
        let index = db
            .open_tree(INDEX_TREE)
            .context("Failed to open index table")?;
        let staging = db
            .open_tree(STAGING_TREE)
            .context("Failed to open staging table")?;

        debug!(path = %db_path.display(), "opened metadata store");
        Ok(Self { db, index, staging })
    }

    /// Run `f` in one transaction over both tables.
    ///
    /// On `Ok` every mutation made through the [`Tables`] handle is committed
    /// and flushed; on `Err` none is. sled may run `f` more than once when it
    /// detects a conflict, so `f` must not depend on running exactly once.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a storage error from sled.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: Fn(&Tables<'_>) -> Result<T>,
    {
        let result = (&self.index, &self.staging).transaction(|(index, staging)| {
            let tables = Tables { index, staging };
            f(&tables).map_err(|err| match err.downcast::<UnabortableTransactionError>() {
                Ok(unabortable) => unabortable.into(),
                Err(err) => ConflictableTransactionError::Abort(err),
            })
        });

        match result {
            Ok(value) => {
                self.db
                    .flush()
                    .context("Failed to flush metadata store")?;
                Ok(value)
            }
            Err(TransactionError::Abort(err)) => Err(err),
            Err(TransactionError::Storage(err)) => {
                Err(anyhow::Error::from(err).context("Metadata store transaction failed"))
            }
        }
    }

    /// Run `f` against a read-only view of both tables.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`.
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&View<'_>) -> Result<T>,
    {
        f(&View {
            index: &self.index,
            staging: &self.staging,
        })
    }
}

impl Tables<'_> {
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored value is corrupt.
    pub fn get_record(&self, path: &Path) -> Result<Option<FileRecord>> {
        self.index
            .get(key_of(path))?
            .map(|bytes| FileRecord::from_bytes(&bytes))
            .transpose()
            .with_context(|| format!("Corrupt index entry: {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn put_record(&self, path: &Path, record: &FileRecord) -> Result<()> {
        let bytes = record.to_bytes()?;
        self.index.insert(key_of(path), bytes)?;
        Ok(())
    }

    /// Delete the index entry for `path`, reporting whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn remove_record(&self, path: &Path) -> Result<bool> {
        Ok(self.index.remove(key_of(path))?.is_some())
    }

    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn is_staged(&self, path: &Path) -> Result<bool> {
        Ok(self.staging.get(key_of(path))?.is_some())
    }

    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn stage(&self, path: &Path) -> Result<()> {
        self.staging.insert(key_of(path), &[] as &[u8])?;
        Ok(())
    }

    /// Remove `path` from the staging set, reporting whether it was staged.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn unstage(&self, path: &Path) -> Result<bool> {
        Ok(self.staging.remove(key_of(path))?.is_some())
    }
}

impl View<'_> {
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored value is corrupt.
    pub fn get_record(&self, path: &Path) -> Result<Option<FileRecord>> {
        self.index
            .get(key_of(path))
            .context("Failed to read index")?
            .map(|bytes| FileRecord::from_bytes(&bytes))
            .transpose()
            .with_context(|| format!("Corrupt index entry: {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn is_staged(&self, path: &Path) -> Result<bool> {
        Ok(self
            .staging
            .contains_key(key_of(path))
            .context("Failed to read staging set")?)
    }

    /// Every index entry, ordered by path bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if iteration fails or an entry is corrupt.
    pub fn records(&self) -> Result<Vec<(PathBuf, FileRecord)>> {
        self.index
            .iter()
            .map(|item| {
                let (key, value) = item.context("Failed to iterate index")?;
                let path = path_of(&key);
                let record = FileRecord::from_bytes(&value)
                    .with_context(|| format!("Corrupt index entry: {}", path.display()))?;
                Ok((path, record))
            })
            .collect()
    }

    /// Every staged path, ordered by path bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if iteration fails.
    pub fn staged_paths(&self) -> Result<Vec<PathBuf>> {
        self.staging
            .iter()
            .keys()
            .map(|key| Ok(path_of(&key.context("Failed to iterate staging set")?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::Package;
    use tempfile::tempdir;

    fn record(size: u64) -> FileRecord {
        FileRecord {
            mode: 0o100_644,
            size,
            digest: None,
            symlink_target: None,
            package: Package::default(),
        }
    }

    #[test]
    fn test_update_commits_both_tables() -> Result<()> {
        let dir = tempdir()?;
        let store = MetaStore::open(dir.path())?;
        let a = Path::new("/srv/a");

        store.update(|t| {
            t.put_record(a, &record(3))?;
            t.stage(a)
        })?;

        store.view(|v| {
            assert_eq!(v.get_record(a)?, Some(record(3)));
            assert!(v.is_staged(a)?);
            Ok(())
        })
    }

    #[test]
    fn test_failed_update_leaves_store_untouched() -> Result<()> {
        let dir = tempdir()?;
        let store = MetaStore::open(dir.path())?;
        let a = Path::new("/srv/a");
        let b = Path::new("/srv/b");
        store.update(|t| t.stage(a))?;

        let result: Result<()> = store.update(|t| {
            t.put_record(b, &record(1))?;
            t.unstage(a)?;
            anyhow::bail!("abort after mutating")
        });

        assert!(result.is_err());
        store.view(|v| {
            assert_eq!(v.get_record(b)?, None);
            assert!(v.is_staged(a)?);
            Ok(())
        })
    }

    #[test]
    fn test_abort_keeps_application_error() -> Result<()> {
        let dir = tempdir()?;
        let store = MetaStore::open(dir.path())?;

        let err = store
            .update(|_| -> Result<()> {
                Err(crate::error::DeckError::NotIndexed(PathBuf::from("/x")).into())
            })
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<crate::error::DeckError>(),
            Some(crate::error::DeckError::NotIndexed(_))
        ));
        Ok(())
    }

    #[test]
    fn test_remove_and_unstage_report_presence() -> Result<()> {
        let dir = tempdir()?;
        let store = MetaStore::open(dir.path())?;
        let a = Path::new("/srv/a");

        store.update(|t| {
            t.put_record(a, &record(0))?;
            t.stage(a)
        })?;
        let (removed, unstaged) = store.update(|t| Ok((t.remove_record(a)?, t.unstage(a)?)))?;
        let again = store.update(|t| Ok((t.remove_record(a)?, t.unstage(a)?)))?;

        assert_eq!((removed, unstaged), (true, true));
        assert_eq!(again, (false, false));
        Ok(())
    }

    #[test]
    fn test_iteration_is_ordered() -> Result<()> {
        let dir = tempdir()?;
        let store = MetaStore::open(dir.path())?;

        store.update(|t| {
            for name in ["/z", "/a/b", "/a"] {
                t.put_record(Path::new(name), &record(1))?;
                t.stage(Path::new(name))?;
            }
            Ok(())
        })?;

        store.view(|v| {
            let paths: Vec<_> = v.records()?.into_iter().map(|(p, _)| p).collect();
            assert_eq!(paths, ["/a", "/a/b", "/z"].map(PathBuf::from));
            assert_eq!(v.staged_paths()?, ["/a", "/a/b", "/z"].map(PathBuf::from));
            Ok(())
        })
    }
}
