#![allow(dead_code)]

use anyhow::Result;
use deck::DeckContext;
use deck::config::Config;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Sandbox with a working tree under `root/` and a store under `data/`.
pub struct TestDeck {
    pub temp_dir: TempDir,
    pub ctx: DeckContext,
}

impl TestDeck {
    /// Create a sandbox with no prune or ignore patterns.
    pub fn new() -> Result<Self> {
        Self::with_patterns(&[], &[])
    }

    /// Create a sandbox; patterns are given relative to the root and anchored
    /// to it.
    pub fn with_patterns(prune: &[&str], ignore: &[&str]) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let config = test_config(temp_dir.path(), prune, ignore)?;
        let ctx = DeckContext::open(config)?;
        Ok(Self { temp_dir, ctx })
    }

    pub fn root(&self) -> &Path {
        self.ctx.root()
    }

    pub fn data(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    /// Absolute path of `rel` under the root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a file under the root with the given permission bits.
    pub fn write(&self, rel: &str, content: &str, mode: u32) -> Result<PathBuf> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(mode))?;
        Ok(path)
    }

    /// Create a symlink under the root.
    pub fn symlink(&self, rel: &str, target: &str) -> Result<PathBuf> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(target, &path)?;
        Ok(path)
    }

    /// Number of blobs in the store.
    pub fn blob_count(&self) -> Result<usize> {
        Ok(self.ctx.blobs().digests()?.len())
    }
}

/// Config rooted at `<base>/root` with data in `<base>/data`.
pub fn test_config(base: &Path, prune: &[&str], ignore: &[&str]) -> Result<Config> {
    let root = base.join("root");
    fs::create_dir_all(&root)?;
    let anchor = |p: &&str| format!("^{}{p}", root.display());
    Ok(Config {
        prune: prune.iter().map(anchor).collect(),
        ignore: ignore.iter().map(anchor).collect(),
        root,
        data: base.join("data"),
        git_aware: false,
    })
}

/// Write a deckrc for `base` and return its path.
pub fn write_deckrc(base: &Path) -> Result<PathBuf> {
    let config = test_config(base, &[], &[])?;
    let path = base.join("deckrc");
    config.save(&path)?;
    Ok(path)
}
