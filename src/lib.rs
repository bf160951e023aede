#![warn(missing_docs)]

//! # deck - hands off package manager
//!
//! deck watches a directory tree, reports files that are new, modified or
//! missing relative to what it has recorded, lets you pick a subset of them,
//! and commits the picked set as a named, versioned package. Committed content
//! is copied into a deduplicated, content-addressed store, so any committed
//! file can later be reset to its recorded state, and a whole package can be
//! uninstalled.
//!
//! ## Architecture
//!
//! - [`storage`]: Transactional metadata store, file records and the blob store
//! - [`scanner`]: Working-tree walk, prune/ignore filters and git awareness
//! - [`commands`]: Pick, commit, reset, uninstall and the other operations
//! - [`config`]: deckrc loading and validation
//! - [`output`]: Coloured, verbosity-aware terminal output
//! - [`utils`]: Hashing, file modes, serialization and path helpers
//!
//! ## Example Usage
//!
//! ```no_run
//! use deck::DeckContext;
//! use deck::storage::Package;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = DeckContext::load(None)?;
//!
//! let report = deck::scanner::scan_and_pick(&ctx, true)?;
//! println!("{} files picked", report.picked.len());
//!
//! deck::commands::commit::commit(&ctx, &Package::new("nginx", "1.25.3"))?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Operations on the index, staging set and working tree.
pub mod commands;

/// Configuration parsing and validation.
pub mod config;

/// Typed error conditions.
pub mod error;

/// Output formatting.
pub mod output;

/// Filesystem scanning.
pub mod scanner;

/// Metadata and blob storage.
pub mod storage;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use config::Config;
use config::validator::ConfigValidator;
use once_cell::unsync::OnceCell;
use scanner::{GitCli, PathFilters, TrackedPaths};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use storage::{BlobStore, MetaStore};
use tracing::{debug, warn};

/// Current version of the deck binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the metadata database inside the data directory.
pub const DB_FILE: &str = "deck.db";

/// Everything an operation needs: configuration, stores and filters.
///
/// Built once at startup and passed by reference. The git-tracked set is
/// loaded on first use and only when `git_aware` is set.
pub struct DeckContext {
    /// Configuration the context was built from.
    pub config: Config,
    store: MetaStore,
    blobs: BlobStore,
    filters: PathFilters,
    tracked_source: Box<dyn TrackedPaths>,
    git_tracked: OnceCell<HashSet<PathBuf>>,
}

impl DeckContext {
    /// Validate `config` and open its stores.
    ///
    /// Validation warnings are logged; they do not stop the context from
    /// opening.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the metadata store cannot be
    /// opened.
    pub fn open(config: Config) -> Result<Self> {
        for warning in ConfigValidator::new().validate(&config)? {
            warn!("{warning}");
        }

        let filters = PathFilters::new(&config.prune, &config.ignore)?;
        let store = MetaStore::open(&config.data)?;
        let blobs = BlobStore::new(config.data.clone());

        debug!(
            root = %config.root.display(),
            data = %config.data.display(),
            git_aware = config.git_aware,
            "context ready"
        );

        Ok(Self {
            config,
            store,
            blobs,
            filters,
            tracked_source: Box::new(GitCli),
            git_tracked: OnceCell::new(),
        })
    }

    /// Find, load and open the configuration.
    ///
    /// See [`Config::discover`] for the search order.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration is found, it cannot be parsed, or
    /// [`DeckContext::open`] fails.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Config::discover(explicit)?;
        debug!(path = %path.display(), "using config");

        let validator = ConfigValidator::new();
        for field in validator.unknown_fields(&path)? {
            warn!(field = %field, "unknown configuration field");
        }

        let config = Config::load(&path)?;
        Self::open(config).with_context(|| format!("Invalid configuration: {}", path.display()))
    }

    /// Replace the git-tracked path source.
    #[must_use]
    pub fn with_tracked_paths(mut self, source: impl TrackedPaths + 'static) -> Self {
        self.tracked_source = Box::new(source);
        self.git_tracked = OnceCell::new();
        self
    }

    /// Root of the scanned tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Metadata store.
    #[must_use]
    pub const fn store(&self) -> &MetaStore {
        &self.store
    }

    /// Blob store.
    #[must_use]
    pub const fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Compiled prune and ignore patterns.
    #[must_use]
    pub const fn filters(&self) -> &PathFilters {
        &self.filters
    }

    /// Paths tracked by git, or `None` when git-awareness is off.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has to be loaded and loading fails.
    pub fn git_tracked(&self) -> Result<Option<&HashSet<PathBuf>>> {
        if !self.config.git_aware {
            return Ok(None);
        }
        self.git_tracked
            .get_or_try_init(|| {
                self.tracked_source
                    .tracked_paths(&self.config.root)
                    .context("Failed to list git tracked paths")
            })
            .map(Some)
    }
}
