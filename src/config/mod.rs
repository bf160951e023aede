pub mod validator;

use crate::error::DeckError;
use crate::utils::expand_tilde;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file to use.
pub const CONFIG_ENV: &str = "DECK_CONFIG_PATH";

/// Per-user configuration file, relative to the home directory.
pub const USER_CONFIG_FILE: &str = ".deckrc";

/// System-wide configuration file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/deckrc";

/// Settings read from a deckrc file.
///
/// ```toml
/// root = "/"
/// data = "/var/lib/deck"
/// prune = ["^/proc", "^/sys"]
/// ignore = ['\.swp$']
/// git_aware = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory tree to scan
    #[serde(alias = "Root")]
    pub root: PathBuf,

    /// Directory holding the metadata store and blobs
    #[serde(alias = "Data")]
    pub data: PathBuf,

    /// Directories matching any of these are skipped with their subtree
    #[serde(default, alias = "Prune")]
    pub prune: Vec<String>,

    /// Entries matching any of these are skipped
    #[serde(default, alias = "Ignore")]
    pub ignore: Vec<String>,

    /// Leave out paths committed to the enclosing git repository
    #[serde(default, alias = "GitAware")]
    pub git_aware: bool,
}

impl Config {
    /// Load configuration from a file
    ///
    /// `root` and `data` may start with `~`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot read the configuration file
    /// - Configuration file contains invalid TOML or misses a required key
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.root = expand_tilde(&config.root.to_string_lossy()).context("Invalid root")?;
        config.data = expand_tilde(&config.data.to_string_lossy()).context("Invalid data")?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Locate the configuration file to use.
    ///
    /// An explicit path wins outright. Otherwise the first regular file among
    /// `$DECK_CONFIG_PATH`, `~/.deckrc` and `/etc/deckrc` is chosen.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::ConfigNotFound`] listing every candidate when none
    /// exists, or when an explicit path is not a file.
    pub fn discover(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            return Err(DeckError::ConfigNotFound(vec![path.to_path_buf()]).into());
        }

        let candidates = Self::candidates();
        let found = candidates.iter().find(|p| p.is_file()).cloned();
        found.ok_or_else(|| DeckError::ConfigNotFound(candidates).into())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            candidates.push(PathBuf::from(path));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(USER_CONFIG_FILE));
        }
        candidates.push(PathBuf::from(SYSTEM_CONFIG_FILE));
        candidates
    }
}
