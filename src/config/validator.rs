use super::Config;
use crate::DB_FILE;
use crate::error::DeckError;
use crate::scanner::PathFilters;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Checks a configuration before a context is built from it.
pub struct ConfigValidator {
    /// Keys recognized in a deckrc file, aliases included
    known_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "root", "Root", "data", "Data", "prune", "Prune", "ignore", "Ignore", "git_aware",
            "GitAware",
        ]
        .into_iter()
        .collect();

        Self { known_fields }
    }

    /// Validate a loaded configuration.
    ///
    /// Returns non-fatal findings as warning messages.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The root does not exist or is not a directory
    /// - The data path is empty
    /// - A prune or ignore pattern does not compile
    pub fn validate(&self, config: &Config) -> Result<Vec<String>> {
        if !config.root.is_dir() {
            return Err(DeckError::RootNotFound(config.root.clone()).into());
        }
        if config.data.as_os_str().is_empty() {
            anyhow::bail!("data path must not be empty");
        }

        let filters = PathFilters::new(&config.prune, &config.ignore)?;

        let mut warnings = Vec::new();
        if let Some(warning) = Self::check_data_location(config, &filters) {
            warnings.push(warning);
        }
        Ok(warnings)
    }

    /// The data directory inside the root would show up in every scan unless
    /// something excludes it.
    fn check_data_location(config: &Config, filters: &PathFilters) -> Option<String> {
        if !config.data.starts_with(&config.root) {
            return None;
        }

        let pruned = config
            .data
            .ancestors()
            .take_while(|dir| dir.starts_with(&config.root))
            .any(|dir| filters.is_pruned(dir));
        let ignored = filters.is_ignored(&config.data.join(DB_FILE));

        (!pruned && !ignored).then(|| {
            format!(
                "data directory {} is inside root {} and neither pruned nor ignored; its content will show up in scans",
                config.data.display(),
                config.root.display()
            )
        })
    }

    /// Report keys in a deckrc file that deck does not use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn unknown_fields(&self, config_path: &Path) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let parsed: toml::Table = toml::from_str(&content)?;

        let mut unknown: Vec<String> = parsed
            .keys()
            .filter(|key| !self.known_fields.contains(key.as_str()))
            .cloned()
            .collect();
        unknown.sort();
        Ok(unknown)
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
