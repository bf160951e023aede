use crate::error::DeckError;
use anyhow::Result;
use regex::RegexSet;
use std::path::Path;

/// Compiled prune and ignore pattern lists.
///
/// Patterns are unanchored regular expressions matched against the whole
/// path string, so `\.swp$` ignores swap files anywhere and `^/proc` prunes a
/// single top level directory.
#[derive(Debug, Clone)]
pub struct PathFilters {
    prune: RegexSet,
    ignore: RegexSet,
}

impl PathFilters {
    /// Compile both lists, naming the first pattern that fails.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::InvalidPattern`] for a malformed pattern.
    pub fn new(prune: &[String], ignore: &[String]) -> Result<Self> {
        Ok(Self {
            prune: compile("prune", prune)?,
            ignore: compile("ignore", ignore)?,
        })
    }

    /// Filters that match nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            prune: RegexSet::empty(),
            ignore: RegexSet::empty(),
        }
    }

    /// True if a directory at `path` should be skipped with its subtree.
    #[must_use]
    pub fn is_pruned(&self, path: &Path) -> bool {
        self.prune.is_match(&path.to_string_lossy())
    }

    /// True if `path` itself should be skipped.
    #[must_use]
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignore.is_match(&path.to_string_lossy())
    }
}

fn compile(list: &'static str, patterns: &[String]) -> Result<RegexSet> {
    // Compile one at a time first so the error can name the culprit.
    for pattern in patterns {
        if let Err(source) = regex::Regex::new(pattern) {
            return Err(DeckError::InvalidPattern {
                list,
                pattern: pattern.clone(),
                source,
            }
            .into());
        }
    }
    Ok(RegexSet::new(patterns)?)
}
