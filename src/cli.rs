//! Command-line interface definitions for deck.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.

#![allow(missing_docs)]

use clap::{ArgGroup, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for deck.
#[derive(Parser)]
#[command(
    name = "deck",
    version = crate::VERSION,
    about = "Hands off package manager",
    long_about = "Tracks files under a root directory, lets you pick new or changed ones, \
                  and commits them as versioned packages backed by a content-addressed store"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of $DECK_CONFIG_PATH, ~/.deckrc or /etc/deckrc
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Scan the filesystem for changes
    #[command(alias = "s")]
    Scan {
        /// Use sha1 to compare files
        #[arg(short = 's', long)]
        hash: bool,

        /// Pick new and modified files
        #[arg(short, long)]
        pick: bool,
    },

    /// Pick files for the next commit
    #[command(alias = "p")]
    Pick {
        /// Paths to pick
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Unpick files
    #[command(alias = "u")]
    Unpick {
        /// Unpick all files
        #[arg(short, long, conflicts_with = "paths")]
        all: bool,

        /// Paths to unpick
        paths: Vec<String>,
    },

    /// Commit picked files to the index under a package name and version
    Commit {
        /// Package name
        #[arg(short, long = "package")]
        package: String,

        /// Package version
        #[arg(short = 'V', long = "version")]
        version: String,
    },

    /// List all packages in the index
    #[command(alias = "l")]
    List {
        /// Do not print version numbers
        #[arg(short, long)]
        names_only: bool,
    },

    /// Show files belonging to a package
    #[command(alias = "o")]
    #[command(group(ArgGroup::new("target").required(true).args(["package", "all"])))]
    Show {
        /// Package name
        package: Option<String>,

        /// Show every indexed file
        #[arg(short, long)]
        all: bool,
    },

    /// Remove files from the index, leaving them on disk
    #[command(alias = "rm")]
    Remove {
        /// Paths to remove
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Restore files from the index
    Reset {
        /// Paths to reset
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Delete a package's files from disk and from the index
    Uninstall {
        /// Package name
        package: String,

        /// Only uninstall this version
        #[arg(short = 'V', long = "version")]
        version: Option<String>,
    },

    /// Show which package owns each file
    #[command(visible_aliases = ["who", "what"], alias = "w")]
    Which {
        /// Paths to look up
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Check the index against configuration and the blob store
    #[command(alias = "doc")]
    Doctor,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_flags() {
        let cli = Cli::try_parse_from(["deck", "s", "-s", "-p"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Scan {
                hash: true,
                pick: true
            }
        ));
    }

    #[test]
    fn test_commit_requires_both_tags() {
        assert!(Cli::try_parse_from(["deck", "commit", "-p", "nginx"]).is_err());
        let cli = Cli::try_parse_from(["deck", "commit", "-p", "nginx", "-V", "1.25"]).unwrap();
        match cli.command {
            Commands::Commit { package, version } => {
                assert_eq!(package, "nginx");
                assert_eq!(version, "1.25");
            }
            _ => panic!("expected commit"),
        }
    }

    #[test]
    fn test_show_needs_name_or_all() {
        assert!(Cli::try_parse_from(["deck", "show"]).is_err());
        assert!(Cli::try_parse_from(["deck", "show", "nginx", "--all"]).is_err());
        assert!(Cli::try_parse_from(["deck", "o", "--all"]).is_ok());
    }

    #[test]
    fn test_which_aliases() {
        for alias in ["which", "w", "who", "what"] {
            assert!(Cli::try_parse_from(["deck", alias, "/etc/hosts"]).is_ok());
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["deck", "doctor", "-d", "-c", "/tmp/deckrc"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/deckrc")));
    }
}
