//! CLI argument definitions using clap derive

use crate::config::Config;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// cpan-index - print the CPAN package index
///
/// Keeps a local copy of 02packages.details.txt.gz up to date with
/// conditional requests, then prints it decompressed.
#[derive(Parser, Debug)]
#[command(name = "cpan-index")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute (defaults to cat)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print the index modification time instead of its content
    #[arg(short = 't', long = "mtime", short_alias = 'm')]
    pub mtime: bool,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CPAN_INDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// URL of the index to mirror
    #[arg(long, global = true, env = "CPAN_INDEX_URL")]
    pub url: Option<String>,

    /// Directory holding the cached index
    #[arg(long, global = true, env = "CPAN_INDEX_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Refresh deadline in seconds (0 = none)
    #[arg(long, global = true, env = "CPAN_INDEX_TIMEOUT")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// The command to run, honoring the `-t`/`-m` shorthand
    pub fn resolved_command(&self) -> Commands {
        match &self.command {
            Some(command) => command.clone(),
            None if self.mtime => Commands::Mtime,
            None => Commands::Cat,
        }
    }

    /// Layer command-line and environment overrides on top of `config`
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.source.url = url.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.cache.dir = Some(dir.clone());
        }
        if let Some(timeout) = self.timeout {
            config.network.timeout_secs = timeout;
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Refresh the index and print it decompressed (default)
    Cat,

    /// Refresh the index and print when it was last modified
    #[command(visible_alias = "time")]
    Mtime,

    /// Print the path of the cached index file
    Path,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the config command
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
