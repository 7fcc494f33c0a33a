//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// blogsync - Markdown directory to blog database sync
#[derive(Parser, Debug)]
#[command(name = "blogsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.blogsync/data/blogsync.db)
    #[arg(long, global = true, env = "BLOGSYNC_DB")]
    pub db: Option<PathBuf>,

    /// Directory scanned for Markdown articles (default: doc/content)
    #[arg(long, global = true, env = "BLOGSYNC_CONTENT_DIR")]
    pub content_dir: Option<PathBuf>,

    /// Directory scanned for config.properties (default: the content directory)
    #[arg(long, global = true, env = "BLOGSYNC_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Actor name for audit trail
    #[arg(long, global = true, env = "BLOGSYNC_ACTOR")]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and scaffold the content directory
    Init {
        /// Re-run on an existing database (re-applies the schema, keeps articles)
        #[arg(long)]
        force: bool,
    },

    /// Replace auto-imported articles with the local Markdown files
    Refresh {
        /// Show what would be imported without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// List the Markdown files and keys a refresh would see
    Scan,

    /// List stored articles
    List {
        /// Maximum number of articles to show
        #[arg(short, long, default_value_t = 50)]
        limit: u32,

        /// Include articles not created by sync
        #[arg(long)]
        all: bool,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
