//! Initialize a blogsync workspace.
//!
//! Creates the article database (default `~/.blogsync/data/blogsync.db`)
//! and scaffolds the content directory with a commented `config.properties`
//! so a first `blogsync refresh` has somewhere to look.

use crate::config::{resolve_config_dir, resolve_content_dir, resolve_db_path, CONFIG_SUFFIX};
use crate::error::{Error, Result};
use crate::loader::write_lines;
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_TEMPLATE: &[&str] = &[
    "# blogsync configuration",
    "#",
    "# target: comma-separated file keys to import (file name up to the first '.').",
    "# Leave unset to import every Markdown file.",
    "#target=hello,about",
];

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    content_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<PathBuf>,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns [`Error::AlreadyInitialized`] if the database exists and `force`
/// is not set, or an error if directories or the database cannot be created.
/// With `force`, an existing database is reopened and its schema re-applied;
/// stored articles survive.
pub fn execute(
    db_path: Option<&PathBuf>,
    content_dir: Option<&Path>,
    config_dir: Option<&Path>,
    force: bool,
    json: bool,
) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or_else(|| {
        Error::Config("Could not determine the blogsync data directory".to_string())
    })?;

    if db_path.exists() && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    // Opening applies the schema; existing tables and rows are kept
    SqliteStorage::open(&db_path)?;
    debug!(path = %db_path.display(), "Database ready");

    let content = resolve_content_dir(content_dir);
    fs::create_dir_all(&content)?;

    // Only scaffold a config file when none exists yet
    let config_root = resolve_config_dir(config_dir, content_dir);
    let config_path = config_root.join(CONFIG_SUFFIX);
    let config_file = if config_path.exists() {
        None
    } else {
        write_lines(&config_path, CONFIG_TEMPLATE)?;
        Some(config_path)
    };

    if json {
        let output = InitOutput {
            database: db_path,
            content_dir: content,
            config_file,
        };
        let payload = serde_json::to_string(&output)?;
        println!("{payload}");
    } else {
        println!("Initialized blogsync");
        println!("  Database:    {}", db_path.display());
        println!("  Content dir: {}", content.display());
        if let Some(path) = config_file {
            println!("  Config:      {}", path.display());
        }
        println!();
        println!("Next: add Markdown files and run 'blogsync refresh'.");
    }

    Ok(())
}
