//! Command implementations.

pub mod completions;
pub mod init;
pub mod list;
pub mod refresh;
pub mod scan;
pub mod version;

use crate::config::{resolve_config_dir, resolve_content_dir, resolve_db_path};
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use crate::sync::RefreshSettings;
use std::path::{Path, PathBuf};

/// Open the database for a command that needs an initialized store.
fn open_storage(db_path: Option<&PathBuf>) -> Result<SqliteStorage> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;

    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }

    SqliteStorage::open(&db_path)
}

/// Build refresh settings from the global `--content-dir` / `--config-dir` flags.
fn refresh_settings(content_dir: Option<&Path>, config_dir: Option<&Path>) -> RefreshSettings {
    RefreshSettings {
        content_dir: resolve_content_dir(content_dir),
        config_dir: resolve_config_dir(config_dir, content_dir),
        ..RefreshSettings::default()
    }
}
