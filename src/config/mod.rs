//! Configuration management.
//!
//! This module provides functions for resolving the database path, the
//! content and configuration roots, and the actor recorded in the audit log.
//!
//! # Layout
//!
//! - **Database**: `~/.blogsync/data/blogsync.db` unless `--db`/`BLOGSYNC_DB`
//!   says otherwise
//! - **Content**: `doc/content` relative to the working directory, scanned
//!   for `.md` files
//! - **Sync config**: the first `config.properties` under `doc/content`

pub mod properties;

pub use properties::{load_properties, parse_properties, ConfigError, Properties};

use std::path::{Path, PathBuf};

/// Directory scanned for articles.
pub const DEFAULT_CONTENT_DIR: &str = "doc/content";

/// Directory scanned for the sync configuration file.
pub const DEFAULT_CONFIG_DIR: &str = "doc/content";

/// Path suffix of article files.
pub const CONTENT_SUFFIX: &str = ".md";

/// Path suffix of the sync configuration file.
pub const CONFIG_SUFFIX: &str = "config.properties";

/// Get the global blogsync directory location.
///
/// `BLOGSYNC_HOME` overrides the default `~/.blogsync/`.
#[must_use]
pub fn global_blogsync_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("BLOGSYNC_HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }
    directories::BaseDirs::new().map(|b| b.home_dir().join(".blogsync"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. Global location: `<global dir>/data/blogsync.db`
///
/// # Returns
///
/// Returns the path to the database file, or `None` if no location found.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    global_blogsync_dir().map(|dir| dir.join("data").join("blogsync.db"))
}

/// Resolve the content root, falling back to [`DEFAULT_CONTENT_DIR`].
#[must_use]
pub fn resolve_content_dir(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR), Path::to_path_buf)
}

/// Resolve the configuration root.
///
/// Falls back to the content root when one was given explicitly, then to
/// [`DEFAULT_CONFIG_DIR`].
#[must_use]
pub fn resolve_config_dir(explicit: Option<&Path>, content_dir: Option<&Path>) -> PathBuf {
    explicit
        .or(content_dir)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR), Path::to_path_buf)
}

/// Get the default actor name.
///
/// Priority:
/// 1. `BLOGSYNC_ACTOR` environment variable
/// 2. Git user name
/// 3. System username
/// 4. "unknown"
#[must_use]
pub fn default_actor() -> String {
    if let Ok(actor) = std::env::var("BLOGSYNC_ACTOR") {
        if !actor.is_empty() {
            return actor;
        }
    }

    if let Ok(output) = std::process::Command::new("git")
        .args(["config", "user.name"])
        .output()
    {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }

    if let Ok(user) = std::env::var("USER") {
        return user;
    }

    "unknown".to_string()
}
