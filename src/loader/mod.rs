//! Local file loading.
//!
//! Stateless helpers that find files by path suffix and read them as lines:
//!
//! - **Listing**: recursive suffix-filtered walk ([`list_matching`])
//! - **Reading**: a file as ordered lines ([`read_lines`])
//! - **Content maps**: file key → lines for a whole tree ([`load_content_map`])
//! - **Writing**: create-or-truncate helpers used to scaffold content
//!
//! # Failure policy
//!
//! Loading is strict. A missing root, a directory that cannot be listed or a
//! file that cannot be read as UTF-8 fails the whole call. The only entries
//! skipped are symbolic links that close a cycle or point nowhere; those are
//! logged at `warn`.
//!
//! # Ordering
//!
//! Results follow the underlying directory-listing order. Callers must not
//! rely on it being sorted or stable across platforms.

mod content;
mod walk;

use std::path::PathBuf;

pub use content::{
    file_key, insert_file_content, load_content_list, load_content_map, read_lines, write_file,
    write_lines, ContentMap,
};
pub use walk::{list_matching, path_ends_with};

/// Errors raised while loading local files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The root path does not exist.
    #[error("Content root not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory under the root could not be listed.
    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A file could not be opened or decoded.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for loader operations.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
