//! Recursive suffix-filtered file listing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};
use walkdir::WalkDir;

use super::{LoadError, LoadResult};

/// List every regular file under `root` whose path ends with `suffix`.
///
/// - `root` is a file: returns `[root]` when it matches, `[]` otherwise.
/// - `root` is a directory: walks it recursively. Directories are always
///   descended into and never returned, even when their own name ends with
///   `suffix`.
///
/// Matching is a literal trailing-substring test on the absolute path text
/// (see [`path_ends_with`]), so `.md` matches `d.md` but not `notes.markdown`.
///
/// Symbolic links are followed. A link that loops back to one of its
/// ancestors, or one whose target is missing, is skipped with a warning.
///
/// The result is in directory-listing order, which is unspecified.
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] if `root` does not exist,
/// [`LoadError::Read`] if its metadata cannot be read, and
/// [`LoadError::Walk`] if any directory under it cannot be listed.
pub fn list_matching(root: &Path, suffix: &str) -> LoadResult<Vec<PathBuf>> {
    let metadata = fs::metadata(root).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound(root.to_path_buf())
        } else {
            LoadError::Read {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;

    if metadata.is_file() {
        return Ok(if path_ends_with(root, suffix) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut matches = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.loop_ancestor().is_some() => {
                warn!(
                    path = %err.path().unwrap_or(root).display(),
                    "Skipping symlink cycle"
                );
                continue;
            }
            Err(err) if is_dangling_link(&err) => {
                warn!(
                    path = %err.path().unwrap_or(root).display(),
                    "Skipping dangling symlink"
                );
                continue;
            }
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                return Err(LoadError::Walk { path, source: err });
            }
        };

        if entry.file_type().is_file() && path_ends_with(entry.path(), suffix) {
            trace!(path = %entry.path().display(), "Matched");
            matches.push(entry.into_path());
        }
    }

    Ok(matches)
}

/// Literal trailing-substring test on the absolute form of `path`.
///
/// There is no separator requirement: `config.properties` matches both
/// `doc/config.properties` and `doc/site-config.properties`.
#[must_use]
pub fn path_ends_with(path: &Path, suffix: &str) -> bool {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    };
    absolute.to_string_lossy().ends_with(suffix)
}

fn is_dangling_link(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);

    not_found
        && err.path().is_some_and(|p| {
            fs::symlink_metadata(p).is_ok_and(|m| m.file_type().is_symlink())
        })
}
