//! Reading and writing file contents as lines.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::walk::list_matching;
use super::{LoadError, LoadResult};

/// File key → file lines.
pub type ContentMap = HashMap<String, Vec<String>>;

/// Derive the key for a file: its base name up to the first `.`.
///
/// `hello.md` → `hello`, `notes.v2.md` → `notes`, `.hidden.md` → `""`.
#[must_use]
pub fn file_key(path: &Path) -> String {
    path.file_name()
        .map(|name| {
            name.to_string_lossy()
                .split('.')
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .unwrap_or_default()
}

/// Read a file as UTF-8 lines, in file order, without terminators.
///
/// `\n`, `\r\n` and a lone `\r` each end a line. A final terminator does
/// not start an extra empty line, and an empty file yields no lines.
///
/// # Errors
///
/// Returns [`LoadError::Read`] if the file cannot be opened, read, or is
/// not valid UTF-8.
pub fn read_lines(path: &Path) -> LoadResult<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_lines(&text))
}

fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(end) = rest.find(['\r', '\n']) else {
            lines.push(rest.to_string());
            break;
        };
        lines.push(rest[..end].to_string());
        let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[end + terminator..];
    }

    lines
}

/// Read every file under `root` ending with `suffix`, one entry per file.
///
/// # Errors
///
/// Propagates listing and read errors.
pub fn load_content_list(root: &Path, suffix: &str) -> LoadResult<Vec<Vec<String>>> {
    list_matching(root, suffix)?
        .iter()
        .map(|path| read_lines(path))
        .collect()
}

/// Read one file into `map` under its [`file_key`].
///
/// Returns the lines previously stored under the same key, if any.
///
/// # Errors
///
/// Returns [`LoadError::Read`] if the file cannot be read.
pub fn insert_file_content(path: &Path, map: &mut ContentMap) -> LoadResult<Option<Vec<String>>> {
    let lines = read_lines(path)?;
    Ok(map.insert(file_key(path), lines))
}

/// Load every file under `root` ending with `suffix` as key → lines.
///
/// Keys are not guaranteed unique. When two files share a key, the one
/// processed later replaces the earlier one; since listing order is
/// unspecified, which file wins is too. Each replacement is logged.
///
/// # Errors
///
/// Propagates listing and read errors.
pub fn load_content_map(root: &Path, suffix: &str) -> LoadResult<ContentMap> {
    let mut loaded: HashMap<String, (PathBuf, Vec<String>)> = HashMap::new();

    for path in list_matching(root, suffix)? {
        let lines = read_lines(&path)?;
        let key = file_key(&path);
        if let Some((previous, _)) = loaded.get(&key) {
            warn!(
                key = %key,
                replaced = %previous.display(),
                by = %path.display(),
                "Duplicate file key, keeping the later file"
            );
        }
        loaded.insert(key, (path, lines));
    }

    debug!(root = %root.display(), suffix, count = loaded.len(), "Loaded content map");
    Ok(loaded
        .into_iter()
        .map(|(key, (_, lines))| (key, lines))
        .collect())
}

/// Write `data` to `path`, creating or truncating it.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns [`LoadError::Write`] if any file operation fails.
pub fn write_file(path: &Path, data: &str) -> LoadResult<()> {
    let write_err = |source| LoadError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(data.as_bytes()).map_err(write_err)?;
    writer.flush().map_err(write_err)
}

/// Write `lines` joined by `\n` (no trailing newline).
///
/// # Errors
///
/// Returns [`LoadError::Write`] if any file operation fails.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> LoadResult<()> {
    let data = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    write_file(path, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_key() {
        assert_eq!(file_key(Path::new("doc/content/hello.md")), "hello");
        assert_eq!(file_key(Path::new("notes.v2.md")), "notes");
        assert_eq!(file_key(Path::new("README")), "README");
        assert_eq!(file_key(Path::new(".hidden.md")), "");
        assert_eq!(file_key(Path::new("/")), "");
    }

    #[test]
    fn test_read_lines_strips_terminators() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hello.md");
        fs::write(&path, "# Hi\r\nbody text\n\nlast").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec!["# Hi", "body text", "", "last"]);
    }

    #[test]
    fn test_read_lines_lone_carriage_return_ends_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("classic.md");
        fs::write(&path, "# Hi\rbody text\r").unwrap();

        assert_eq!(read_lines(&path).unwrap(), vec!["# Hi", "body text"]);
    }

    #[test]
    fn test_read_lines_mixed_terminators() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mixed.md");
        fs::write(&path, "a\r\rb\r\n\nc\n").unwrap();

        assert_eq!(read_lines(&path).unwrap(), vec!["a", "", "b", "", "c"]);
    }

    #[test]
    fn test_read_lines_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.md");
        fs::write(&path, "").unwrap();

        assert!(read_lines(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_lines_missing_file() {
        let result = read_lines(Path::new("/nonexistent/file.md"));
        assert!(matches!(result, Err(LoadError::Read { .. })));
    }

    #[test]
    fn test_read_lines_rejects_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latin1.md");
        fs::write(&path, [0x63, 0x61, 0x66, 0xE9, 0x0A]).unwrap();

        let result = read_lines(&path);
        assert!(matches!(result, Err(LoadError::Read { path: p, .. }) if p == path));
    }

    #[test]
    fn test_load_content_map_matches_read_lines() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(&root.join("one.md"), "first\n").unwrap();
        write_file(&root.join("nested/two.md"), "a\nb\n").unwrap();
        write_file(&root.join("nested/deeper/three.md"), "").unwrap();
        write_file(&root.join("nested/skip.txt"), "ignored").unwrap();

        let map = load_content_map(root, ".md").unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map["one"], read_lines(&root.join("one.md")).unwrap());
        assert_eq!(map["two"], vec!["a", "b"]);
        assert!(map["three"].is_empty());
    }

    #[test]
    fn test_load_content_map_collision_keeps_one_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(&root.join("a/post.md"), "from a").unwrap();
        write_file(&root.join("b/post.md"), "from b").unwrap();

        let map = load_content_map(root, ".md").unwrap();

        assert_eq!(map.len(), 1);
        let winner = &map["post"];
        assert!(winner == &vec!["from a"] || winner == &vec!["from b"]);
    }

    #[test]
    fn test_insert_file_content_returns_previous() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a/post.md");
        let second = temp_dir.path().join("b/post.md");
        write_file(&first, "one").unwrap();
        write_file(&second, "two").unwrap();

        let mut map = ContentMap::new();
        assert!(insert_file_content(&first, &mut map).unwrap().is_none());
        let previous = insert_file_content(&second, &mut map).unwrap();

        assert_eq!(previous, Some(vec!["one".to_string()]));
        assert_eq!(map["post"], vec!["two"]);
    }

    #[test]
    fn test_load_content_list() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir.path().join("x.md"), "1\n2").unwrap();
        write_file(&temp_dir.path().join("y.md"), "3").unwrap();

        let mut contents = load_content_list(temp_dir.path(), ".md").unwrap();
        contents.sort();

        assert_eq!(contents, vec![vec!["1", "2"], vec!["3"]]);
    }

    #[test]
    fn test_load_content_map_propagates_read_errors() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir.path().join("good.md"), "fine").unwrap();
        fs::write(temp_dir.path().join("bad.md"), [0xFF, 0xFE, 0x00]).unwrap();

        let result = load_content_map(temp_dir.path(), ".md");
        assert!(matches!(result, Err(LoadError::Read { .. })));
    }

    #[test]
    fn test_write_lines_joins_without_trailing_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out/lines.md");

        write_lines(&path, &["a", "b"]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb");
        assert_eq!(read_lines(&path).unwrap(), vec!["a", "b"]);
    }
}
