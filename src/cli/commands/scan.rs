//! Scan command: show what a refresh would pick up, file by file.

use super::refresh_settings;
use crate::error::Result;
use crate::loader::{file_key, list_matching};
use crate::sync::read_target_filter;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ScannedFile {
    path: PathBuf,
    key: String,
}

#[derive(Serialize)]
struct ScanOutput {
    content_dir: PathBuf,
    config_dir: PathBuf,
    files: Vec<ScannedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_error: Option<String>,
}

/// Execute the scan command.
///
/// Unlike `refresh`, configuration problems are reported rather than
/// silently ignored.
///
/// # Errors
///
/// Returns an error if the content directory cannot be walked.
pub fn execute(content_dir: Option<&Path>, config_dir: Option<&Path>, json: bool) -> Result<()> {
    let settings = refresh_settings(content_dir, config_dir);

    let mut paths = list_matching(&settings.content_dir, &settings.content_suffix)?;
    paths.sort();
    let files: Vec<ScannedFile> = paths
        .into_iter()
        .map(|path| ScannedFile {
            key: file_key(&path),
            path,
        })
        .collect();

    let (filter, config_error) =
        match read_target_filter(&settings.config_dir, &settings.config_suffix) {
            Ok(filter) => (filter.and_then(|f| f.keys()), None),
            Err(e) => (None, Some(e.to_string())),
        };

    let output = ScanOutput {
        content_dir: settings.content_dir,
        config_dir: settings.config_dir,
        files,
        filter,
        config_error,
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Content: {}", output.content_dir.display());
    if output.files.is_empty() {
        println!("  (no Markdown files)");
    }
    for file in &output.files {
        println!("  {:<24} {}", file.key, file.path.display());
    }

    println!();
    println!("Config: {}", output.config_dir.display());
    match (&output.filter, &output.config_error) {
        (_, Some(error)) => println!("  unusable, refresh imports everything ({error})"),
        (Some(keys), None) => println!("  target = {}", keys.join(", ")),
        (None, None) => println!("  no target filter, refresh imports everything"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::loader::{write_file, LoadError};
    use tempfile::TempDir;

    #[test]
    fn test_scan_reports_files() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir.path().join("a.md"), "a").unwrap();
        write_file(&temp_dir.path().join("config.properties"), "other=1").unwrap();

        assert!(execute(Some(temp_dir.path()), None, true).is_ok());
    }

    #[test]
    fn test_scan_missing_content_dir() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = execute(Some(&missing), Some(temp_dir.path()), true);
        assert!(matches!(result, Err(Error::Load(LoadError::NotFound(_)))));
    }
}
