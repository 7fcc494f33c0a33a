//! `.properties` file reading.
//!
//! Supports the line-oriented key/value format used by Java-style
//! property files:
//!
//! - `key=value`, `key: value` and `key value` separators
//! - `#` and `!` comment lines, blank lines ignored
//! - a trailing odd run of `\` continues the value on the next line
//! - escapes `\t`, `\n`, `\r`, `\f`, `\uXXXX` (surrogate pairs included),
//!   and `\x` → `x` for anything else
//!
//! Files are read as UTF-8.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::loader::LoadError;

/// Errors reading a property file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or is not UTF-8.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line could not be decoded.
    #[error("Malformed property at line {line}: {message}")]
    Malformed {
        /// Line number (1-indexed) where the logical line starts.
        line: usize,
        message: String,
    },

    /// A required key is absent.
    #[error("Missing property: {0}")]
    MissingProperty(String),

    /// Locating the file failed.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Parsed key/value pairs. Later duplicates replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a value that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingProperty`] if `key` is absent.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingProperty(key.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read and parse a property file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read as UTF-8 and
/// [`ConfigError::Malformed`] for undecodable escapes.
pub fn load_properties(path: &Path) -> Result<Properties, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_properties(&text)
}

/// Parse property text.
///
/// # Errors
///
/// Returns [`ConfigError::Malformed`] for undecodable escapes.
pub fn parse_properties(text: &str) -> Result<Properties, ConfigError> {
    let mut props = Properties::default();
    let mut lines = text.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let line = raw.trim_start_matches(is_blank);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        // Join continuation lines into one logical line
        let mut logical = String::new();
        let mut current = line;
        loop {
            if has_continuation(current) {
                logical.push_str(&current[..current.len() - 1]);
                match lines.next() {
                    Some((_, next)) => current = next.trim_start_matches(is_blank),
                    None => break,
                }
            } else {
                logical.push_str(current);
                break;
            }
        }

        let line_no = index + 1;
        let (key, value) = split_key_value(&logical);
        props
            .entries
            .insert(unescape(key, line_no)?, unescape(value, line_no)?);
    }

    Ok(props)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split at the first unescaped `=`, `:` or blank.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], line[i + 1..].trim_start_matches(is_blank)),
            c if is_blank(c) => {
                let rest = line[i..].trim_start_matches(is_blank);
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&line[..i], rest.trim_start_matches(is_blank));
            }
            _ => {}
        }
    }

    (line, "")
}

fn unescape(raw: &str, line: usize) -> Result<String, ConfigError> {
    let malformed = |message: String| ConfigError::Malformed { line, message };

    let mut out = String::with_capacity(raw.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut units, &mut out).map_err(malformed)?;
            out.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            break;
        };

        if escape == 'u' {
            let hex: String = chars.by_ref().take(4).collect();
            if hex.len() != 4 {
                return Err(malformed(format!("truncated \\u escape '\\u{hex}'")));
            }
            let unit = u16::from_str_radix(&hex, 16)
                .map_err(|_| malformed(format!("invalid \\u escape '\\u{hex}'")))?;
            units.push(unit);
            continue;
        }

        flush_units(&mut units, &mut out).map_err(malformed)?;
        out.push(match escape {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0c',
            other => other,
        });
    }

    flush_units(&mut units, &mut out).map_err(malformed)?;
    Ok(out)
}

/// Decode pending `\u` code units, which may form surrogate pairs.
fn flush_units(units: &mut Vec<u16>, out: &mut String) -> Result<(), String> {
    if units.is_empty() {
        return Ok(());
    }
    for decoded in char::decode_utf16(units.drain(..)) {
        let c = decoded.map_err(|e| format!("unpaired surrogate 0x{:04X}", e.unpaired_surrogate()))?;
        out.push(c);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_separators() {
        let props = parse_properties("a=1\nb: 2\nc 3\nd = 4\ne\t:\t5\nflag\n").unwrap();

        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("4"));
        assert_eq!(props.get("e"), Some("5"));
        assert_eq!(props.get("flag"), Some(""));
        assert_eq!(props.len(), 6);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let props = parse_properties("# comment\n\n   ! also comment\n  target = a,b\n").unwrap();

        assert_eq!(props.len(), 1);
        assert_eq!(props.get("target"), Some("a,b"));
    }

    #[test]
    fn test_value_keeps_separators_after_first() {
        let props = parse_properties("url=http://example.com/a=b\n").unwrap();
        assert_eq!(props.get("url"), Some("http://example.com/a=b"));
    }

    #[test]
    fn test_line_continuation() {
        let props = parse_properties("target = alpha,\\\n    beta,\\\n    gamma\nnext=1\n").unwrap();

        assert_eq!(props.get("target"), Some("alpha,beta,gamma"));
        assert_eq!(props.get("next"), Some("1"));
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let props = parse_properties("path=C:\\\\dir\\\\\nother=x\n").unwrap();

        assert_eq!(props.get("path"), Some("C:\\dir\\"));
        assert_eq!(props.get("other"), Some("x"));
    }

    #[test]
    fn test_escapes() {
        let props = parse_properties(
            "tab=a\\tb\nkey\\=with\\:seps=v\nname=\\u4F60\\u597D\nemoji=\\uD83D\\uDE00!\n",
        )
        .unwrap();

        assert_eq!(props.get("tab"), Some("a\tb"));
        assert_eq!(props.get("key=with:seps"), Some("v"));
        assert_eq!(props.get("name"), Some("你好"));
        assert_eq!(props.get("emoji"), Some("😀!"));
    }

    #[test]
    fn test_utf8_text_is_kept_as_is() {
        let props = parse_properties("target=你好,世界\n").unwrap();
        assert_eq!(props.get("target"), Some("你好,世界"));
    }

    #[test]
    fn test_bad_unicode_escape() {
        let result = parse_properties("ok=1\nbad=\\uZZZZ\n");
        assert!(matches!(result, Err(ConfigError::Malformed { line: 2, .. })));

        let result = parse_properties("lone=\\uD83D\n");
        assert!(matches!(result, Err(ConfigError::Malformed { line: 1, .. })));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let props = parse_properties("target=a\ntarget=b\n").unwrap();
        assert_eq!(props.get("target"), Some("b"));
    }

    #[test]
    fn test_require() {
        let props = parse_properties("a=1\n").unwrap();
        assert_eq!(props.require("a").unwrap(), "1");
        assert!(matches!(
            props.require("target"),
            Err(ConfigError::MissingProperty(k)) if k == "target"
        ));
    }

    #[test]
    fn test_load_properties_rejects_non_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.properties");
        std::fs::write(&path, [b't', b'=', 0xE9]).unwrap();

        assert!(matches!(load_properties(&path), Err(ConfigError::Io { .. })));
    }
}
