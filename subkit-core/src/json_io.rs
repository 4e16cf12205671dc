//! Reading and atomically writing the JSON files a Rush repository keeps.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Removes `//` and `/* */` comments outside of string literals.
///
/// `rush.json` and friends are JSON-with-comments; the comments are dropped
/// on load and not written back.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a JSON (or JSON-with-comments) file into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_to_string(path)?;
    serde_json::from_str(&strip_comments(&content)).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes `value` with two-space indentation and a trailing newline,
/// replacing `path` atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    write_atomic(path, content.as_bytes())
}

/// Writes through a temp file in the destination directory, then renames it
/// over `path`. Readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_err = |source| Error::File {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(file_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(file_err)?;
    tmp.write_all(contents).map_err(file_err)?;
    tmp.as_file().sync_all().map_err(file_err)?;
    tmp.persist(path).map_err(|e| file_err(e.error))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
