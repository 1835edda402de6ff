//! Loading and persisting catalogs, and discovering new-item files. Reads
//! are forgiving (a missing or corrupt catalog is an empty catalog) while
//! writes are not: any failure to persist output is returned to the caller.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::record::CatalogRecord;

const JSON_EXTENSION: &str = "json";

/// Reads a JSON file. Returns `Ok(None)` if the file doesn't exist or holds
/// nothing but whitespace.
pub fn read_json(path: &Path) -> Result<Option<Value>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(Error::Read {
                path: path.to_owned(),
                err,
            })
        }
    };
    if contents.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })
}

/// Loads a persisted catalog. A missing, empty, or unreadable file, or one
/// that isn't a JSON array, yields an empty catalog. Array entries that
/// aren't objects with an `id` are dropped.
pub fn load_catalog(path: &Path) -> Vec<CatalogRecord> {
    let entries = match read_json(path) {
        Ok(Some(Value::Array(entries))) => entries,
        Ok(Some(_)) => {
            warn!(path = %path.display(), "catalog is not a JSON array; starting empty");
            return Vec::new();
        }
        Ok(None) => {
            debug!(path = %path.display(), "no existing catalog");
            return Vec::new();
        }
        Err(err) => {
            warn!(error = %err, "failed to load catalog; starting empty");
            return Vec::new();
        }
    };

    let total = entries.len();
    let records: Vec<CatalogRecord> = entries
        .into_iter()
        .filter_map(CatalogRecord::from_catalog_entry)
        .collect();
    if records.len() < total {
        warn!(
            path = %path.display(),
            dropped = total - records.len(),
            "dropped catalog entries without an id"
        );
    }
    records
}

/// Writes `value` as pretty-printed JSON (two-space indent) followed by a
/// newline, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut contents = serde_json::to_string_pretty(value).map_err(|err| Error::Serialize {
        path: path.to_owned(),
        err,
    })?;
    contents.push('\n');
    write_file(path, contents.as_bytes())
}

/// Writes `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let annotate = |err| Error::Write {
        path: path.to_owned(),
        err,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(annotate)?;
    }
    fs::write(path, contents).map_err(annotate)
}

/// Lists the `.json` files directly inside `dir`, sorted by file name. A
/// missing directory yields no files; unreadable entries are skipped with a
/// warning.
pub fn list_json_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "new items directory not found");
        return Vec::new();
    }

    let mut files = Vec::new();
    for result in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        match result {
            Ok(entry) => {
                let is_json = entry
                    .path()
                    .extension()
                    .map_or(false, |ext| ext == JSON_EXTENSION);
                if entry.file_type().is_file() && is_json {
                    files.push(entry.into_path());
                }
            }
            Err(err) => warn!(error = %err, "skipping unreadable directory entry"),
        }
    }
    files
}

/// The result of a fallible catalog store operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure reading or writing catalog files.
#[derive(Debug)]
pub enum Error {
    /// Returned when a file exists but can't be read.
    Read { path: PathBuf, err: io::Error },

    /// Returned when a file's contents aren't valid JSON.
    Parse {
        path: PathBuf,
        err: serde_json::Error,
    },

    /// Returned when a value can't be serialized to JSON.
    Serialize {
        path: PathBuf,
        err: serde_json::Error,
    },

    /// Returned when an output file or its directory can't be written.
    Write { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Parsing JSON in '{}': {}", path.display(), err)
            }
            Error::Serialize { path, err } => {
                write!(f, "Serializing JSON for '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::Serialize { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
        }
    }
}
