use anyhow::{anyhow, Result};
use std::fs::File;
use std::path::Path;

/// Opens `path` for reading, naming the `kind` of file in the error.
pub fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}

/// Reads `path` into a string, naming the `kind` of file in the error.
pub fn read_to_string(path: &Path, kind: &str) -> Result<String> {
    use std::io::Read;
    let mut contents = String::new();
    open(path, kind)?
        .read_to_string(&mut contents)
        .map_err(|e| anyhow!("Reading {} file `{}`: {}", kind, path.display(), e))?;
    Ok(contents)
}
