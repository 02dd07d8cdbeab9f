use std::fs;
use std::path::Path;

use crate::Result;

/// Create the directory that will hold `file_path`, if it has one.
pub fn ensure_parent_directory(file_path: impl AsRef<Path>) -> Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// True when `path` exists and holds at least one byte.
pub fn has_content(path: impl AsRef<Path>) -> bool {
    fs::metadata(path.as_ref())
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
