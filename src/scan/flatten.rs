use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::Result;

/// Map every regular file under `root` (at any depth) to its file name.
///
/// The walk keeps its own stack of open directories, so deep trees do not
/// grow the call stack. Any unreadable directory, including a missing root,
/// is returned as an error. Symlinks to regular files are always recorded.
/// With `follow_links` set, symlinked directories are descended; links that
/// loop back to an ancestor or point nowhere are skipped.
pub fn flatten_directory(root: impl AsRef<Path>, follow_links: bool) -> Result<BTreeMap<PathBuf, String>> {
    let root = root.as_ref();
    let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    let mut files = BTreeMap::new();
    for entry in WalkDir::new(&root).follow_links(follow_links) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.loop_ancestor().is_some() => {
                warn!("Skipping symlink loop: {}", err);
                continue;
            }
            Err(err) if err.depth() > 0 && err.path().map_or(false, is_symlink) => {
                warn!("Skipping broken symlink: {}", err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        if is_regular_file(&entry) {
            let name = entry.file_name().to_string_lossy().into_owned();
            files.insert(entry.into_path(), name);
        }
    }

    Ok(files)
}

fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Regular files, and symlinks whose target is a regular file.
fn is_regular_file(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        return false;
    }
    match std::fs::metadata(entry.path()) {
        Ok(target) => target.is_file(),
        Err(e) => {
            debug!("Ignoring broken symlink {}: {}", entry.path().display(), e);
            false
        }
    }
}
