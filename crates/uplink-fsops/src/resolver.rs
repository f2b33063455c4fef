//! Expands an upload source into the ordered list of files to transfer.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};

/// Resolve `path` into the regular files it denotes.
///
/// A regular file resolves to itself. A directory resolves to every regular
/// file beneath it, visited once each: entries are sorted by name and a
/// directory's contents come before the directory itself. Symlinks inside the
/// tree are not followed.
///
/// # Errors
///
/// Returns [`FsOpsError::PathNotFound`] when `path` does not exist, and other
/// variants when the tree cannot be read.
pub fn resolve(path: &Path) -> FsOpsResult<Vec<PathBuf>> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(FsOpsError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(FsOpsError::io("resolve.metadata", path, err)),
    };

    if metadata.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !metadata.is_dir() {
        return Err(FsOpsError::InvalidInput {
            field: "source_path",
            reason: "not a regular file or directory",
            value: Some(path.to_string_lossy().into_owned()),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).contents_first(true).sort_by_file_name() {
        let entry = entry.map_err(|source| FsOpsError::walkdir("resolve.walk", path, source))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    debug!(root = %path.display(), files = files.len(), "resolved upload source");
    Ok(files)
}

/// Name a resolved file is stored under on the backend.
///
/// A file resolved from itself keeps its file name. A file found inside a
/// directory keeps its path relative to that directory's parent, so the
/// directory tree is recreated under the destination folder.
#[must_use]
pub fn upload_name(root: &Path, file: &Path) -> String {
    let Ok(relative) = file.strip_prefix(root) else {
        return file_name_of(file);
    };
    if relative.as_os_str().is_empty() {
        return file_name_of(file);
    }

    let mut parts: Vec<String> = Vec::new();
    if let Some(name) = root.file_name() {
        parts.push(name.to_string_lossy().into_owned());
    }
    parts.extend(relative.components().filter_map(|component| match component {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    }));
    parts.join("/")
}

fn file_name_of(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}
