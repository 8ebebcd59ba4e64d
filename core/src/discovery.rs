//! discovery.rs
//! Turns a root path into the ordered list of files a job will process.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::types::StreamError;

/// Collect the regular files under `root`.
///
/// - A file root yields a one-element list.
/// - A directory root is walked recursively; symlinks are not followed and
///   only regular files are kept, sorted by path.
/// - A missing root is `NotFound`.
///
/// An empty result is returned as-is; `Job::new` rejects it.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>, StreamError> {
    let meta = std::fs::metadata(root).map_err(|e| StreamError::io(root, e))?;
    if meta.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
            StreamError::io(&path, source)
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
        // symlinks and special files are skipped
    }
    files.sort();

    tracing::debug!(root = %root.display(), count = files.len(), "collected files");
    Ok(files)
}
