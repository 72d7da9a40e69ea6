//! File set selection

use std::path::Path;

use tracing::debug;

use crate::error::{ArchiveError, Result};
use crate::types::FileSet;

/// Select the top-level paths handed to the archiver.
///
/// With `include_root_folder` the set is the root folder alone and the
/// archiver recurses into it; otherwise it is the folder's immediate
/// children, one level, in enumeration order.
pub fn select_files(root_folder: &Path, include_root_folder: bool) -> Result<FileSet> {
    let not_found = |e: std::io::Error| ArchiveError::PathNotFound {
        path: root_folder.to_path_buf(),
        reason: e.to_string(),
    };

    std::fs::metadata(root_folder).map_err(not_found)?;

    let files = if include_root_folder {
        FileSet::new(vec![root_folder.to_path_buf()])
    } else {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(root_folder).map_err(not_found)? {
            entries.push(entry.map_err(not_found)?.path());
        }
        FileSet::new(entries)
    };

    debug!("Found: {} files to archive:", files.len());
    for file in files.entries() {
        debug!("{}", file.display());
    }

    Ok(files)
}
