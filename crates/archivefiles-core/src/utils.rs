//! Path helpers shared by input resolution and dispatch

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and fold `..` into its parent.
///
/// Does not touch the filesystem, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Path of `entry` as seen from `working_dir`.
///
/// Entries outside the working directory are returned unchanged; the working
/// directory itself becomes `.`. Relative entries always start with `./` so a
/// file named like an option (`--remove-files`) is never read as one.
pub fn relative_entry(entry: &Path, working_dir: &Path) -> PathBuf {
    match entry.strip_prefix(working_dir) {
        Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rel) => Path::new(".").join(rel),
        Err(_) => entry.to_path_buf(),
    }
}
