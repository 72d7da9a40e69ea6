//! Inner tar name inference for compressed tar archives
//!
//! When a compressed tar is built in two passes (tar first, then compress),
//! the uncompressed tar has to be named the way the compressor expects to
//! find it inside `foo.tar.gz`, `foo.tgz` and friends, and the task must know
//! that name to delete the file afterwards. Extension sets follow the GNU tar
//! auto-compress suffixes.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Full double extensions (gzip, xz, bzip2)
const FULL_EXTENSIONS: &[&str] = &[".tar.gz", ".tar.xz", ".tar.bz2"];

/// Abbreviated extensions. `tbz2` carries no leading dot on purpose: it also
/// catches names such as `foo_tbz2`.
const ABBREVIATED_EXTENSIONS: &[&str] = &[".tgz", ".taz", ".tz2", "tbz2", ".tbz", ".txz"];

/// Compute the name of the tar expected inside a compressed tar archive.
///
/// Matching is ASCII case-insensitive; the original casing of the kept part
/// of the name is preserved.
///
/// ```
/// use archivefiles_core::compute_tar_name;
///
/// assert_eq!(compute_tar_name("foo.tar.gz"), "foo.tar");
/// assert_eq!(compute_tar_name("foo.tgz"), "foo.tar");
/// assert_eq!(compute_tar_name("foo.tar.custom123"), "foo.tar");
/// assert_eq!(compute_tar_name("foo"), "foo.tar");
/// ```
pub fn compute_tar_name(archive_name: &str) -> String {
    // ASCII lowering keeps byte offsets aligned with `archive_name`.
    let lower = archive_name.to_ascii_lowercase();

    if FULL_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return strip_last_extension(archive_name).to_string();
    }

    if ABBREVIATED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return format!("{}.tar", strip_last_extension(archive_name));
    }

    // foo.tar.anything -> foo.tar
    if let Some(idx) = lower.rfind(".tar.").filter(|&idx| idx > 0) {
        return archive_name[..idx + 4].to_string();
    }

    // foo.anything -> foo.tar
    if let Some(idx) = lower.rfind('.').filter(|&idx| idx > 0) {
        debug!("non standard archive name: {}", archive_name);
        return format!("{}.tar", &archive_name[..idx]);
    }

    format!("{}.tar", archive_name)
}

/// Path of the intermediate tar next to `archive`.
///
/// Only the file name takes part in inference, so dots in directory names
/// never influence the result.
pub fn intermediate_tar_path(archive: &Path) -> PathBuf {
    match archive.file_name() {
        Some(name) => archive.with_file_name(compute_tar_name(&name.to_string_lossy())),
        None => PathBuf::from(compute_tar_name(&archive.to_string_lossy())),
    }
}

fn strip_last_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}
