//! Core type definitions for ArchiveFiles

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ArchiveError;

/// Host platform family, which decides the available archivers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostPlatform {
    Windows,
    Unix,
}

impl HostPlatform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Unix
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HostPlatform::Windows => "windows",
            HostPlatform::Unix => "unix",
        }
    }
}

impl std::fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested archive container format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveType {
    Default,
    Zip,
    Tar,
    SevenZ,
    Gzip,
    Bzip2,
    Xz,
    Wim,
}

impl ArchiveType {
    pub fn all() -> &'static [ArchiveType] {
        &[
            ArchiveType::Default,
            ArchiveType::Zip,
            ArchiveType::Tar,
            ArchiveType::SevenZ,
            ArchiveType::Gzip,
            ArchiveType::Bzip2,
            ArchiveType::Xz,
            ArchiveType::Wim,
        ]
    }

    /// Input value naming this archive type
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveType::Default => "default",
            ArchiveType::Zip => "zip",
            ArchiveType::Tar => "tar",
            ArchiveType::SevenZ => "7z",
            ArchiveType::Gzip => "gzip",
            ArchiveType::Bzip2 => "bzip2",
            ArchiveType::Xz => "xz",
            ArchiveType::Wim => "wim",
        }
    }

    /// Value passed to 7-Zip's `-t` switch. `default` means zip.
    pub fn seven_zip_format(&self) -> &'static str {
        match self {
            ArchiveType::Default => "zip",
            other => other.as_str(),
        }
    }
}

impl std::fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArchiveType {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArchiveType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                ArchiveError::Configuration(format!(
                    "Unsupported archive type '{}', expected one of: {}",
                    s,
                    ArchiveType::all()
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

/// Compression applied on top of a tar container
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TarCompression {
    None,
    Gz,
    Bz2,
    Xz,
}

impl TarCompression {
    pub fn all() -> &'static [TarCompression] {
        &[
            TarCompression::None,
            TarCompression::Gz,
            TarCompression::Bz2,
            TarCompression::Xz,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TarCompression::None => "none",
            TarCompression::Gz => "gz",
            TarCompression::Bz2 => "bz2",
            TarCompression::Xz => "xz",
        }
    }

    /// Long option understood by GNU tar and bsdtar, without the leading `--`
    pub fn tar_flag(&self) -> Option<&'static str> {
        match self {
            TarCompression::None => None,
            TarCompression::Gz => Some("gzip"),
            TarCompression::Bz2 => Some("bzip2"),
            TarCompression::Xz => Some("xz"),
        }
    }

    /// 7-Zip `-t` format used to compress an existing tar
    pub fn seven_zip_format(&self) -> Option<&'static str> {
        self.tar_flag()
    }
}

impl std::fmt::Display for TarCompression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TarCompression {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TarCompression::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                ArchiveError::Configuration(format!(
                    "Unsupported tar compression '{}', expected one of: none, gz, bz2, xz",
                    s
                ))
            })
    }
}

/// Validated archive request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub root_folder: PathBuf,
    pub include_root_folder: bool,
    pub archive_type: ArchiveType,
    pub archive_file: PathBuf,
    pub replace_existing: bool,
    pub tar_compression: Option<TarCompression>,
}

impl ArchiveRequest {
    /// Directory every archiver runs in.
    ///
    /// The parent of the root folder when it is included, so its name becomes
    /// the top-level entry; the root folder itself otherwise.
    pub fn working_dir(&self) -> &Path {
        if self.include_root_folder {
            self.root_folder
                .parent()
                .unwrap_or(self.root_folder.as_path())
        } else {
            &self.root_folder
        }
    }
}

/// Top-level paths handed to the archiver, in enumeration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: Vec<PathBuf>,
}

impl FileSet {
    pub fn new(entries: Vec<PathBuf>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as they should appear on an archiver command line run from `working_dir`
    pub fn relative_to(&self, working_dir: &Path) -> Vec<PathBuf> {
        self.entries
            .iter()
            .map(|entry| crate::utils::relative_entry(entry, working_dir))
            .collect()
    }
}

/// Backend strategy realizing an archive type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    SevenZip,
    Tar,
    Zip,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::SevenZip => "7zip",
            StrategyKind::Tar => "tar",
            StrategyKind::Zip => "zip",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One archiving step handed to a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveStep {
    /// Strategy specific format: 7-Zip `-t` value or tar compression flag
    pub format: Option<&'static str>,
    pub archive: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub working_dir: PathBuf,
}

/// A single external archiver invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOperation {
    pub strategy: StrategyKind,
    pub tool: PathBuf,
    pub args: Vec<OsString>,
    pub archive: PathBuf,
    pub working_dir: PathBuf,
}

impl ArchiveOperation {
    /// Arguments rendered lossily, for logs and assertions
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl std::fmt::Display for ArchiveOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tool.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Outcome of a successful archive run
#[derive(Debug, Clone)]
pub struct ArchiveResult {
    pub archive: PathBuf,
    pub operations: Vec<ArchiveOperation>,
    pub warnings: Vec<String>,
}

impl ArchiveResult {
    pub fn message(&self) -> String {
        format!("Successfully created archive: {}", self.archive.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_type_parse_is_case_sensitive() {
        assert_eq!("7z".parse::<ArchiveType>().unwrap(), ArchiveType::SevenZ);
        assert_eq!("default".parse::<ArchiveType>().unwrap(), ArchiveType::Default);
        assert!("ZIP".parse::<ArchiveType>().is_err());
        assert!("rar".parse::<ArchiveType>().is_err());
    }

    #[test]
    fn test_tar_compression_flags() {
        assert_eq!(TarCompression::None.tar_flag(), None);
        assert_eq!(TarCompression::Gz.tar_flag(), Some("gzip"));
        assert_eq!(TarCompression::Bz2.seven_zip_format(), Some("bzip2"));
        assert_eq!(TarCompression::Xz.tar_flag(), Some("xz"));
        assert!("GZ".parse::<TarCompression>().is_err());
    }

    #[test]
    fn test_working_dir_follows_include_flag() {
        let mut request = ArchiveRequest {
            root_folder: PathBuf::from("/work/src/app"),
            include_root_folder: true,
            archive_type: ArchiveType::Zip,
            archive_file: PathBuf::from("/work/out/app.zip"),
            replace_existing: false,
            tar_compression: None,
        };
        assert_eq!(request.working_dir(), Path::new("/work/src"));

        request.include_root_folder = false;
        assert_eq!(request.working_dir(), Path::new("/work/src/app"));
    }

    #[test]
    fn test_success_message() {
        let result = ArchiveResult {
            archive: PathBuf::from("/out/a.zip"),
            operations: Vec::new(),
            warnings: Vec::new(),
        };
        assert_eq!(result.message(), "Successfully created archive: /out/a.zip");
    }
}
