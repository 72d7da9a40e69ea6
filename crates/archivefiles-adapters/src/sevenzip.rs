//! 7-Zip archiver
//!
//! Command line: `7z a -t<format> <archive> <file>...`
//!
//! The catch-all backend: every format on Windows, and any format other
//! than tar and zip elsewhere. Also used for both passes of the Windows
//! compressed tar pipeline.

use std::ffi::OsString;

use archivefiles_core::{ArchiveStep, Archiver, StrategyKind, Tool};
use async_trait::async_trait;

/// Format used when a step does not name one
const DEFAULT_FORMAT: &str = "zip";

/// 7-Zip archiver strategy
pub struct SevenZipArchiver;

impl SevenZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SevenZipArchiver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Archiver for SevenZipArchiver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SevenZip
    }

    fn tool(&self) -> Tool {
        Tool::SevenZip
    }

    fn arguments(&self, step: &ArchiveStep) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(step.inputs.len() + 3);
        args.push("a".into());
        args.push(format!("-t{}", step.format.unwrap_or(DEFAULT_FORMAT)).into());
        args.push(step.archive.clone().into_os_string());
        args.extend(step.inputs.iter().map(|p| p.clone().into_os_string()));
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_argument_shape() {
        let step = ArchiveStep {
            format: Some("7z"),
            archive: PathBuf::from("/out/a.7z"),
            inputs: vec![PathBuf::from("one"), PathBuf::from("two")],
            working_dir: PathBuf::from("/src"),
        };
        let args: Vec<String> = SevenZipArchiver::new()
            .arguments(&step)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["a", "-t7z", "/out/a.7z", "one", "two"]);
    }

    #[test]
    fn test_missing_format_defaults_to_zip() {
        let step = ArchiveStep {
            format: None,
            archive: PathBuf::from("a.zip"),
            inputs: Vec::new(),
            working_dir: PathBuf::from("."),
        };
        assert_eq!(SevenZipArchiver::new().arguments(&step)[1], OsString::from("-tzip"));
    }
}
