//! Native zip archiver (non-Windows)
//!
//! Command line: `zip -r <archive> <file>...`. `-r` makes zip descend into
//! directory inputs, which is how folders end up with their contents.

use std::ffi::OsString;

use archivefiles_core::{ArchiveStep, Archiver, StrategyKind, Tool};
use async_trait::async_trait;

/// zip archiver strategy
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZipArchiver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Archiver for ZipArchiver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Zip
    }

    fn tool(&self) -> Tool {
        Tool::Zip
    }

    fn arguments(&self, step: &ArchiveStep) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-r".into(), step.archive.clone().into_os_string()];
        args.extend(step.inputs.iter().map(|p| p.clone().into_os_string()));
        args
    }
}
