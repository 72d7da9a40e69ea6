//! Native tar archiver (non-Windows)
//!
//! Command line: `tar -c [--<compression>] -f <archive> <file>...`

use std::ffi::OsString;

use archivefiles_core::{ArchiveStep, Archiver, StrategyKind, Tool};
use async_trait::async_trait;

/// tar archiver strategy; the step format is the compression long option
pub struct TarArchiver;

impl TarArchiver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TarArchiver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Archiver for TarArchiver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Tar
    }

    fn tool(&self) -> Tool {
        Tool::Tar
    }

    fn arguments(&self, step: &ArchiveStep) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-c".into()];
        if let Some(compression) = step.format {
            args.push(format!("--{}", compression).into());
        }
        args.push("-f".into());
        args.push(step.archive.clone().into_os_string());
        args.extend(step.inputs.iter().map(|p| p.clone().into_os_string()));
        args
    }
}
