//! Archiver executable resolution
//!
//! A [`ToolResolver`] is built once per run and handed to every strategy.
//! Each executable is looked up at most once; later requests reuse the
//! cached path.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{ArchiveError, Result};
use crate::types::HostPlatform;

/// External executables the task drives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tool {
    SevenZip,
    Tar,
    Zip,
}

impl Tool {
    pub fn all() -> &'static [Tool] {
        &[Tool::SevenZip, Tool::Tar, Tool::Zip]
    }

    /// Binary name searched for on `PATH`
    pub fn binary_name(&self) -> &'static str {
        match self {
            Tool::SevenZip => "7z",
            Tool::Tar => "tar",
            Tool::Zip => "zip",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.binary_name())
    }
}

/// Relative location of the 7-Zip build shipped with the task on Windows
pub const BUNDLED_SEVEN_ZIP: &str = "7zip/7z.exe";

/// Resolves and memoizes archiver executable paths
pub struct ToolResolver {
    platform: HostPlatform,
    bundled_seven_zip: PathBuf,
    search_path: Option<OsString>,
    overrides: HashMap<Tool, PathBuf>,
    seven_zip: OnceCell<PathBuf>,
    tar: OnceCell<PathBuf>,
    zip: OnceCell<PathBuf>,
}

impl ToolResolver {
    /// Create a resolver for `platform`, with the bundled 7-Zip under `task_dir`
    pub fn new(platform: HostPlatform, task_dir: &Path) -> Self {
        Self {
            platform,
            bundled_seven_zip: task_dir.join(BUNDLED_SEVEN_ZIP),
            search_path: None,
            overrides: HashMap::new(),
            seven_zip: OnceCell::new(),
            tar: OnceCell::new(),
            zip: OnceCell::new(),
        }
    }

    /// Search `paths` (in `PATH` syntax) instead of the process `PATH`
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    /// Use a fixed executable for `tool`, skipping lookup
    pub fn with_override(mut self, tool: Tool, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(tool, path.into());
        self
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    /// Resolve the executable for `tool`, looking it up on first use
    pub fn resolve(&self, tool: Tool) -> Result<PathBuf> {
        if let Some(path) = self.overrides.get(&tool) {
            return Ok(path.clone());
        }

        if tool == Tool::SevenZip && self.platform == HostPlatform::Windows {
            return Ok(self.bundled_seven_zip.clone());
        }

        let cell = match tool {
            Tool::SevenZip => &self.seven_zip,
            Tool::Tar => &self.tar,
            Tool::Zip => &self.zip,
        };

        cell.get_or_try_init(|| self.lookup(tool)).cloned()
    }

    fn lookup(&self, tool: Tool) -> Result<PathBuf> {
        let name = tool.binary_name();
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir()?;
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };

        let path = found.map_err(|e| ArchiveError::ToolNotFound {
            tool: name.to_string(),
            reason: e.to_string(),
        })?;
        debug!("resolved {} to {}", name, path.display());
        Ok(path)
    }
}
