//! External process execution and result handling

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::error::{ArchiveError, Result};
use crate::types::ArchiveOperation;

/// Captured result of one archiver process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutcome {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn failure(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Default::default()
        }
    }

    pub fn succeeded(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs archiver operations
///
/// The task awaits every operation before starting the next one, so
/// implementations never see overlapping calls from the dispatcher.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, operation: &ArchiveOperation) -> Result<ExecOutcome>;
}

/// Runs operations as child processes
///
/// No timeout is applied: a hung archiver blocks the task.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, operation: &ArchiveOperation) -> Result<ExecOutcome> {
        debug!("exec: {} (cwd: {})", operation, operation.working_dir.display());

        let output = tokio::process::Command::new(&operation.tool)
            .args(&operation.args)
            .current_dir(&operation.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| spawn_error(operation, e))?;

        Ok(ExecOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Spawn reports a missing working directory as `NotFound` too.
fn spawn_error(operation: &ArchiveOperation, e: std::io::Error) -> ArchiveError {
    if e.kind() != std::io::ErrorKind::NotFound {
        return ArchiveError::Io(e);
    }
    if !operation.working_dir.is_dir() {
        return ArchiveError::Io(std::io::Error::new(
            e.kind(),
            format!(
                "could not start {}: working directory {} does not exist",
                operation.tool.display(),
                operation.working_dir.display()
            ),
        ));
    }
    ArchiveError::ToolNotFound {
        tool: operation.tool.display().to_string(),
        reason: e.to_string(),
    }
}

/// Forward archiver output to the log and fail on a non-zero exit.
pub fn handle_exec_result(outcome: &ExecOutcome, archive: &Path) -> Result<()> {
    for line in outcome.stdout.lines().filter(|l| !l.trim().is_empty()) {
        info!("{}", line);
    }
    for line in outcome.stderr.lines().filter(|l| !l.trim().is_empty()) {
        warn!("{}", line);
    }

    if outcome.succeeded() {
        return Ok(());
    }

    match outcome.code {
        Some(code) => error!("archiver exited with code {}", code),
        None => error!("archiver was terminated by a signal"),
    }
    Err(ArchiveError::ArchiveCreation {
        path: archive.to_path_buf(),
    })
}
