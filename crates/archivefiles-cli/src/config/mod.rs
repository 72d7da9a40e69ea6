//! Task environment and agent result reporting

use std::path::PathBuf;

use anyhow::{Context, Result};
use archivefiles_core::HostPlatform;

/// Environment variable the pipeline agent sets on every build
const AGENT_MARKER_VAR: &str = "TF_BUILD";

/// Where the task runs: repository root, task directory and host platform
#[derive(Debug, Clone)]
pub struct TaskEnvironment {
    pub repo_root: Option<PathBuf>,
    pub task_dir: PathBuf,
    pub platform: HostPlatform,
}

impl TaskEnvironment {
    /// Detect the environment of the running task
    pub fn detect(repo_root: Option<PathBuf>) -> Result<Self> {
        let exe = std::env::current_exe().context("Could not locate the task executable")?;
        let task_dir = match exe.parent() {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().context("Could not read the working directory")?,
        };

        Ok(Self {
            repo_root: repo_root.filter(|p| !p.as_os_str().is_empty()),
            task_dir,
            platform: HostPlatform::current(),
        })
    }
}

/// Whether the process runs under the pipeline agent
pub fn running_in_agent() -> bool {
    std::env::var(AGENT_MARKER_VAR)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// `##vso` logging command completing the task
pub fn task_complete_command(succeeded: bool, message: &str) -> String {
    let result = if succeeded { "Succeeded" } else { "Failed" };
    // Logging commands are line based.
    let message = message.replace('\r', " ").replace('\n', " ");
    format!("##vso[task.complete result={};]{}", result, message)
}

/// Report the task result to the agent, when there is one
pub fn report_task_result(succeeded: bool, message: &str) {
    if running_in_agent() {
        println!("{}", task_complete_command(succeeded, message));
    }
}
