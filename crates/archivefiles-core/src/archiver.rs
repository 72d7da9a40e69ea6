//! Archiver strategy trait and factory

use std::collections::HashMap;
use std::ffi::OsString;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;
use crate::exec::{handle_exec_result, CommandRunner};
use crate::tools::{Tool, ToolResolver};
use crate::types::{ArchiveOperation, ArchiveStep, StrategyKind};

/// Archiver strategy trait
///
/// Each backend (7-Zip, tar, zip) implements this trait to turn an
/// [`ArchiveStep`] into a command line. Running the command and judging its
/// exit status is shared.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Strategy this archiver realizes
    fn kind(&self) -> StrategyKind;

    /// Executable driven by this archiver
    fn tool(&self) -> Tool;

    /// Command line arguments for one step
    fn arguments(&self, step: &ArchiveStep) -> Vec<OsString>;

    /// Build the operation for a step, resolving the executable
    fn operation(&self, step: &ArchiveStep, tools: &ToolResolver) -> Result<ArchiveOperation> {
        Ok(ArchiveOperation {
            strategy: self.kind(),
            tool: tools.resolve(self.tool())?,
            args: self.arguments(step),
            archive: step.archive.clone(),
            working_dir: step.working_dir.clone(),
        })
    }

    /// Produce an archive for one step
    async fn archive(
        &self,
        step: &ArchiveStep,
        tools: &ToolResolver,
        runner: &dyn CommandRunner,
    ) -> Result<ArchiveOperation> {
        debug!("Creating archive with {}: {}", self.kind(), step.archive.display());
        let operation = self.operation(step, tools)?;
        info!("cwd = {}", operation.working_dir.display());
        info!("{}", operation);

        let outcome = runner.run(&operation).await?;
        handle_exec_result(&outcome, &step.archive)?;
        Ok(operation)
    }
}

/// Archiver factory for creating and managing strategies
pub struct ArchiverFactory {
    archivers: HashMap<StrategyKind, Box<dyn Archiver>>,
}

impl Default for ArchiverFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiverFactory {
    pub fn new() -> Self {
        Self {
            archivers: HashMap::new(),
        }
    }

    /// Register an archiver, replacing any previous one of the same kind
    pub fn register(&mut self, archiver: Box<dyn Archiver>) {
        self.archivers.insert(archiver.kind(), archiver);
    }

    pub fn get(&self, kind: StrategyKind) -> Option<&dyn Archiver> {
        self.archivers.get(&kind).map(|a| a.as_ref())
    }

    pub fn has(&self, kind: StrategyKind) -> bool {
        self.archivers.contains_key(&kind)
    }

    /// Registered strategies, ordered by name
    pub fn registered(&self) -> Vec<StrategyKind> {
        let mut kinds: Vec<StrategyKind> = self.archivers.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }
}
