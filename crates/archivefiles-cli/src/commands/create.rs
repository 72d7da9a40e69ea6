//! Create command - Archive a folder

use std::path::PathBuf;

use anyhow::{Context, Result};
use archivefiles_adapters::create_archiver_factory;
use archivefiles_core::{
    select_files, Dispatcher, InputResolver, ProcessRunner, RawInputs, Tool, ToolResolver,
};
use clap::Args;
use colored::Colorize;
use tracing::debug;

use crate::config::{report_task_result, TaskEnvironment};

/// Task inputs, from flags or the agent's `INPUT_*` variables
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Folder to archive (relative paths resolve against the repository root)
    #[arg(long, env = "INPUT_ROOTFOLDER")]
    pub root_folder: Option<String>,

    /// Keep the root folder as the top-level archive entry (true|false)
    #[arg(long, env = "INPUT_INCLUDEROOTFOLDER")]
    pub include_root_folder: Option<String>,

    /// Archive type: default, zip, tar, 7z, gzip, bzip2, xz, wim
    #[arg(long, env = "INPUT_ARCHIVETYPE")]
    pub archive_type: Option<String>,

    /// Tar compression: none, gz, bz2, xz (tar only)
    #[arg(long, env = "INPUT_TARCOMPRESSION")]
    pub tar_compression: Option<String>,

    /// Archive file to create
    #[arg(long, env = "INPUT_ARCHIVEFILE")]
    pub archive_file: Option<String>,

    /// Delete an existing archive file first (true|false)
    #[arg(long, env = "INPUT_REPLACEEXISTINGARCHIVE")]
    pub replace_existing_archive: Option<String>,

    /// Repository root used to resolve relative paths
    #[arg(long, env = "BUILD_SOURCESDIRECTORY")]
    pub repo_root: Option<PathBuf>,

    /// YAML or JSON file with default inputs
    #[arg(long)]
    pub inputs: Option<PathBuf>,

    /// Override the 7-Zip executable
    #[arg(long, env = "ARCHIVEFILES_SEVEN_ZIP")]
    pub seven_zip: Option<PathBuf>,
}

impl CreateArgs {
    /// Inputs given on the command line or in the environment
    pub fn raw_inputs(&self) -> RawInputs {
        RawInputs {
            root_folder: self.root_folder.clone(),
            include_root_folder: self.include_root_folder.clone(),
            archive_type: self.archive_type.clone(),
            tar_compression: self.tar_compression.clone(),
            archive_file: self.archive_file.clone(),
            replace_existing_archive: self.replace_existing_archive.clone(),
        }
    }

    /// Inputs file values overlaid with command line and environment values
    pub fn collect_inputs(&self) -> Result<RawInputs> {
        let base = match &self.inputs {
            Some(path) => RawInputs::load(path)
                .with_context(|| format!("Failed to load inputs from {}", path.display()))?,
            None => RawInputs::default(),
        };
        Ok(base.merge(self.raw_inputs()))
    }
}

pub async fn run(args: CreateArgs) -> Result<()> {
    println!("{}", "📦 Creating archive...".cyan().bold());

    let env = TaskEnvironment::detect(args.repo_root.clone())?;
    debug!("environment: {:?}", env);

    let raw = args.collect_inputs()?;
    let request = InputResolver::new(env.repo_root.clone()).resolve(&raw)?;
    let files = select_files(&request.root_folder, request.include_root_folder)?;

    println!("  📁 Root folder: {}", request.root_folder.display().to_string().dimmed());
    println!("  🗜️  Archive type: {}", request.archive_type.to_string().dimmed());
    println!("  📄 {} top-level entries", files.len());

    let mut tools = ToolResolver::new(env.platform, &env.task_dir);
    if let Some(path) = args.seven_zip {
        tools = tools.with_override(Tool::SevenZip, path);
    }

    let dispatcher = Dispatcher::new(create_archiver_factory(), tools, Box::new(ProcessRunner));
    let result = dispatcher.create_archive(&request, &files).await?;

    for warning in &result.warnings {
        println!("  {} {}", "⚠️".yellow(), warning.yellow());
    }
    println!("{}", format!("✅ {}", result.message()).green().bold());
    report_task_result(true, &result.message());

    Ok(())
}
