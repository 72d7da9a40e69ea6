//! ArchiveFiles CLI
//!
//! Build task that bundles a folder into an archive using the platform's
//! archivers.

mod commands;
mod config;

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "archivefiles")]
#[command(author, version, about = "ArchiveFiles - bundle a folder into an archive", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        global = true,
        env = "SYSTEM_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an archive from a folder
    Create(commands::create::CreateArgs),

    /// Print the intermediate tar name used for a compressed tar archive
    #[command(name = "tar-name")]
    TarName {
        /// Final archive file name, e.g. out.tar.gz
        name: String,
    },

    /// Diagnose platform and archiver availability
    Doctor {
        /// Override the 7-Zip executable
        #[arg(long, env = "ARCHIVEFILES_SEVEN_ZIP")]
        seven_zip: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "archivefiles_cli=debug,archivefiles_core=debug,archivefiles_adapters=debug"
        } else {
            "archivefiles_cli=info,archivefiles_core=info"
        })
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("Starting ArchiveFiles");

    let is_create = matches!(cli.command, Commands::Create(_));

    let result = match cli.command {
        Commands::Create(args) => commands::create::run(args).await,
        Commands::TarName { name } => commands::tar_name::run(&name),
        Commands::Doctor { seven_zip } => commands::doctor::execute(seven_zip).await,
    };

    if let Err(ref e) = result {
        error!("Command failed: {:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if is_create {
            config::report_task_result(false, &format!("{:#}", e));
        }
        std::process::exit(1);
    }

    result
}
