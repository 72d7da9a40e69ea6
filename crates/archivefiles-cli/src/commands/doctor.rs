//! Doctor command - Diagnostics

use std::path::PathBuf;

use anyhow::Result;
use archivefiles_adapters::create_archiver_factory;
use archivefiles_core::{select_strategy, ArchiveType, StrategyPlan, Tool, ToolResolver};
use colored::Colorize;

use crate::config::TaskEnvironment;

pub async fn execute(seven_zip: Option<PathBuf>) -> Result<()> {
    println!("{}", "🔍 ArchiveFiles Diagnostics".blue().bold());
    println!();

    let env = TaskEnvironment::detect(None)?;

    println!("{}", "System:".cyan());
    println!("   OS: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    println!("   Platform: {}", env.platform);
    println!("   Task directory: {}", env.task_dir.display().to_string().dimmed());
    println!();

    let mut tools = ToolResolver::new(env.platform, &env.task_dir);
    if let Some(path) = seven_zip {
        tools = tools.with_override(Tool::SevenZip, path);
    }

    println!("{}", "Archivers:".cyan());
    for tool in Tool::all() {
        check_tool(&tools, *tool);
    }
    println!();

    let factory = create_archiver_factory();
    let registered: Vec<String> = factory.registered().iter().map(|k| k.to_string()).collect();
    println!("{}", "Strategies:".cyan());
    println!("   {}", registered.join(", "));
    println!();

    println!("{}", "Archive types:".cyan());
    for archive_type in ArchiveType::all() {
        let backend = match select_strategy(env.platform, *archive_type, None) {
            StrategyPlan::Single { strategy, .. } if !factory.has(strategy) => {
                format!("{} (not registered)", strategy)
            }
            StrategyPlan::Single { strategy, .. } => strategy.to_string(),
            StrategyPlan::TarPipeline { .. } => "7zip (two-stage)".to_string(),
        };
        println!("   {:<8} → {}", archive_type.as_str(), backend.dimmed());
    }
    println!();

    println!("{}", "Done!".green().bold());

    Ok(())
}

fn check_tool(tools: &ToolResolver, tool: Tool) {
    match tools.resolve(tool) {
        Ok(path) if path.is_file() => {
            let path_str = path.display().to_string();
            println!("   {} {} - {}", "✓".green(), tool, path_str.dimmed());
        }
        Ok(path) => {
            println!(
                "   {} {} - {} {}",
                "✗".red(),
                tool,
                "missing at".red(),
                path.display()
            );
        }
        Err(_) => {
            println!("   {} {} - {}", "✗".red(), tool, "not found".red());
        }
    }
}
