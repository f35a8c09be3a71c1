//! Config Command
//!
//! Usage:
//!   docloop config show [-f json]
//!   docloop config path

use crate::cli::util::CommandContext;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Print the effective (merged) configuration
pub fn show(ctx: &CommandContext, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    } else {
        println!("{}", ConfigLoader::render(&ctx.config)?);
    }
    Ok(())
}

/// Print the configuration search paths
pub fn path() -> Result<()> {
    match ConfigLoader::global_config_path() {
        Some(global) => {
            let marker = if global.exists() { "" } else { " (not found)" };
            println!("Global:  {}{}", global.display(), marker);
        }
        None => println!("Global:  (no home directory)"),
    }

    let project = ConfigLoader::project_config_path();
    let marker = if project.exists() { "" } else { " (not found)" };
    println!("Project: {}{}", project.display(), marker);
    Ok(())
}
