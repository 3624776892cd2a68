//! Config CLI commands

use std::path::Path;

use anyhow::{anyhow, Result};
use clap::Subcommand;

use super::output::Output;
use crate::storage::{Config, Workspace};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show where the configuration file is read from
    Path,
}

pub fn run(
    cmd: ConfigCommands,
    output: &Output,
    workspace: &Workspace,
    config_path: Option<&Path>,
) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(output, workspace),
        ConfigCommands::Path => path(output, config_path),
    }
}

fn show(output: &Output, workspace: &Workspace) -> Result<()> {
    let config = workspace.config();

    if output.is_json() {
        output.data(&serde_json::json!({
            "todo_file": workspace.path().display().to_string(),
            "subtask_marker": config.subtask_marker,
            "default_format": config.default_format,
        }));
    } else {
        let effective = Config {
            todo_file: workspace.path().to_path_buf(),
            ..config.clone()
        };
        print!("{}", effective.to_toml()?);
    }

    Ok(())
}

fn path(output: &Output, config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    output.verbose_ctx("config", &format!("Config file exists: {}", path.exists()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        }));
    } else {
        println!("{}", path.display());
    }

    Ok(())
}
