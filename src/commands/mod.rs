//! Subcommand implementations and their argument types.

pub mod build;
pub mod clean;
pub mod init;
pub mod serve;

use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Parser)]
pub struct InitArgs {
    /// The path to the desired location of the new project
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Include example content for newcomers
    #[arg(short, long, default_value = "false")]
    pub example: bool,
}

#[derive(Parser)]
pub struct BuildArgs {
    /// The path to the project being built
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Display more detailed information
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct ServeArgs {
    /// The path to the project being served
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "3883")]
    pub port: u16,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    pub open: bool,

    /// Display more detailed information
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct CleanArgs {
    /// The path to the project being cleaned
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print what would be deleted without deleting anything
    #[arg(short, long, default_value = "false")]
    pub dry_run: bool,
}

/// Resolve a project path argument against the working directory.
pub(crate) fn resolve_path(path: &Path) -> Result<PathBuf, anyhow::Error> {
    if path.is_relative() {
        Ok(std::env::current_dir()?.join(path))
    } else {
        Ok(path.to_path_buf())
    }
}
