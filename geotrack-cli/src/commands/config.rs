//! Configuration CLI commands.
//!
//! `config path` prints where the configuration file is read from and
//! `config show` prints the effective settings as INI.

use std::path::Path;

use clap::Subcommand;
use geotrack::config::config_file_path;

use crate::error::CliError;
use crate::runner::load_config;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration (defaults filled in)
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, explicit: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(explicit),
        ConfigCommands::Show => run_show(explicit),
    }
}

fn run_path(explicit: Option<&Path>) -> Result<(), CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_file_path()
            .ok_or_else(|| CliError::Config("Could not determine config directory".to_string()))?,
    };

    println!("{}", path.display());
    if !path.exists() {
        println!("(file does not exist, defaults are in effect)");
    }
    Ok(())
}

fn run_show(explicit: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(explicit)?;
    print!("{}", config.to_ini_string());
    Ok(())
}
