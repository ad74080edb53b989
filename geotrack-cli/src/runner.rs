//! Shared setup for long-running commands: configuration and logging.

use std::path::Path;

use geotrack::config::ConfigFile;
use geotrack::logging::{self, WorkerGuard};
use tracing::info;

use crate::error::CliError;

pub struct CliRunner {
    config: ConfigFile,
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    /// Load the configuration (`path` or the default location) and install
    /// the tracing subscriber.
    pub fn new(path: Option<&Path>) -> Result<Self, CliError> {
        let config = load_config(path)?;
        let log_guard = logging::init(&config.logging)?;
        Ok(Self {
            config,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(version = geotrack::VERSION, command, "GeoTrack starting");
    }
}

/// Load `path` if given, else the default configuration file.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}
