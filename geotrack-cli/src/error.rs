//! CLI error type.

use std::path::PathBuf;

use geotrack::config::ConfigError;
use geotrack::logging::LoggingError;
use geotrack::source::TrackParseError;
use geotrack::TrackingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error("Configuration file: {0}")]
    ConfigFile(#[from] ConfigError),

    #[error("Logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("{0}")]
    Track(#[from] TrackParseError),

    #[error("Track {0} contains no points")]
    EmptyTrack(PathBuf),

    #[error("Invalid coordinate {0}, {1}")]
    InvalidCoordinate(f64, f64),

    #[error("Tracking failed: {0}")]
    Tracking(#[from] TrackingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
