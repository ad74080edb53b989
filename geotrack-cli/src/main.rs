//! GeoTrack CLI - Command-line interface
//!
//! Replays recorded tracks through a tracking session, measures distances
//! and inspects the configuration file.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::replay::ReplayArgs;

#[derive(Parser)]
#[command(name = "geotrack")]
#[command(version = geotrack::VERSION)]
#[command(about = "Distance-gated location tracking with speed infraction alerts", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.config/geotrack/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tracking session over a recorded track
    Replay {
        /// Track file, one `latitude,longitude[,speed_mps]` per line
        track: PathBuf,

        /// Sampling interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Minimum distance in meters before a fix is synced
        #[arg(long)]
        distance_threshold: Option<f64>,

        /// Speed limit in km/h
        #[arg(long)]
        speed_limit: Option<f64>,

        /// Where to append synced records (JSON lines)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Simulate the user refusing location permission
        #[arg(long)]
        deny_permission: bool,
    },

    /// Print the great-circle distance between two points in meters
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },

    /// Inspect the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay {
            track,
            interval_ms,
            distance_threshold,
            speed_limit,
            out,
            deny_permission,
        } => commands::replay::run(
            ReplayArgs {
                track,
                interval_ms,
                distance_threshold,
                speed_limit,
                out,
                deny_permission,
            },
            cli.config.as_deref(),
        ),
        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => commands::distance::run(lat1, lon1, lat2, lon2),
        Commands::Config(command) => commands::config::run(command, cli.config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_distance_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["geotrack", "distance", "-25.69", "-54.43", "-25.70", "-54.44"])
            .unwrap();
        match cli.command {
            Commands::Distance { lat1, lon2, .. } => {
                assert_eq!(lat1, -25.69);
                assert_eq!(lon2, -54.44);
            }
            _ => panic!("expected distance command"),
        }
    }

    #[test]
    fn test_replay_flags() {
        let cli = Cli::try_parse_from([
            "geotrack",
            "replay",
            "track.csv",
            "--interval-ms",
            "1000",
            "--speed-limit",
            "60",
            "--deny-permission",
        ])
        .unwrap();
        match cli.command {
            Commands::Replay {
                track,
                interval_ms,
                speed_limit,
                distance_threshold,
                deny_permission,
                ..
            } => {
                assert_eq!(track, PathBuf::from("track.csv"));
                assert_eq!(interval_ms, Some(1000));
                assert_eq!(speed_limit, Some(60.0));
                assert_eq!(distance_threshold, None);
                assert!(deny_permission);
            }
            _ => panic!("expected replay command"),
        }
    }
}
