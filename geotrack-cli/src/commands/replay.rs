//! Replay command - run a tracking session over a recorded track.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use geotrack::config::ConfigFile;
use geotrack::permission::FixedPermission;
use geotrack::runner::IntervalRunner;
use geotrack::session::{
    Collaborators, SessionEvent, SessionSnapshot, SkipReason, TrackingSession,
};
use geotrack::source::ReplayPositionSource;
use geotrack::store::JsonLinesStore;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CliError;
use crate::runner::CliRunner;

/// How long to wait for in-flight writes after the session stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Arguments for the replay command.
pub struct ReplayArgs {
    pub track: PathBuf,
    pub interval_ms: Option<u64>,
    pub distance_threshold: Option<f64>,
    pub speed_limit: Option<f64>,
    pub out: Option<PathBuf>,
    pub deny_permission: bool,
}

/// What a finished replay produced.
#[derive(Debug)]
pub struct ReplaySummary {
    pub points: usize,
    pub out: PathBuf,
    pub stats: SessionSnapshot,
    pub infractions: Vec<String>,
    pub interrupted: bool,
}

/// Run the replay command.
pub fn run(args: ReplayArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("replay");

    let shutdown = CancellationToken::new();
    let handler_token = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(replay(args, runner.config(), shutdown))?;

    print_summary(&summary);
    Ok(())
}

/// Replay `args.track` until it runs out or `shutdown` fires.
pub async fn replay(
    args: ReplayArgs,
    config: &ConfigFile,
    shutdown: CancellationToken,
) -> Result<ReplaySummary, CliError> {
    let settings = effective_config(&args, config)?;

    let source = Arc::new(ReplayPositionSource::from_file(&args.track).await?);
    if source.total() == 0 {
        return Err(CliError::EmptyTrack(args.track));
    }

    let out = args.out.clone().unwrap_or_else(|| settings.store.path.clone());
    let permission = if args.deny_permission {
        FixedPermission::deny()
    } else {
        FixedPermission::grant()
    };

    let session = TrackingSession::new(
        settings.session_config(),
        Collaborators {
            permission: Arc::new(permission),
            source: source.clone(),
            store: Arc::new(JsonLinesStore::new(&out)),
            runner: Arc::new(IntervalRunner::new()),
        },
    );
    let mut events = session.subscribe();

    println!("GeoTrack Replay v{}", geotrack::VERSION);
    println!("==================");
    println!();
    println!("Track:       {} ({} points)", args.track.display(), source.total());
    println!("Output:      {}", out.display());
    println!("Interval:    {} ms", settings.tracking.interval_ms);
    println!("Threshold:   {} m", settings.tracking.distance_threshold_m);
    println!("Speed limit: {} km/h", settings.tracking.speed_limit_kmh);
    println!();
    println!("Press Ctrl+C to stop early");
    println!();

    session.start(settings.tracking.interval_ms).await?;

    let mut interrupted = false;
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                interrupted = true;
                break;
            }
            event = events.recv() => match event {
                Ok(SessionEvent::Synced(fix)) => {
                    println!(
                        "synced   {}  (+{:.1} m)",
                        fix.coordinate, fix.distance_from_previous_m
                    );
                }
                Ok(SessionEvent::Infraction { message, .. }) => println!("{}", message),
                Ok(SessionEvent::PersistenceFailed { coordinate, error }) => {
                    println!("failed to store {}: {}", coordinate, error);
                }
                // The first failed read after the last point means the
                // tick that evaluated it has fully finished.
                Ok(SessionEvent::TickSkipped(SkipReason::PositionUnavailable(_)))
                    if source.is_exhausted() =>
                {
                    break
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => warn!(missed, "Event receiver lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    }

    session.stop();
    drain(&session).await;
    info!(interrupted, "Replay finished");

    Ok(ReplaySummary {
        points: source.total(),
        out,
        stats: session.stats(),
        infractions: session.infraction_messages(),
        interrupted,
    })
}

/// Configuration with command-line overrides applied.
fn effective_config(args: &ReplayArgs, config: &ConfigFile) -> Result<ConfigFile, CliError> {
    let mut settings = config.clone();
    if let Some(interval) = args.interval_ms {
        if interval == 0 {
            return Err(CliError::Config("--interval-ms must be greater than zero".to_string()));
        }
        settings.tracking.interval_ms = interval;
    }
    if let Some(meters) = args.distance_threshold {
        settings.tracking.distance_threshold_m = non_negative("--distance-threshold", meters)?;
    }
    if let Some(kmh) = args.speed_limit {
        settings.tracking.speed_limit_kmh = non_negative("--speed-limit", kmh)?;
    }
    Ok(settings)
}

fn non_negative(flag: &str, value: f64) -> Result<f64, CliError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CliError::Config(format!(
            "{} must be a non-negative number, got {}",
            flag, value
        )))
    }
}

/// Wait for spawned store writes to settle.
async fn drain(session: &TrackingSession) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    while session.stats().persistence_pending() > 0 {
        if tokio::time::Instant::now() >= deadline {
            warn!(
                pending = session.stats().persistence_pending(),
                "Records still pending after stop"
            );
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

fn print_summary(summary: &ReplaySummary) {
    let stats = &summary.stats;

    println!();
    if summary.interrupted {
        println!("Replay interrupted");
    } else {
        println!("Replay complete");
    }
    println!("  Points in track:   {}", summary.points);
    println!("  Ticks:             {}", stats.ticks);
    println!("  Fixes evaluated:   {}", stats.fixes_evaluated);
    println!("  Records synced:    {}", stats.records_synced);
    println!("  Records stored:    {}", stats.records_persisted);
    if stats.persistence_failures > 0 {
        println!("  Store failures:    {}", stats.persistence_failures);
    }
    println!("  Infractions:       {}", stats.infractions);
    println!("  Output:            {}", summary.out.display());

    if !summary.infractions.is_empty() {
        println!();
        for message in &summary.infractions {
            println!("  {}", message);
        }
    }
}
