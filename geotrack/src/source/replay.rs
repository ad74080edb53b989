//! Replays a recorded track as live fixes.
//!
//! # Track format
//!
//! One point per line, `latitude,longitude[,speed_mps]`. Blank lines and
//! lines starting with `#` are ignored:
//!
//! ```text
//! # lat, lon, speed (m/s)
//! -25.6953,-54.4367,8.5
//! -25.6961,-54.4389
//! ```

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use crate::collaborators::{BoxFuture, PositionSource};
use crate::error::PositionError;
use crate::geo::Coordinate;
use crate::sample::Fix;

/// Errors loading a track.
#[derive(Debug, Error)]
pub enum TrackParseError {
    #[error("Failed to read track: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
}

/// One recorded point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub coordinate: Coordinate,
    pub speed_mps: Option<f64>,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64, speed_mps: Option<f64>) -> Self {
        Self {
            coordinate: Coordinate::new(latitude, longitude),
            speed_mps,
        }
    }
}

/// Position source that hands out recorded points in order, one per read.
///
/// Each fix is stamped at the moment it is read, so it is never stale.
/// Once every point has been read, reads fail with
/// [`PositionError::Exhausted`].
#[derive(Debug)]
pub struct ReplayPositionSource {
    points: Mutex<VecDeque<TrackPoint>>,
    total: usize,
}

impl ReplayPositionSource {
    pub fn new(points: impl IntoIterator<Item = TrackPoint>) -> Self {
        let points: VecDeque<_> = points.into_iter().collect();
        let total = points.len();
        Self {
            points: Mutex::new(points),
            total,
        }
    }

    /// Parse a track from text.
    pub fn parse(text: &str) -> Result<Self, TrackParseError> {
        let mut points = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            points.push(parse_point(line).map_err(|reason| TrackParseError::InvalidLine {
                line: index + 1,
                reason,
            })?);
        }

        Ok(Self::new(points))
    }

    /// Load and parse a track file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TrackParseError> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text)
    }

    /// Points not yet read.
    pub fn remaining(&self) -> usize {
        self.points.lock().len()
    }

    /// Number of points in the track.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

fn parse_point(line: &str) -> Result<TrackPoint, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(format!("expected 2 or 3 fields, found {}", fields.len()));
    }

    let number = |name: &str, value: &str| {
        value
            .parse::<f64>()
            .map_err(|_| format!("invalid {} '{}'", name, value))
    };

    let latitude = number("latitude", fields[0])?;
    let longitude = number("longitude", fields[1])?;
    let speed_mps = match fields.get(2) {
        Some(value) if !value.is_empty() => Some(number("speed", value)?),
        _ => None,
    };

    let point = TrackPoint::new(latitude, longitude, speed_mps);
    if !point.coordinate.is_valid() {
        return Err(format!("coordinate out of range ({})", point.coordinate));
    }
    Ok(point)
}

impl PositionSource for ReplayPositionSource {
    fn current_fix(
        &self,
        _timeout: Duration,
        _max_age: Duration,
    ) -> BoxFuture<'_, Result<Fix, PositionError>> {
        let next = self.points.lock().pop_front();
        Box::pin(async move {
            next.map(|p| Fix::new(p.coordinate, p.speed_mps))
                .ok_or(PositionError::Exhausted)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn test_parse_track() {
        let source = ReplayPositionSource::parse(
            "# header\n-25.6953,-54.4367,8.5\n\n -25.6961 , -54.4389 \n",
        )
        .unwrap();

        assert_eq!(source.total(), 2);
        assert_eq!(source.remaining(), 2);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = ReplayPositionSource::parse("1.0,2.0\nnorth,2.0\n").unwrap_err();
        match err {
            TrackParseError::InvalidLine { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("latitude"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(ReplayPositionSource::parse("91.0,0.0").is_err());
        assert!(ReplayPositionSource::parse("0.0,181.0").is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert!(ReplayPositionSource::parse("1.0").is_err());
        assert!(ReplayPositionSource::parse("1.0,2.0,3.0,4.0").is_err());
    }

    #[tokio::test]
    async fn test_replays_in_order_then_exhausts() {
        let source = ReplayPositionSource::new([
            TrackPoint::new(1.0, 1.0, Some(2.0)),
            TrackPoint::new(2.0, 2.0, None),
        ]);

        let first = source.current_fix(TIMEOUT, TIMEOUT).await.unwrap();
        assert_eq!(first.coordinate(), Coordinate::new(1.0, 1.0));
        assert_eq!(first.speed_mps(), Some(2.0));

        let second = source.current_fix(TIMEOUT, TIMEOUT).await.unwrap();
        assert_eq!(second.coordinate(), Coordinate::new(2.0, 2.0));
        assert_eq!(second.speed_mps(), None);

        assert_eq!(
            source.current_fix(TIMEOUT, TIMEOUT).await,
            Err(PositionError::Exhausted)
        );
        assert!(source.is_exhausted());
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.csv");
        std::fs::write(&path, "0.0,0.0,1.0\n0.0,0.0027,12.0\n").unwrap();

        let source = ReplayPositionSource::from_file(&path).await.unwrap();
        assert_eq!(source.total(), 2);
    }
}
