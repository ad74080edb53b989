//! Distance command - haversine distance between two points.

use geotrack::geo::{self, Coordinate};

use crate::error::CliError;

pub fn run(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<(), CliError> {
    let meters = measure(lat1, lon1, lat2, lon2)?;
    println!("{:.2} m", meters);
    Ok(())
}

fn measure(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64, CliError> {
    let a = checked(lat1, lon1)?;
    let b = checked(lat2, lon2)?;
    Ok(geo::distance(a, b))
}

fn checked(latitude: f64, longitude: f64) -> Result<Coordinate, CliError> {
    let coordinate = Coordinate::new(latitude, longitude);
    if coordinate.is_valid() {
        Ok(coordinate)
    } else {
        Err(CliError::InvalidCoordinate(latitude, longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_of_longitude_on_equator() {
        let meters = measure(0.0, 0.0, 0.0, 1.0).unwrap();
        assert!((meters - 111_194.93).abs() < 0.1, "got {}", meters);
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let result = measure(91.0, 0.0, 0.0, 0.0);
        assert!(matches!(result, Err(CliError::InvalidCoordinate(lat, _)) if lat == 91.0));
    }
}
