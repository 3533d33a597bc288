//! Geodetic point type.

use std::fmt;

use serde::Serialize;

use crate::error::{GridError, GridResult};

/// Southern latitude bound in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Northern latitude bound in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Western longitude bound in degrees.
pub const MIN_LON: f64 = -180.0;
/// Eastern longitude bound in degrees.
pub const MAX_LON: f64 = 180.0;

/// A geodetic position in degrees.
///
/// Construction through [`LatLon::new`] guarantees the latitude lies in
/// [-90, 90] and the longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    lat: f64,
    lon: f64,
}

impl LatLon {
    /// South-west corner of the globe, the usual tile grid origin.
    pub const SOUTH_WEST: LatLon = LatLon {
        lat: MIN_LAT,
        lon: MIN_LON,
    };

    /// Creates a validated position.
    pub fn new(lat: f64, lon: f64) -> GridResult<Self> {
        Ok(Self {
            lat: validate_latitude(lat)?,
            lon: validate_longitude(lon)?,
        })
    }

    /// Builds a position from components already known to be in range.
    #[inline]
    pub(crate) const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Returns `(lat, lon)` in radians.
    pub fn to_radians(&self) -> (f64, f64) {
        (self.lat.to_radians(), self.lon.to_radians())
    }

    /// Great-circle distance to `other` in degrees of arc (haversine).
    pub fn angular_distance(&self, other: &LatLon) -> f64 {
        let (lat1, lon1) = self.to_radians();
        let (lat2, lon2) = other.to_radians();
        let half_dlat = (lat2 - lat1) / 2.0;
        let half_dlon = (lon2 - lon1) / 2.0;
        let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
        (2.0 * a.sqrt().min(1.0).asin()).to_degrees()
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}°, {:.6}°)", self.lat, self.lon)
    }
}

/// Rejects latitudes outside [-90, 90] and non-finite values.
#[inline]
pub(crate) fn validate_latitude(lat: f64) -> GridResult<f64> {
    if (MIN_LAT..=MAX_LAT).contains(&lat) {
        Ok(lat)
    } else {
        Err(GridError::InvalidLatitude(lat))
    }
}

/// Rejects longitudes outside [-180, 180] and non-finite values.
#[inline]
pub(crate) fn validate_longitude(lon: f64) -> GridResult<f64> {
    if (MIN_LON..=MAX_LON).contains(&lon) {
        Ok(lon)
    } else {
        Err(GridError::InvalidLongitude(lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let p = LatLon::new(53.55, 9.99).unwrap();
        assert_eq!(p.lat(), 53.55);
        assert_eq!(p.lon(), 9.99);
    }

    #[test]
    fn test_new_accepts_bounds() {
        assert!(LatLon::new(90.0, 180.0).is_ok());
        assert!(LatLon::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_new_rejects_latitude() {
        assert!(matches!(
            LatLon::new(90.01, 0.0),
            Err(GridError::InvalidLatitude(_))
        ));
        assert!(matches!(
            LatLon::new(f64::NAN, 0.0),
            Err(GridError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_new_rejects_longitude() {
        assert!(matches!(
            LatLon::new(0.0, -180.5),
            Err(GridError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_angular_distance() {
        let a = LatLon::new(0.0, 0.0).unwrap();
        let b = LatLon::new(0.0, 90.0).unwrap();
        assert!((a.angular_distance(&b) - 90.0).abs() < 1e-9);
        assert_eq!(a.angular_distance(&a), 0.0);

        // Across the antimeridian the short way round.
        let east = LatLon::new(0.0, 179.0).unwrap();
        let west = LatLon::new(0.0, -179.0).unwrap();
        assert!((east.angular_distance(&west) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_south_west_constant() {
        assert_eq!(LatLon::SOUTH_WEST.lat(), -90.0);
        assert_eq!(LatLon::SOUTH_WEST.lon(), -180.0);
    }
}
