//! Geodetic primitives.
//!
//! Provides validated latitude/longitude points and axis-aligned geodetic
//! bounding boxes. All values are in degrees.

mod sector;
mod types;

pub use sector::Sector;
pub use types::{LatLon, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Full latitude span of the globe in degrees.
pub const LAT_SPAN: f64 = MAX_LAT - MIN_LAT;

/// Full longitude span of the globe in degrees.
pub const LON_SPAN: f64 = MAX_LON - MIN_LON;

/// Normalizes a longitude into [-180, 180).
///
/// Longitudes of exactly 180 are folded onto -180.
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    if (MIN_LON..MAX_LON).contains(&lon) {
        return lon;
    }
    let wrapped = (lon - MIN_LON).rem_euclid(LON_SPAN) + MIN_LON;
    if wrapped >= MAX_LON {
        MIN_LON
    } else {
        wrapped
    }
}
