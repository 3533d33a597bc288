//! Geodetic bounding boxes.
//!
//! A [`Sector`] spans `[min_lat, max_lat] x [min_lon, max_lon]`. When
//! `min_lon > max_lon` the sector crosses the antimeridian: it runs east from
//! `min_lon` to +180 and continues from -180 to `max_lon`.

use std::fmt;

use serde::Serialize;

use super::types::{validate_latitude, validate_longitude, LatLon};
use super::{normalize_longitude, LON_SPAN, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use crate::error::{GridError, GridResult};

/// Axis-aligned geodetic bounding box in degrees. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sector {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl Sector {
    /// Creates a validated sector.
    ///
    /// Latitudes must lie in [-90, 90] with `min_lat <= max_lat`. Longitudes
    /// must lie in [-180, 180]; `min_lon > max_lon` denotes a sector that
    /// wraps across the antimeridian.
    pub fn from_degrees(
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    ) -> GridResult<Self> {
        validate_latitude(min_lat)?;
        validate_latitude(max_lat)?;
        validate_longitude(min_lon)?;
        validate_longitude(max_lon)?;
        if min_lat > max_lat {
            return Err(GridError::InvalidSector {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            });
        }
        Ok(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// The whole globe.
    pub const fn full_sphere() -> Self {
        Self {
            min_lat: MIN_LAT,
            max_lat: MAX_LAT,
            min_lon: MIN_LON,
            max_lon: MAX_LON,
        }
    }

    #[inline]
    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    #[inline]
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    #[inline]
    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    #[inline]
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// True when the sector wraps from +180 to -180.
    #[inline]
    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }

    /// Latitude extent in degrees.
    #[inline]
    pub fn lat_delta(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent in degrees, accounting for antimeridian wrap.
    #[inline]
    pub fn lon_delta(&self) -> f64 {
        if self.crosses_antimeridian() {
            self.max_lon + LON_SPAN - self.min_lon
        } else {
            self.max_lon - self.min_lon
        }
    }

    /// True when the sector has no area.
    pub fn is_degenerate(&self) -> bool {
        self.lat_delta() == 0.0 || self.lon_delta() == 0.0
    }

    /// Geographic center of the sector.
    pub fn centroid(&self) -> LatLon {
        let lat = self.min_lat + self.lat_delta() / 2.0;
        let mut lon = self.min_lon + self.lon_delta() / 2.0;
        if lon > MAX_LON {
            lon = normalize_longitude(lon);
        }
        LatLon::new_unchecked(lat, lon)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &LatLon) -> bool {
        let lat = point.lat();
        let lon = point.lon();
        if lat < self.min_lat || lat > self.max_lat {
            return false;
        }
        if self.crosses_antimeridian() {
            lon >= self.min_lon || lon <= self.max_lon
        } else {
            lon >= self.min_lon && lon <= self.max_lon
        }
    }

    /// True when every point of `other` lies inside this sector.
    pub fn contains_sector(&self, other: &Sector) -> bool {
        if other.min_lat < self.min_lat || other.max_lat > self.max_lat {
            return false;
        }
        other.lon_spans().all(|(lo, hi)| {
            self.lon_spans()
                .any(|(s_lo, s_hi)| lo >= s_lo && hi <= s_hi)
        })
    }

    /// Overlap test that counts shared edges as intersecting.
    pub fn intersects(&self, other: &Sector) -> bool {
        if self.min_lat > other.max_lat || other.min_lat > self.max_lat {
            return false;
        }
        self.lon_spans().any(|(a_lo, a_hi)| {
            other
                .lon_spans()
                .any(|(b_lo, b_hi)| a_lo <= b_hi && b_lo <= a_hi)
        })
    }

    /// Overlap test that requires a shared interior; touching edges do not count.
    pub fn intersects_interior(&self, other: &Sector) -> bool {
        if self.min_lat >= other.max_lat || other.min_lat >= self.max_lat {
            return false;
        }
        self.lon_spans().any(|(a_lo, a_hi)| {
            other
                .lon_spans()
                .any(|(b_lo, b_hi)| a_lo < b_hi && b_lo < a_hi)
        })
    }

    /// The overlapping region of two sectors, if any.
    ///
    /// When the overlap consists of two longitude pieces the result is the
    /// smallest sector that runs through the antimeridian and holds both.
    pub fn intersection(&self, other: &Sector) -> Option<Sector> {
        let min_lat = self.min_lat.max(other.min_lat);
        let max_lat = self.max_lat.min(other.max_lat);
        if min_lat > max_lat {
            return None;
        }

        let mut pieces: Vec<(f64, f64)> = Vec::with_capacity(2);
        for (a_lo, a_hi) in self.lon_spans() {
            for (b_lo, b_hi) in other.lon_spans() {
                let lo = a_lo.max(b_lo);
                let hi = a_hi.min(b_hi);
                if lo <= hi {
                    pieces.push((lo, hi));
                }
            }
        }
        pieces.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (min_lon, max_lon) = match pieces.as_slice() {
            [] => return None,
            [(lo, hi)] => (*lo, *hi),
            // Several pieces only arise from a wrapping input; rejoin them across the seam.
            [western @ .., (east_lo, _)] => {
                let west_hi = western.iter().map(|(_, hi)| *hi).fold(MIN_LON, f64::max);
                (*east_lo, west_hi)
            }
        };

        Some(Sector {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// Smallest sector holding both inputs.
    ///
    /// If either input wraps the antimeridian the result spans all longitudes.
    pub fn union(&self, other: &Sector) -> Sector {
        let (min_lon, max_lon) = if self.crosses_antimeridian() || other.crosses_antimeridian()
        {
            (MIN_LON, MAX_LON)
        } else {
            (
                self.min_lon.min(other.min_lon),
                self.max_lon.max(other.max_lon),
            )
        };
        Sector {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon,
            max_lon,
        }
    }

    /// Splits a wrapping sector into its eastern and western pieces.
    ///
    /// Non-wrapping sectors return themselves and `None`.
    pub fn split_at_antimeridian(&self) -> (Sector, Option<Sector>) {
        if !self.crosses_antimeridian() {
            return (*self, None);
        }
        let east = Sector {
            max_lon: MAX_LON,
            ..*self
        };
        let west = Sector {
            min_lon: MIN_LON,
            ..*self
        };
        (east, Some(west))
    }

    /// Longitude ranges covered by this sector, never wrapping.
    pub(crate) fn lon_spans(&self) -> impl Iterator<Item = (f64, f64)> {
        let spans = if self.crosses_antimeridian() {
            [
                Some((self.min_lon, MAX_LON)),
                Some((MIN_LON, self.max_lon)),
            ]
        } else {
            [Some((self.min_lon, self.max_lon)), None]
        };
        spans.into_iter().flatten()
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}°, {}°] x [{}°, {}°]",
            self.min_lat, self.max_lat, self.min_lon, self.max_lon
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Sector {
        Sector::from_degrees(min_lat, max_lat, min_lon, max_lon).unwrap()
    }

    fn point(lat: f64, lon: f64) -> LatLon {
        LatLon::new(lat, lon).unwrap()
    }

    #[test]
    fn test_rejects_inverted_latitude() {
        let result = Sector::from_degrees(10.0, -10.0, 0.0, 1.0);
        assert!(matches!(result, Err(GridError::InvalidSector { .. })));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            Sector::from_degrees(-91.0, 0.0, 0.0, 1.0),
            Err(GridError::InvalidLatitude(_))
        ));
        assert!(matches!(
            Sector::from_degrees(0.0, 1.0, 0.0, 181.0),
            Err(GridError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_deltas() {
        let s = sector(-10.0, 10.0, -20.0, 20.0);
        assert_eq!(s.lat_delta(), 20.0);
        assert_eq!(s.lon_delta(), 40.0);
    }

    #[test]
    fn test_antimeridian_delta_adds_full_turn() {
        let s = sector(0.0, 5.0, 170.0, -170.0);
        assert!(s.crosses_antimeridian());
        assert_eq!(s.lon_delta(), 20.0);
    }

    #[test]
    fn test_degenerate_sector() {
        let s = sector(10.0, 10.0, 0.0, 5.0);
        assert!(s.is_degenerate());
        assert!(!Sector::full_sphere().is_degenerate());
    }

    #[test]
    fn test_contains_inclusive() {
        let s = sector(-10.0, 10.0, -10.0, 10.0);
        assert!(s.contains(&point(0.0, 0.0)));
        assert!(s.contains(&point(10.0, 10.0)));
        assert!(!s.contains(&point(10.1, 0.0)));
    }

    #[test]
    fn test_contains_across_antimeridian() {
        let s = sector(-5.0, 5.0, 175.0, -175.0);
        assert!(s.contains(&point(0.0, 179.0)));
        assert!(s.contains(&point(0.0, -179.0)));
        assert!(!s.contains(&point(0.0, 0.0)));
    }

    #[test]
    fn test_intersects_edge_touching() {
        let a = sector(0.0, 10.0, 0.0, 10.0);
        let b = sector(10.0, 20.0, 0.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects_interior(&b));
    }

    #[test]
    fn test_intersects_interior_overlap() {
        let a = sector(0.0, 10.0, 0.0, 10.0);
        let b = sector(5.0, 15.0, 5.0, 15.0);
        assert!(a.intersects_interior(&b));
    }

    #[test]
    fn test_disjoint() {
        let a = sector(0.0, 10.0, 0.0, 10.0);
        let b = sector(20.0, 30.0, 0.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_intersects_across_antimeridian() {
        let wrap = sector(-5.0, 5.0, 170.0, -170.0);
        let east = sector(-1.0, 1.0, -175.0, -160.0);
        let far = sector(-1.0, 1.0, 0.0, 10.0);
        assert!(wrap.intersects(&east));
        assert!(!wrap.intersects(&far));
    }

    #[test]
    fn test_intersection_simple() {
        let a = sector(0.0, 10.0, 0.0, 10.0);
        let b = sector(5.0, 15.0, 5.0, 15.0);
        assert_eq!(a.intersection(&b), Some(sector(5.0, 10.0, 5.0, 10.0)));
    }

    #[test]
    fn test_intersection_of_wrapping_sectors() {
        let a = sector(0.0, 10.0, 170.0, -170.0);
        let b = sector(0.0, 10.0, 175.0, -175.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.min_lon(), 175.0);
        assert_eq!(i.max_lon(), -175.0);
        assert!(i.crosses_antimeridian());
    }

    #[test]
    fn test_intersection_of_three_pieces_keeps_all() {
        let a = sector(0.0, 10.0, 10.0, 0.0);
        let b = sector(0.0, 10.0, -5.0, -10.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!((i.min_lon(), i.max_lon()), (10.0, 0.0));
        assert!(i.contains(&point(5.0, -2.0)));
    }

    #[test]
    fn test_intersection_with_full_sphere_keeps_wrap() {
        let wrap = sector(0.0, 10.0, 170.0, -170.0);
        let i = Sector::full_sphere().intersection(&wrap).unwrap();
        assert_eq!(i, wrap);
    }

    #[test]
    fn test_union() {
        let a = sector(0.0, 10.0, 0.0, 10.0);
        let b = sector(-5.0, 5.0, 20.0, 30.0);
        assert_eq!(a.union(&b), sector(-5.0, 10.0, 0.0, 30.0));
    }

    #[test]
    fn test_contains_sector() {
        let outer = sector(-10.0, 10.0, -10.0, 10.0);
        assert!(outer.contains_sector(&sector(-1.0, 1.0, -1.0, 1.0)));
        assert!(!outer.contains_sector(&sector(-1.0, 11.0, -1.0, 1.0)));
        assert!(Sector::full_sphere().contains_sector(&sector(0.0, 1.0, 179.0, -179.0)));
    }

    #[test]
    fn test_centroid_wraps() {
        let s = sector(0.0, 10.0, 170.0, -150.0);
        let c = s.centroid();
        assert_eq!(c.lat(), 5.0);
        assert_eq!(c.lon(), -170.0);
    }

    #[test]
    fn test_split_at_antimeridian() {
        let s = sector(0.0, 1.0, 170.0, -170.0);
        let (east, west) = s.split_at_antimeridian();
        assert_eq!(east, sector(0.0, 1.0, 170.0, 180.0));
        assert_eq!(west, Some(sector(0.0, 1.0, -180.0, -170.0)));

        let plain = sector(0.0, 1.0, 0.0, 1.0);
        assert_eq!(plain.split_at_antimeridian(), (plain, None));
    }
}
