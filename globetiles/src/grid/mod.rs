//! Row/column grid math.
//!
//! Converts between geodetic coordinates and the integer row/column indices of
//! a regular lat/lon tile grid. Rows count northward and columns count eastward
//! from a fixed grid origin, normally the south-west corner of the globe.
//!
//! # Example
//!
//! ```
//! use globetiles::grid::{compute_column, compute_row, compute_row_latitude};
//!
//! // 10° rows from the south pole: 90°N falls in the last row, not past it.
//! assert_eq!(compute_row(10.0, 90.0, -90.0).unwrap(), 17);
//!
//! // Columns wrap contiguously across the antimeridian.
//! assert_eq!(compute_column(1.0, 179.5, -180.0).unwrap(), 359);
//! assert_eq!(compute_column(1.0, -179.9, -180.0).unwrap(), 0);
//!
//! assert_eq!(compute_row_latitude(3, 10.0, -90.0), -60.0);
//! ```

use crate::error::{GridError, GridResult};
use crate::geo::{LAT_SPAN, LON_SPAN, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Relative tolerance used to snap a quotient onto a cell boundary.
///
/// `origin + row * delta` does not always divide back to exactly `row` in
/// floating point; quotients this close to an integer are treated as lying on
/// that boundary.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Computes the row holding `latitude` in a grid of `delta`-degree rows.
///
/// A latitude exactly on the northern edge of the globe that also lies on a
/// row boundary belongs to the row below it, so 90°N never produces an index
/// one past the last row.
///
/// # Errors
///
/// * [`GridError::InvalidDelta`] if `delta` is not positive and finite
/// * [`GridError::InvalidLatitude`] if `latitude` or `origin` is outside
///   [-90, 90], or `latitude` is south of `origin`
pub fn compute_row(delta: f64, latitude: f64, origin: f64) -> GridResult<u32> {
    validate_delta(delta)?;
    if !(MIN_LAT..=MAX_LAT).contains(&origin) {
        return Err(GridError::InvalidLatitude(origin));
    }
    if !(MIN_LAT..=MAX_LAT).contains(&latitude) || latitude < origin {
        return Err(GridError::InvalidLatitude(latitude));
    }

    let (mut index, on_boundary) = cell_index(latitude - origin, delta);
    if latitude == MAX_LAT && on_boundary && index > 0.0 {
        index -= 1.0;
    }
    to_index(index, delta)
}

/// Computes the column holding `longitude` in a grid of `delta`-degree columns.
///
/// The offset from `origin` is folded into [0, 360] first, so columns run
/// contiguously across the antimeridian. An offset of exactly 360° that lies
/// on a column boundary maps to the last column.
///
/// # Errors
///
/// * [`GridError::InvalidDelta`] if `delta` is not positive and finite
/// * [`GridError::InvalidLongitude`] if `longitude` or `origin` is outside
///   [-180, 180]
pub fn compute_column(delta: f64, longitude: f64, origin: f64) -> GridResult<u32> {
    validate_delta(delta)?;
    if !(MIN_LON..=MAX_LON).contains(&origin) {
        return Err(GridError::InvalidLongitude(origin));
    }
    if !(MIN_LON..=MAX_LON).contains(&longitude) {
        return Err(GridError::InvalidLongitude(longitude));
    }

    let mut offset = longitude - origin;
    if offset < 0.0 {
        offset += LON_SPAN;
    }

    let (mut index, on_boundary) = cell_index(offset, delta);
    if offset == LON_SPAN && on_boundary && index > 0.0 {
        index -= 1.0;
    }
    to_index(index, delta)
}

/// Minimum latitude of `row`. Exact inverse of [`compute_row`].
#[inline]
pub fn compute_row_latitude(row: u32, delta: f64, origin: f64) -> f64 {
    origin + row as f64 * delta
}

/// Minimum longitude of `column`. Exact inverse of [`compute_column`].
///
/// The result is not normalized; grids whose origin is east of -180° produce
/// values past +180° for their easternmost columns.
#[inline]
pub fn compute_column_longitude(column: u32, delta: f64, origin: f64) -> f64 {
    origin + column as f64 * delta
}

/// Number of rows between `origin` and the north pole.
pub fn row_count(delta: f64, origin: f64) -> GridResult<u32> {
    Ok(compute_row(delta, MAX_LAT, origin)? + 1)
}

/// Number of columns needed to wrap the globe once.
pub fn column_count(delta: f64) -> GridResult<u32> {
    validate_delta(delta)?;
    let (index, on_boundary) = cell_index(LON_SPAN, delta);
    let count = if on_boundary { index } else { index + 1.0 };
    to_index(count.max(1.0), delta)
}

/// Number of rows a full-latitude grid of `delta` holds, independent of origin.
pub fn full_row_count(delta: f64) -> GridResult<u32> {
    validate_delta(delta)?;
    let (index, on_boundary) = cell_index(LAT_SPAN, delta);
    let count = if on_boundary { index } else { index + 1.0 };
    to_index(count.max(1.0), delta)
}

/// Integer ratio between a coarser and a finer delta.
///
/// Returns `None` unless `coarser / finer` lies within tolerance of a whole
/// number of at least 1.
pub(crate) fn subdivision_factor(coarser: f64, finer: f64) -> Option<u32> {
    let ratio = coarser / finer;
    let factor = ratio.round();
    if !ratio.is_finite() || factor < 1.0 || factor > u32::MAX as f64 {
        return None;
    }
    ((ratio - factor).abs() <= BOUNDARY_EPSILON * factor).then_some(factor as u32)
}

/// True when two angles name the same grid line, modulo a full turn.
pub(crate) fn same_grid_line(a: f64, b: f64) -> bool {
    let diff = (a - b).rem_euclid(LON_SPAN);
    let tolerance = BOUNDARY_EPSILON * LON_SPAN;
    diff <= tolerance || LON_SPAN - diff <= tolerance
}

fn validate_delta(delta: f64) -> GridResult<()> {
    if delta.is_finite() && delta > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidDelta(delta))
    }
}

/// Floors `offset / delta`, snapping to the nearest integer within tolerance.
///
/// Returns the index and whether the quotient sat on a cell boundary.
#[inline]
fn cell_index(offset: f64, delta: f64) -> (f64, bool) {
    let quotient = offset / delta;
    let nearest = quotient.round();
    if (quotient - nearest).abs() <= BOUNDARY_EPSILON * nearest.abs().max(1.0) {
        (nearest, true)
    } else {
        (quotient.floor(), false)
    }
}

fn to_index(index: f64, delta: f64) -> GridResult<u32> {
    if index < 0.0 || index > u32::MAX as f64 {
        // Only reachable with a delta so small the grid cannot be addressed.
        return Err(GridError::InvalidDelta(delta));
    }
    Ok(index as u32)
}
