//! Error types for the tile grid.
//!
//! Every fallible operation in this crate returns [`GridResult`]. Errors are
//! split into two classes: invalid arguments (malformed geodetic input,
//! non-positive sizes, bad configuration) and out-of-range lookups (level or
//! grid indices outside the valid bounds). Nothing is retried internally.

use thiserror::Error;

use crate::geo::Sector;

/// Result type for tile grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors produced by the tile addressing core.
#[derive(Debug, Error)]
pub enum GridError {
    /// Latitude outside [-90, 90] or not finite.
    #[error("invalid latitude: {0} (must be within [-90, 90])")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not finite.
    #[error("invalid longitude: {0} (must be within [-180, 180])")]
    InvalidLongitude(f64),

    /// Angular delta that is zero, negative or not finite.
    #[error("invalid tile delta: {0} (must be positive)")]
    InvalidDelta(f64),

    /// Tile pixel dimensions with a zero side.
    #[error("invalid tile dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Requested resolution that is zero, negative or not finite.
    #[error("invalid resolution: {0} degrees/texel")]
    InvalidResolution(f64),

    /// Sector bounds that are inverted in latitude or outside the globe.
    #[error("invalid sector: lat [{min_lat}, {max_lat}], lon [{min_lon}, {max_lon}]")]
    InvalidSector {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },

    /// A query sector that does not touch the dataset coverage.
    #[error("sector {0} lies outside the dataset coverage")]
    OutsideCoverage(Sector),

    /// A level set was built without any level.
    #[error("level set has no levels")]
    EmptyLevelSet,

    /// Levels are not ordered coarsest to finest.
    #[error("level {level} is out of sequence: {reason}")]
    InvalidLevelSequence { level: u32, reason: String },

    /// Dataset configuration problem.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Level index outside `[0, count)`.
    #[error("level index {index} out of range (level count: {count})")]
    LevelOutOfRange { index: usize, count: usize },

    /// Row index outside the rows of a level.
    #[error("row {row} out of range for level {level} ({rows} rows)")]
    RowOutOfRange { level: u32, row: u32, rows: u32 },

    /// Column index outside the columns of a level.
    #[error("column {column} out of range for level {level} ({columns} columns)")]
    ColumnOutOfRange {
        level: u32,
        column: u32,
        columns: u32,
    },
}

impl GridError {
    /// Returns true for malformed input, absent data or bad configuration.
    pub fn is_invalid_argument(&self) -> bool {
        !self.is_out_of_range()
    }

    /// Returns true for lookups outside the valid index bounds.
    ///
    /// Callers enumerating tiles skip the offending tile or level on these
    /// rather than aborting the whole frame.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            GridError::LevelOutOfRange { .. }
                | GridError::RowOutOfRange { .. }
                | GridError::ColumnOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_value() {
        let err = GridError::InvalidLatitude(91.5);
        assert!(err.to_string().contains("91.5"));
    }

    #[test]
    fn test_classification() {
        let oob = GridError::LevelOutOfRange { index: 7, count: 5 };
        assert!(oob.is_out_of_range());
        assert!(!oob.is_invalid_argument());

        let bad = GridError::InvalidDelta(0.0);
        assert!(bad.is_invalid_argument());
        assert!(!bad.is_out_of_range());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: GridError = io.into();
        assert!(matches!(err, GridError::Io(_)));
        assert!(err.is_invalid_argument());
    }
}
