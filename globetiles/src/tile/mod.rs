//! Tiles: single addressable cells of the grid.
//!
//! A [`Tile`] names one cell of one level by row and column, carries the
//! cell's sector, and derives its [`TileKey`] and cache-relative path. Tiles
//! are cheap value descriptors recreated for every query; the imagery or
//! elevation behind them lives in an external cache keyed by `TileKey`.

mod key;
mod queue;

pub use key::TileKey;
pub use queue::TileQueue;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

use crate::error::{GridError, GridResult};
use crate::geo::{LatLon, Sector, LON_SPAN, MAX_LAT, MAX_LON};
use crate::grid::{self, compute_column_longitude, compute_row_latitude};
use crate::level::{format_resource_path, Level};

/// Priority of a tile nobody has scheduled yet.
pub const UNSCHEDULED_PRIORITY: f64 = f64::MAX;

/// One grid cell at one level.
///
/// Identity is the `(level, row, column)` triple: equality, hashing and
/// ordering all go through the [`TileKey`]. Ordering puts coarser levels
/// first and is row-major within a level.
///
/// The scheduling priority is a mutable hint outside identity. Lower values
/// are fetched first; see [`Tile::set_priority_distance`].
#[derive(Debug)]
pub struct Tile {
    sector: Sector,
    level: Arc<Level>,
    row: u32,
    column: u32,
    key: TileKey,
    path: OnceLock<String>,
    /// `f64` bits; relaxed access is enough since a stale value only skews fetch order.
    priority: AtomicU64,
}

impl Tile {
    /// Creates a tile from known grid coordinates and their sector.
    ///
    /// The sector's south-west corner must sit on the corner of the cell at
    /// `row`/`column`.
    ///
    /// # Errors
    ///
    /// * [`GridError::RowOutOfRange`] or [`GridError::ColumnOutOfRange`] when
    ///   the cell lies outside the level's grid
    /// * [`GridError::InvalidSector`] when the sector does not start at the cell
    pub fn new(sector: Sector, level: Arc<Level>, row: u32, column: u32) -> GridResult<Self> {
        level.check_cell(row, column)?;
        check_cell_corner(&sector, &level, row, column)?;
        let key = TileKey::new(level.number(), row, column);
        Ok(Self {
            sector,
            level,
            row,
            column,
            key,
            path: OnceLock::new(),
            priority: AtomicU64::new(UNSCHEDULED_PRIORITY.to_bits()),
        })
    }

    /// Creates the tile whose south-west corner is the corner of `sector`.
    ///
    /// Row and column are derived from the level's grid origin; a corner off
    /// the grid lines is rejected with [`GridError::InvalidSector`].
    pub fn from_sector(sector: Sector, level: Arc<Level>) -> GridResult<Self> {
        let origin = level.tile_origin();
        let row = grid::compute_row(level.lat_delta(), sector.min_lat(), origin.lat())?;
        let column = grid::compute_column(level.lon_delta(), sector.min_lon(), origin.lon())?;
        Self::new(sector, level, row, column)
    }

    /// Creates the tile at `row`/`column`, computing its sector.
    pub fn from_grid(level: Arc<Level>, row: u32, column: u32) -> GridResult<Self> {
        let sector = cell_sector(&level, row, column)?;
        Self::new(sector, level, row, column)
    }

    /// Overrides the cache namespace used for the key and path.
    pub fn with_cache_name(mut self, cache_name: impl Into<String>) -> Self {
        self.key = self.key.with_cache_name(cache_name);
        self.path = OnceLock::new();
        self
    }

    #[inline]
    pub fn sector(&self) -> &Sector {
        &self.sector
    }

    #[inline]
    pub fn level(&self) -> &Arc<Level> {
        &self.level
    }

    #[inline]
    pub fn level_number(&self) -> u32 {
        self.key.level_number()
    }

    #[inline]
    pub fn row(&self) -> u32 {
        self.row
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    pub fn key(&self) -> &TileKey {
        &self.key
    }

    /// Cache namespace: the override if one was set, else the level's.
    pub fn cache_name(&self) -> &str {
        self.key
            .cache_name()
            .unwrap_or_else(|| self.level.cache_name())
    }

    /// Cache-relative path, `{cache_name}/{level}/{row}/{row}_{column}{suffix}`.
    ///
    /// Computed on first use and reused afterwards.
    pub fn path(&self) -> &str {
        self.path.get_or_init(|| {
            format_resource_path(
                self.cache_name(),
                self.level.number(),
                self.row,
                self.column,
                self.level.format_suffix(),
            )
        })
    }

    /// Dense index of this tile within its level.
    pub fn tile_number(&self) -> u64 {
        self.level.tile_number(self.row, self.column)
    }

    pub fn centroid(&self) -> LatLon {
        self.sector.centroid()
    }

    /// Current scheduling priority; lower is fetched sooner.
    pub fn priority(&self) -> f64 {
        f64::from_bits(self.priority.load(AtomicOrdering::Relaxed))
    }

    pub fn set_priority(&self, priority: f64) {
        self.priority
            .store(priority.to_bits(), AtomicOrdering::Relaxed);
    }

    /// Sets the priority from the tile's distance to the viewpoint.
    ///
    /// The distance is stored as-is, so nearer tiles sort first. NaN is
    /// treated as unscheduled and negative distances as zero.
    pub fn set_priority_distance(&self, distance: f64) {
        let priority = if distance.is_nan() {
            UNSCHEDULED_PRIORITY
        } else {
            distance.max(0.0)
        };
        self.set_priority(priority);
    }

    /// Splits this tile into its children on `next_level`.
    ///
    /// Children come back in row-major order. Cells past the edge of the
    /// finer grid are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidLevelSequence`] if `next_level` is not
    /// finer by an integer factor in both directions or uses another origin.
    pub fn subdivide(&self, next_level: &Arc<Level>) -> GridResult<Vec<Tile>> {
        let lat_factor = child_factor(&self.level, next_level, |l| l.lat_delta())?;
        let lon_factor = child_factor(&self.level, next_level, |l| l.lon_delta())?;
        if next_level.tile_origin() != self.level.tile_origin() {
            return Err(GridError::InvalidLevelSequence {
                level: next_level.number(),
                reason: "tile origin differs from the parent level".to_string(),
            });
        }

        let mut children = Vec::with_capacity((lat_factor * lon_factor) as usize);
        for i in 0..lat_factor {
            let row = self.row * lat_factor + i;
            if row >= next_level.num_rows() {
                continue;
            }
            for j in 0..lon_factor {
                let column = self.column * lon_factor + j;
                if column >= next_level.num_columns() {
                    continue;
                }
                let mut child = Tile::from_grid(Arc::clone(next_level), row, column)?;
                if let Some(name) = self.key.cache_name() {
                    child = child.with_cache_name(name);
                }
                children.push(child);
            }
        }
        Ok(children)
    }
}

impl Clone for Tile {
    fn clone(&self) -> Self {
        Self {
            sector: self.sector,
            level: Arc::clone(&self.level),
            row: self.row,
            column: self.column,
            key: self.key.clone(),
            path: self.path.clone(),
            priority: AtomicU64::new(self.priority.load(AtomicOrdering::Relaxed)),
        }
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Tile {}

impl Hash for Tile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Tile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.sector)
    }
}

/// Sector covered by `row`/`column` of `level`.
///
/// Cells are clipped at the north pole and at the grid's longitude seam.
/// A cell that straddles the antimeridian yields a wrapping sector.
fn cell_sector(level: &Level, row: u32, column: u32) -> GridResult<Sector> {
    level.check_cell(row, column)?;
    let origin = level.tile_origin();

    let min_lat = compute_row_latitude(row, level.lat_delta(), origin.lat());
    let max_lat = (min_lat + level.lat_delta()).min(MAX_LAT);

    let mut min_lon = compute_column_longitude(column, level.lon_delta(), origin.lon());
    let mut max_lon = (min_lon + level.lon_delta()).min(origin.lon() + LON_SPAN);
    if min_lon >= MAX_LON {
        min_lon -= LON_SPAN;
        max_lon -= LON_SPAN;
    } else if max_lon > MAX_LON {
        max_lon -= LON_SPAN;
    }

    Sector::from_degrees(min_lat, max_lat, min_lon, max_lon)
}

/// Rejects a sector whose south-west corner is not the corner of the cell.
fn check_cell_corner(sector: &Sector, level: &Level, row: u32, column: u32) -> GridResult<()> {
    let origin = level.tile_origin();
    let min_lat = compute_row_latitude(row, level.lat_delta(), origin.lat());
    let min_lon = compute_column_longitude(column, level.lon_delta(), origin.lon());
    if grid::same_grid_line(sector.min_lat(), min_lat)
        && grid::same_grid_line(sector.min_lon(), min_lon)
    {
        return Ok(());
    }
    Err(GridError::InvalidSector {
        min_lat: sector.min_lat(),
        max_lat: sector.max_lat(),
        min_lon: sector.min_lon(),
        max_lon: sector.max_lon(),
    })
}

fn child_factor(parent: &Level, child: &Level, delta: impl Fn(&Level) -> f64) -> GridResult<u32> {
    grid::subdivision_factor(delta(parent), delta(child)).ok_or_else(|| {
        GridError::InvalidLevelSequence {
            level: child.number(),
            reason: format!(
                "delta {} does not evenly subdivide {}",
                delta(child),
                delta(parent)
            ),
        }
    })
}
