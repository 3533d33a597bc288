//! Resolution tiers of the tile pyramid.
//!
//! A [`Level`] describes one tier: tile pixel size, angular size of a tile,
//! cache namespace, and path template. A [`LevelSet`] stacks the tiers of one
//! dataset from coarsest to finest.

mod absent;
mod path;
mod set;

pub use absent::{
    AbsentResourceConfig, AbsentResourceList, DEFAULT_MAX_ENTRIES, DEFAULT_MAX_TRIES,
    DEFAULT_MIN_CHECK_INTERVAL, DEFAULT_TRY_AGAIN_INTERVAL,
};
pub use path::{format_resource_path, normalize_suffix, PathTemplate, DEFAULT_FORMAT_SUFFIX};
pub use set::LevelSet;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{GridError, GridResult};
use crate::geo::LatLon;
use crate::grid;
use crate::tile::Tile;

/// One resolution tier of a tile pyramid.
///
/// Levels are immutable once built apart from the active flag, the expiry
/// time and the absent-resource list, which configuration reloads and
/// fetchers update through shared references.
///
/// Levels compare, order and hash by level number alone.
pub struct Level {
    number: u32,
    tile_width: u32,
    tile_height: u32,
    lat_delta: f64,
    lon_delta: f64,
    tile_origin: LatLon,
    rows: u32,
    columns: u32,
    cache_name: String,
    path_template: PathTemplate,
    empty: bool,
    active: AtomicBool,
    /// Milliseconds since the Unix epoch; zero means never expires.
    expiry_time_ms: AtomicU64,
    absent: AbsentResourceList,
}

impl Level {
    /// Creates a level anchored at the south-west corner of the globe.
    ///
    /// # Errors
    ///
    /// * [`GridError::InvalidDimension`] if either tile side is zero
    /// * [`GridError::InvalidDelta`] if either delta is not positive and finite
    pub fn new(
        number: u32,
        tile_width: u32,
        tile_height: u32,
        lat_delta: f64,
        lon_delta: f64,
        cache_name: impl Into<String>,
        path_template: PathTemplate,
    ) -> GridResult<Self> {
        if tile_width == 0 || tile_height == 0 {
            return Err(GridError::InvalidDimension {
                width: tile_width,
                height: tile_height,
            });
        }
        let origin = LatLon::SOUTH_WEST;
        let rows = grid::row_count(lat_delta, origin.lat())?;
        let columns = grid::column_count(lon_delta)?;

        Ok(Self {
            number,
            tile_width,
            tile_height,
            lat_delta,
            lon_delta,
            tile_origin: origin,
            rows,
            columns,
            cache_name: cache_name.into(),
            path_template,
            empty: false,
            active: AtomicBool::new(true),
            expiry_time_ms: AtomicU64::new(0),
            absent: AbsentResourceList::default(),
        })
    }

    /// Re-anchors the row/column grid at `origin`.
    pub fn with_tile_origin(mut self, origin: LatLon) -> GridResult<Self> {
        self.rows = grid::row_count(self.lat_delta, origin.lat())?;
        self.tile_origin = origin;
        Ok(self)
    }

    /// Marks the level as a placeholder whose tiles are never fetched.
    pub fn with_empty(mut self, empty: bool) -> Self {
        self.empty = empty;
        self
    }

    /// Replaces the retry policy for absent resources.
    pub fn with_absent_config(mut self, config: AbsentResourceConfig) -> Self {
        self.absent = AbsentResourceList::new(config);
        self
    }

    /// Level number; 0 is the coarsest.
    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    #[inline]
    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// Latitude extent of one tile in degrees.
    #[inline]
    pub fn lat_delta(&self) -> f64 {
        self.lat_delta
    }

    /// Longitude extent of one tile in degrees.
    #[inline]
    pub fn lon_delta(&self) -> f64 {
        self.lon_delta
    }

    /// Grid origin that rows and columns are counted from.
    #[inline]
    pub fn tile_origin(&self) -> LatLon {
        self.tile_origin
    }

    /// Rows between the origin and the north pole.
    #[inline]
    pub fn num_rows(&self) -> u32 {
        self.rows
    }

    /// Columns around the globe.
    #[inline]
    pub fn num_columns(&self) -> u32 {
        self.columns
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn path_template(&self) -> &PathTemplate {
        &self.path_template
    }

    pub fn dataset_name(&self) -> &str {
        self.path_template.dataset_name()
    }

    pub fn format_suffix(&self) -> &str {
        self.path_template.format_suffix()
    }

    /// Angular size of one texel in degrees, measured along the tile width.
    #[inline]
    pub fn texel_size(&self) -> f64 {
        self.lat_delta / self.tile_width as f64
    }

    /// `{cache_name}/{level}`, the directory holding this level's tiles.
    pub fn level_path(&self) -> String {
        format!("{}/{}", self.cache_name, self.number)
    }

    /// True for placeholder levels that hold no resources.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_active(&self) -> bool {
        self.active.load(AtomicOrdering::Relaxed)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, AtomicOrdering::Relaxed);
    }

    /// Time before which fetched resources of this level are stale.
    pub fn expiry_time(&self) -> Option<SystemTime> {
        match self.expiry_time_ms.load(AtomicOrdering::Relaxed) {
            0 => None,
            ms => Some(UNIX_EPOCH + Duration::from_millis(ms)),
        }
    }

    /// Sets or clears the expiry time.
    pub fn set_expiry_time(&self, expiry: Option<SystemTime>) {
        let ms = expiry
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        self.expiry_time_ms.store(ms, AtomicOrdering::Relaxed);
    }

    /// True if a resource retrieved at `retrieved_at` predates the expiry time.
    pub fn is_expired(&self, retrieved_at: SystemTime) -> bool {
        match self.expiry_time() {
            Some(expiry) => retrieved_at < expiry && expiry <= SystemTime::now(),
            None => false,
        }
    }

    /// Cache-relative identifier of `tile` at this level.
    ///
    /// Uses the tile's cache name (its override, or this level's) and this
    /// level's number. `format_override` replaces the level's format suffix.
    pub fn tile_resource_identifier(&self, tile: &Tile, format_override: Option<&str>) -> String {
        self.resource_identifier(tile.cache_name(), tile.row(), tile.column(), format_override)
    }

    /// Cache-relative identifier of the cell at `row`/`column`.
    pub fn resource_identifier(
        &self,
        cache_name: &str,
        row: u32,
        column: u32,
        format_override: Option<&str>,
    ) -> String {
        match format_override {
            Some(format) => {
                let suffix = normalize_suffix(format);
                format_resource_path(cache_name, self.number, row, column, &suffix)
            }
            None => format_resource_path(
                cache_name,
                self.number,
                row,
                column,
                self.format_suffix(),
            ),
        }
    }

    /// Dense index of a cell, unique within this level.
    #[inline]
    pub fn tile_number(&self, row: u32, column: u32) -> u64 {
        row as u64 * self.columns as u64 + column as u64
    }

    /// Records a failed fetch of the tile at `tile_number`.
    pub fn mark_resource_absent(&self, tile_number: u64) {
        self.absent.mark_absent(tile_number);
    }

    /// True if the tile at `tile_number` should not be fetched right now.
    pub fn is_resource_absent(&self, tile_number: u64) -> bool {
        self.absent.is_absent(tile_number)
    }

    /// Clears recorded failures for the tile at `tile_number`.
    pub fn unmark_resource_absent(&self, tile_number: u64) {
        self.absent.unmark(tile_number);
    }

    pub fn absent_resources(&self) -> &AbsentResourceList {
        &self.absent
    }

    /// Checks `row`/`column` against this level's grid bounds.
    pub fn check_cell(&self, row: u32, column: u32) -> GridResult<()> {
        if row >= self.rows {
            return Err(GridError::RowOutOfRange {
                level: self.number,
                row,
                rows: self.rows,
            });
        }
        if column >= self.columns {
            return Err(GridError::ColumnOutOfRange {
                level: self.number,
                column,
                columns: self.columns,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("number", &self.number)
            .field("tile_width", &self.tile_width)
            .field("tile_height", &self.tile_height)
            .field("lat_delta", &self.lat_delta)
            .field("lon_delta", &self.lon_delta)
            .field("cache_name", &self.cache_name)
            .field("empty", &self.empty)
            .field("active", &self.is_active())
            .finish()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level {} ({}x{} px, {}° x {}°)",
            self.number, self.tile_width, self.tile_height, self.lat_delta, self.lon_delta
        )
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for Level {}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number)
    }
}

impl Hash for Level {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.number.hash(state);
    }
}
