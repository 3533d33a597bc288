//! Ordered stacks of levels.
//!
//! A [`LevelSet`] owns the levels of one dataset, ordered from coarsest
//! (level 0) to finest, all sharing a tile origin and a coverage sector.
//! It answers the two questions a renderer asks every frame: which level
//! matches the resolution the viewer can resolve, and which tiles of that
//! level cover the view.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, info};

use super::{Level, PathTemplate};
use crate::config::DatasetConfig;
use crate::error::{GridError, GridResult};
use crate::geo::{normalize_longitude, LatLon, Sector};
use crate::grid::{self, compute_column_longitude, compute_row_latitude};
use crate::tile::Tile;

/// The levels of one dataset, coarsest first.
#[derive(Debug)]
pub struct LevelSet {
    levels: Vec<Arc<Level>>,
    sector: Sector,
    tile_origin: LatLon,
}

impl LevelSet {
    /// Builds a level set from explicit levels.
    ///
    /// # Errors
    ///
    /// * [`GridError::EmptyLevelSet`] if `levels` is empty
    /// * [`GridError::InvalidLevelSequence`] if level numbers do not match
    ///   their positions, origins differ, or a level's deltas are not the
    ///   previous level's divided by an integer factor of at least 2
    pub fn new(levels: Vec<Level>, sector: Sector) -> GridResult<Self> {
        let first = levels.first().ok_or(GridError::EmptyLevelSet)?;
        let tile_origin = first.tile_origin();

        for (index, level) in levels.iter().enumerate() {
            if level.number() as usize != index {
                return Err(GridError::InvalidLevelSequence {
                    level: level.number(),
                    reason: format!("expected level number {}", index),
                });
            }
            if level.tile_origin() != tile_origin {
                return Err(GridError::InvalidLevelSequence {
                    level: level.number(),
                    reason: format!(
                        "tile origin {} differs from {}",
                        level.tile_origin(),
                        tile_origin
                    ),
                });
            }
            if index > 0 {
                let previous = &levels[index - 1];
                check_subdivision(previous.lat_delta(), level.lat_delta(), level.number())?;
                check_subdivision(previous.lon_delta(), level.lon_delta(), level.number())?;
            }
        }

        info!(
            levels = levels.len(),
            sector = %sector,
            origin = %tile_origin,
            "Level set created"
        );

        Ok(Self {
            levels: levels.into_iter().map(Arc::new).collect(),
            sector,
            tile_origin,
        })
    }

    /// Builds the level set a dataset configuration describes.
    ///
    /// Level `n` has the level-zero delta divided by `subdivision_factor^n`.
    /// The first `num_empty_levels` levels are placeholders.
    pub fn from_config(config: &DatasetConfig) -> GridResult<Self> {
        config.validate()?;

        let template = PathTemplate::new(config.dataset_name.clone(), &config.format_suffix);
        let factor = config.subdivision_factor as f64;
        let mut levels = Vec::new();

        for number in 0..config.num_levels {
            let divisor = factor.powi(number as i32);
            let level = Level::new(
                number,
                config.tile_width,
                config.tile_height,
                config.level_zero_tile_delta.0 / divisor,
                config.level_zero_tile_delta.1 / divisor,
                config.cache_name.clone(),
                template.clone(),
            )?
            .with_tile_origin(config.tile_origin)?
            .with_empty(number < config.num_empty_levels)
            .with_absent_config(config.absent.clone());

            level.set_active(!config.inactive_levels.contains(&number));
            level.set_expiry_time(config.expiry_time);
            levels.push(level);
        }

        Self::new(levels, config.sector)
    }

    /// Levels in order, coarsest first.
    pub fn levels(&self) -> &[Arc<Level>] {
        &self.levels
    }

    /// Level at `index`.
    pub fn level(&self, index: usize) -> GridResult<&Arc<Level>> {
        self.levels.get(index).ok_or(GridError::LevelOutOfRange {
            index,
            count: self.levels.len(),
        })
    }

    /// Coarsest level.
    pub fn first_level(&self) -> &Arc<Level> {
        &self.levels[0]
    }

    /// Finest level.
    pub fn last_level(&self) -> &Arc<Level> {
        &self.levels[self.levels.len() - 1]
    }

    /// Level after `index`, if any.
    pub fn next_level(&self, index: usize) -> Option<&Arc<Level>> {
        self.levels.get(index + 1)
    }

    pub fn is_final_level(&self, index: usize) -> bool {
        index == self.levels.len() - 1
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Rows in the grid of level `index`.
    pub fn num_rows(&self, index: usize) -> GridResult<u32> {
        Ok(self.level(index)?.num_rows())
    }

    /// Columns in the grid of level `index`.
    pub fn num_columns(&self, index: usize) -> GridResult<u32> {
        Ok(self.level(index)?.num_columns())
    }

    /// Coverage of the dataset.
    pub fn sector(&self) -> Sector {
        self.sector
    }

    /// Grid origin shared by every level.
    pub fn tile_origin(&self) -> LatLon {
        self.tile_origin
    }

    /// `(lat, lon)` size of a level-zero tile in degrees.
    pub fn level_zero_tile_delta(&self) -> (f64, f64) {
        let first = self.first_level();
        (first.lat_delta(), first.lon_delta())
    }

    /// Index of the coarsest level whose texel size is at most `resolution`.
    ///
    /// Falls back to the finest level when none is fine enough. Requesting a
    /// finer resolution never yields a coarser level.
    ///
    /// # Errors
    ///
    /// * [`GridError::InvalidResolution`] if `resolution` is not positive and finite
    /// * [`GridError::OutsideCoverage`] if `sector` misses the dataset coverage
    pub fn level_index_for_resolution(
        &self,
        resolution: f64,
        sector: &Sector,
    ) -> GridResult<usize> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(GridError::InvalidResolution(resolution));
        }
        if !self.sector.intersects(sector) {
            return Err(GridError::OutsideCoverage(*sector));
        }

        let index = self
            .levels
            .iter()
            .position(|level| level.texel_size() <= resolution)
            .unwrap_or(self.levels.len() - 1);

        debug!(
            resolution,
            sector = %sector,
            level = index,
            texel_size = self.levels[index].texel_size(),
            "Selected level"
        );
        Ok(index)
    }

    /// The level [`level_index_for_resolution`](Self::level_index_for_resolution) selects.
    pub fn select_level(&self, resolution: f64, sector: &Sector) -> GridResult<&Arc<Level>> {
        let index = self.level_index_for_resolution(resolution, sector)?;
        Ok(&self.levels[index])
    }

    /// Tile of level `index` at `row`/`column`.
    pub fn tile_at(&self, index: usize, row: u32, column: u32) -> GridResult<Tile> {
        let level = self.level(index)?;
        Tile::from_grid(Arc::clone(level), row, column)
    }

    /// Tile of level `index` that holds `location`.
    pub fn tile_for_location(&self, index: usize, location: &LatLon) -> GridResult<Tile> {
        let level = self.level(index)?;
        let row = grid::compute_row(level.lat_delta(), location.lat(), self.tile_origin.lat())?;
        let column =
            grid::compute_column(level.lon_delta(), location.lon(), self.tile_origin.lon())?;
        Tile::from_grid(Arc::clone(level), row, column)
    }

    /// Every tile of level `index` that overlaps `sector`, in tile order.
    ///
    /// The view is clipped to the dataset coverage first. A view crossing the
    /// antimeridian is handled as its eastern and western pieces. Tiles that
    /// only touch the view's northern or eastern edge are left out unless
    /// the view has no extent in that direction.
    pub fn tiles_in_sector(&self, index: usize, sector: &Sector) -> GridResult<Vec<Tile>> {
        let level = self.level(index)?;
        let Some(view) = self.sector.intersection(sector) else {
            return Ok(Vec::new());
        };

        let Some(rows) = self.row_span(level, &view)? else {
            return Ok(Vec::new());
        };
        let mut columns: Vec<u32> = Vec::new();
        let (east, west) = view.split_at_antimeridian();
        for piece in std::iter::once(east).chain(west) {
            columns.extend(self.column_span(level, &piece)?);
        }
        columns.sort_unstable();
        columns.dedup();

        let mut tiles = Vec::with_capacity(rows.clone().count() * columns.len());
        for row in rows {
            for &column in &columns {
                tiles.push(Tile::from_grid(Arc::clone(level), row, column)?);
            }
        }

        debug!(
            level = index,
            view = %view,
            tiles = tiles.len(),
            "Enumerated tiles in sector"
        );
        Ok(tiles)
    }

    /// Sets the expiry time on every level.
    pub fn expire_all(&self, expiry: Option<SystemTime>) {
        for level in &self.levels {
            level.set_expiry_time(expiry);
        }
    }

    /// Rows overlapping the part of `view` north of the grid origin.
    ///
    /// `None` when the view lies south of the origin or only touches it.
    fn row_span(
        &self,
        level: &Level,
        view: &Sector,
    ) -> GridResult<Option<RangeInclusive<u32>>> {
        let origin = self.tile_origin.lat();
        if view.max_lat() < origin || (view.max_lat() == origin && view.min_lat() < origin) {
            return Ok(None);
        }

        let delta = level.lat_delta();
        let first = grid::compute_row(delta, view.min_lat().max(origin), origin)?;
        let mut last = grid::compute_row(delta, view.max_lat(), origin)?;
        if last > first && compute_row_latitude(last, delta, origin) >= view.max_lat() {
            last -= 1;
        }
        Ok(Some(first..=last))
    }

    /// Columns overlapping a non-wrapping longitude span.
    fn column_span(&self, level: &Level, piece: &Sector) -> GridResult<Vec<u32>> {
        let origin = self.tile_origin.lon();
        let delta = level.lon_delta();
        let count = level.num_columns();
        let first = grid::compute_column(delta, piece.min_lon(), origin)?;
        let mut last = grid::compute_column(delta, piece.max_lon(), origin)?;

        if last != first {
            let edge = normalize_longitude(compute_column_longitude(last, delta, origin));
            if edge == normalize_longitude(piece.max_lon()) {
                last = if last == 0 { count - 1 } else { last - 1 };
            }
        }

        if first <= last {
            Ok((first..=last).collect())
        } else {
            // The span crosses the grid's own column seam.
            Ok((first..count).chain(0..=last).collect())
        }
    }
}

fn check_subdivision(coarser: f64, finer: f64, level: u32) -> GridResult<()> {
    if !matches!(grid::subdivision_factor(coarser, finer), Some(factor) if factor >= 2) {
        return Err(GridError::InvalidLevelSequence {
            level,
            reason: format!(
                "delta {} is not {} divided by an integer factor of at least 2",
                finer, coarser
            ),
        });
    }
    Ok(())
}
