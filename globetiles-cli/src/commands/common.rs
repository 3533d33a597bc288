//! Common types and utilities shared across CLI commands.

use std::path::Path;

use globetiles::config::DatasetConfig;
use globetiles::geo::{LatLon, Sector};
use globetiles::level::LevelSet;
use globetiles::tile::{Tile, TileKey};
use serde::Serialize;

use crate::error::CliError;

/// Loaded configuration and the level set built from it.
pub struct GridArgs {
    pub config: DatasetConfig,
    pub levels: LevelSet,
}

impl GridArgs {
    /// Loads the configuration at `path`, or the default dataset.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let config = match path {
            Some(path) => DatasetConfig::load(path)?,
            None => DatasetConfig::default(),
        };
        let levels = LevelSet::from_config(&config)?;
        Ok(Self { config, levels })
    }
}

/// Parses `min_lat,max_lat,min_lon,max_lon` into a sector.
pub fn parse_sector(s: &str) -> Result<Sector, CliError> {
    let parts = parse_numbers(s, 4)?;
    Ok(Sector::from_degrees(parts[0], parts[1], parts[2], parts[3])?)
}

/// Parses `lat,lon` into a position.
pub fn parse_lat_lon(s: &str) -> Result<LatLon, CliError> {
    let parts = parse_numbers(s, 2)?;
    Ok(LatLon::new(parts[0], parts[1])?)
}

fn parse_numbers(s: &str, expected: usize) -> Result<Vec<f64>, CliError> {
    let parts = s
        .split(',')
        .map(|part| {
            part.trim().parse::<f64>().map_err(|_| {
                CliError::InvalidArgument(format!("'{}' is not a number in '{}'", part.trim(), s))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if parts.len() != expected {
        return Err(CliError::InvalidArgument(format!(
            "expected {} comma-separated values, got {} in '{}'",
            expected,
            parts.len(),
            s
        )));
    }
    Ok(parts)
}

/// Serializable view of a tile for JSON output.
#[derive(Debug, Serialize)]
pub struct TileInfo {
    pub key: TileKey,
    pub path: String,
    pub sector: Sector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

impl TileInfo {
    pub fn from_tile(tile: &Tile, with_priority: bool) -> Self {
        Self {
            key: tile.key().clone(),
            path: tile.path().to_string(),
            sector: *tile.sector(),
            priority: with_priority.then(|| tile.priority()),
        }
    }
}
