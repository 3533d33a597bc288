//! Globetiles - multi-resolution tile addressing for virtual globes
//!
//! This library provides the tile grid that a globe renderer streams imagery
//! and elevation through: geodetic sectors, row/column grid math, resolution
//! levels, level selection by viewer resolution, and tile identities and
//! cache paths.
//!
//! # Example
//!
//! ```
//! use globetiles::config::DatasetConfig;
//! use globetiles::geo::Sector;
//! use globetiles::level::LevelSet;
//!
//! let levels = LevelSet::from_config(&DatasetConfig::default()).unwrap();
//! let view = Sector::from_degrees(-10.0, 10.0, -10.0, 10.0).unwrap();
//!
//! let index = levels.level_index_for_resolution(0.05, &view).unwrap();
//! assert_eq!(index, 1);
//!
//! let tiles = levels.tiles_in_sector(index, &view).unwrap();
//! assert_eq!(tiles[0].path(), "Earth/BlueMarble/1/4/4_9.dds");
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod grid;
pub mod level;
pub mod logging;
pub mod tile;

pub use error::{GridError, GridResult};
