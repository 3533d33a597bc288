//! Dataset configuration.
//!
//! A [`DatasetConfig`] describes the level pyramid of one dataset. It is
//! built once, usually from an INI file, and passed by reference into
//! [`LevelSet::from_config`](crate::level::LevelSet::from_config).
//!
//! # File Format
//!
//! ```ini
//! [dataset]
//! name = bmng200405
//! cache_name = Earth/BlueMarble
//! format_suffix = .dds
//! num_levels = 5
//! num_empty_levels = 0
//! tile_width = 512
//! tile_height = 512
//! level_zero_tile_delta_lat = 36
//! level_zero_tile_delta_lon = 36
//! subdivision_factor = 2
//! tile_origin_lat = -90
//! tile_origin_lon = -180
//! sector_min_lat = -90
//! sector_max_lat = 90
//! sector_min_lon = -180
//! sector_max_lon = 180
//! inactive_levels = 3,4
//! expiry_time_ms = 1700000000000
//!
//! [absent]
//! max_tries = 3
//! min_check_interval_ms = 60000
//! try_again_interval_ms = 300000
//! max_entries = 2000
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] values.

mod parse;

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ini::Ini;

use crate::error::{GridError, GridResult};
use crate::geo::{LatLon, Sector};
use crate::level::{AbsentResourceConfig, DEFAULT_FORMAT_SUFFIX};

use parse::{get_list, get_value};

/// INI section holding the pyramid description.
pub const DATASET_SECTION: &str = "dataset";

/// INI section holding the absent-resource retry policy.
pub const ABSENT_SECTION: &str = "absent";

/// Default dataset name.
pub const DEFAULT_DATASET_NAME: &str = "bmng200405";

/// Default cache namespace.
pub const DEFAULT_CACHE_NAME: &str = "Earth/BlueMarble";

/// Default number of levels.
pub const DEFAULT_NUM_LEVELS: u32 = 5;

/// Largest level count a dataset may declare.
pub const MAX_LEVELS: u32 = 64;

/// Default tile side in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Default level-zero tile size in degrees.
pub const DEFAULT_LEVEL_ZERO_TILE_DELTA: f64 = 36.0;

/// Default ratio between the deltas of consecutive levels.
pub const DEFAULT_SUBDIVISION_FACTOR: u32 = 2;

/// Description of one dataset's level pyramid.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetConfig {
    /// Dataset name on the tile server.
    pub dataset_name: String,

    /// Cache namespace; first component of every tile path.
    pub cache_name: String,

    /// Tile file suffix, e.g. `.dds`.
    pub format_suffix: String,

    /// Number of levels in the pyramid.
    pub num_levels: u32,

    /// Leading levels that are placeholders and never fetched.
    pub num_empty_levels: u32,

    /// Tile width in pixels.
    pub tile_width: u32,

    /// Tile height in pixels.
    pub tile_height: u32,

    /// `(lat, lon)` size of a level-zero tile in degrees.
    pub level_zero_tile_delta: (f64, f64),

    /// Each level's delta is the previous one divided by this.
    pub subdivision_factor: u32,

    /// Grid origin shared by all levels.
    pub tile_origin: LatLon,

    /// Coverage of the dataset.
    pub sector: Sector,

    /// Level numbers that start out inactive.
    pub inactive_levels: Vec<u32>,

    /// Resources retrieved before this instant are stale.
    pub expiry_time: Option<SystemTime>,

    /// Retry policy for resources the server failed to deliver.
    pub absent: AbsentResourceConfig,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            format_suffix: DEFAULT_FORMAT_SUFFIX.to_string(),
            num_levels: DEFAULT_NUM_LEVELS,
            num_empty_levels: 0,
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
            level_zero_tile_delta: (DEFAULT_LEVEL_ZERO_TILE_DELTA, DEFAULT_LEVEL_ZERO_TILE_DELTA),
            subdivision_factor: DEFAULT_SUBDIVISION_FACTOR,
            tile_origin: LatLon::SOUTH_WEST,
            sector: Sector::full_sphere(),
            inactive_levels: Vec::new(),
            expiry_time: None,
            absent: AbsentResourceConfig::default(),
        }
    }
}

impl DatasetConfig {
    /// Loads a configuration from an INI file.
    pub fn load(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loading dataset configuration");
        Self::from_ini_str(&text)
    }

    /// Parses a configuration from INI text.
    pub fn from_ini_str(text: &str) -> GridResult<Self> {
        let ini = Ini::load_from_str(text)
            .map_err(|e| GridError::Config(format!("failed to parse INI: {}", e)))?;
        Self::from_ini(&ini)
    }

    /// Reads a configuration from a parsed INI document.
    pub fn from_ini(ini: &Ini) -> GridResult<Self> {
        let defaults = Self::default();
        let dataset = ini.section(Some(DATASET_SECTION));
        let absent = ini.section(Some(ABSENT_SECTION));

        let origin = defaults.tile_origin;
        let origin_lat = get_value(dataset, DATASET_SECTION, "tile_origin_lat", origin.lat())?;
        let origin_lon = get_value(dataset, DATASET_SECTION, "tile_origin_lon", origin.lon())?;

        let coverage = defaults.sector;
        let sector = Sector::from_degrees(
            get_value(dataset, DATASET_SECTION, "sector_min_lat", coverage.min_lat())?,
            get_value(dataset, DATASET_SECTION, "sector_max_lat", coverage.max_lat())?,
            get_value(dataset, DATASET_SECTION, "sector_min_lon", coverage.min_lon())?,
            get_value(dataset, DATASET_SECTION, "sector_max_lon", coverage.max_lon())?,
        )?;

        let expiry_ms: u64 = get_value(dataset, DATASET_SECTION, "expiry_time_ms", 0)?;
        let expiry_time = (expiry_ms > 0).then(|| UNIX_EPOCH + Duration::from_millis(expiry_ms));

        let default_absent = &defaults.absent;
        let absent = AbsentResourceConfig {
            max_tries: get_value(absent, ABSENT_SECTION, "max_tries", default_absent.max_tries)?,
            min_check_interval: Duration::from_millis(get_value(
                absent,
                ABSENT_SECTION,
                "min_check_interval_ms",
                default_absent.min_check_interval.as_millis() as u64,
            )?),
            try_again_interval: Duration::from_millis(get_value(
                absent,
                ABSENT_SECTION,
                "try_again_interval_ms",
                default_absent.try_again_interval.as_millis() as u64,
            )?),
            max_entries: get_value(
                absent,
                ABSENT_SECTION,
                "max_entries",
                default_absent.max_entries,
            )?,
        };

        let config = Self {
            dataset_name: get_value(dataset, DATASET_SECTION, "name", defaults.dataset_name)?,
            cache_name: get_value(dataset, DATASET_SECTION, "cache_name", defaults.cache_name)?,
            format_suffix: get_value(
                dataset,
                DATASET_SECTION,
                "format_suffix",
                defaults.format_suffix,
            )?,
            num_levels: get_value(dataset, DATASET_SECTION, "num_levels", defaults.num_levels)?,
            num_empty_levels: get_value(
                dataset,
                DATASET_SECTION,
                "num_empty_levels",
                defaults.num_empty_levels,
            )?,
            tile_width: get_value(dataset, DATASET_SECTION, "tile_width", defaults.tile_width)?,
            tile_height: get_value(dataset, DATASET_SECTION, "tile_height", defaults.tile_height)?,
            level_zero_tile_delta: (
                get_value(
                    dataset,
                    DATASET_SECTION,
                    "level_zero_tile_delta_lat",
                    defaults.level_zero_tile_delta.0,
                )?,
                get_value(
                    dataset,
                    DATASET_SECTION,
                    "level_zero_tile_delta_lon",
                    defaults.level_zero_tile_delta.1,
                )?,
            ),
            subdivision_factor: get_value(
                dataset,
                DATASET_SECTION,
                "subdivision_factor",
                defaults.subdivision_factor,
            )?,
            tile_origin: LatLon::new(origin_lat, origin_lon)?,
            sector,
            inactive_levels: get_list(dataset, DATASET_SECTION, "inactive_levels")?,
            expiry_time,
            absent,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks the values a level pyramid cannot be built from.
    pub fn validate(&self) -> GridResult<()> {
        if self.num_levels == 0 {
            return Err(GridError::EmptyLevelSet);
        }
        if self.num_levels > MAX_LEVELS {
            return Err(GridError::Config(format!(
                "num_levels ({}) exceeds the maximum of {}",
                self.num_levels, MAX_LEVELS
            )));
        }
        if self.num_empty_levels > self.num_levels {
            return Err(GridError::Config(format!(
                "num_empty_levels ({}) exceeds num_levels ({})",
                self.num_empty_levels, self.num_levels
            )));
        }
        if self.subdivision_factor < 2 {
            return Err(GridError::Config(format!(
                "subdivision_factor must be at least 2, got {}",
                self.subdivision_factor
            )));
        }
        if self.cache_name.trim().is_empty() {
            return Err(GridError::Config("cache_name must not be empty".to_string()));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(GridError::InvalidDimension {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        let (lat_delta, lon_delta) = self.level_zero_tile_delta;
        for delta in [lat_delta, lon_delta] {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(GridError::InvalidDelta(delta));
            }
        }
        Ok(())
    }

    /// Renders the configuration in the INI format [`from_ini_str`](Self::from_ini_str) reads.
    pub fn to_ini_string(&self) -> String {
        let mut ini = Ini::new();
        let inactive: Vec<String> = self.inactive_levels.iter().map(u32::to_string).collect();
        let expiry_ms = self
            .expiry_time
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis())
            .unwrap_or(0);

        ini.with_section(Some(DATASET_SECTION))
            .set("name", self.dataset_name.as_str())
            .set("cache_name", self.cache_name.as_str())
            .set("format_suffix", self.format_suffix.as_str())
            .set("num_levels", self.num_levels.to_string())
            .set("num_empty_levels", self.num_empty_levels.to_string())
            .set("tile_width", self.tile_width.to_string())
            .set("tile_height", self.tile_height.to_string())
            .set("level_zero_tile_delta_lat", self.level_zero_tile_delta.0.to_string())
            .set("level_zero_tile_delta_lon", self.level_zero_tile_delta.1.to_string())
            .set("subdivision_factor", self.subdivision_factor.to_string())
            .set("tile_origin_lat", self.tile_origin.lat().to_string())
            .set("tile_origin_lon", self.tile_origin.lon().to_string())
            .set("sector_min_lat", self.sector.min_lat().to_string())
            .set("sector_max_lat", self.sector.max_lat().to_string())
            .set("sector_min_lon", self.sector.min_lon().to_string())
            .set("sector_max_lon", self.sector.max_lon().to_string())
            .set("inactive_levels", inactive.join(","))
            .set("expiry_time_ms", expiry_ms.to_string());

        ini.with_section(Some(ABSENT_SECTION))
            .set("max_tries", self.absent.max_tries.to_string())
            .set(
                "min_check_interval_ms",
                self.absent.min_check_interval.as_millis().to_string(),
            )
            .set(
                "try_again_interval_ms",
                self.absent.try_again_interval.as_millis().to_string(),
            )
            .set("max_entries", self.absent.max_entries.to_string());

        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = ini.write_to(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Set the cache namespace.
    pub fn with_cache_name(mut self, cache_name: impl Into<String>) -> Self {
        self.cache_name = cache_name.into();
        self
    }

    /// Set the number of levels.
    pub fn with_num_levels(mut self, num_levels: u32) -> Self {
        self.num_levels = num_levels;
        self
    }

    /// Set the number of leading placeholder levels.
    pub fn with_num_empty_levels(mut self, num_empty_levels: u32) -> Self {
        self.num_empty_levels = num_empty_levels;
        self
    }

    /// Set the tile size in pixels.
    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    /// Set the level-zero tile delta in degrees.
    pub fn with_level_zero_tile_delta(mut self, lat: f64, lon: f64) -> Self {
        self.level_zero_tile_delta = (lat, lon);
        self
    }

    /// Set the coverage sector.
    pub fn with_sector(mut self, sector: Sector) -> Self {
        self.sector = sector;
        self
    }

    /// Set the tile file suffix.
    pub fn with_format_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.format_suffix = suffix.into();
        self
    }
}
