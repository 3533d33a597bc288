//! `locate` command: find the tile holding a location.

use clap::Args;
use globetiles::geo::LatLon;

use super::common::{GridArgs, TileInfo};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Level index
    #[arg(long, short)]
    pub level: usize,

    /// Latitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lon: f64,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(grid: &GridArgs, args: &LocateArgs) -> Result<(), CliError> {
    let location = LatLon::new(args.lat, args.lon)?;
    let tile = grid.levels.tile_for_location(args.level, &location)?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&TileInfo::from_tile(&tile, false))?
        );
    } else {
        println!("Tile:   {}", tile);
        println!("Path:   {}", tile.path());
        println!("Sector: {}", tile.sector());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(level: usize, lat: f64, lon: f64) -> LocateArgs {
        LocateArgs {
            level,
            lat,
            lon,
            json: false,
        }
    }

    #[test]
    fn test_locate() {
        let grid = GridArgs::load(None).unwrap();
        assert!(run(&grid, &args(1, 53.55, 9.99)).is_ok());
    }

    #[test]
    fn test_locate_level_out_of_range() {
        let grid = GridArgs::load(None).unwrap();
        let err = run(&grid, &args(7, 0.0, 0.0)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_locate_invalid_latitude() {
        let grid = GridArgs::load(None).unwrap();
        assert!(run(&grid, &args(0, 91.0, 0.0)).is_err());
    }
}
