//! `select` command: pick the level for a resolution.

use clap::Args;
use globetiles::geo::Sector;

use super::common::{parse_sector, GridArgs};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Target resolution in degrees per texel
    #[arg(long, short)]
    pub resolution: f64,

    /// View sector as MIN_LAT,MAX_LAT,MIN_LON,MAX_LON (default: dataset coverage)
    #[arg(long, allow_hyphen_values = true)]
    pub sector: Option<String>,
}

pub fn run(grid: &GridArgs, args: &SelectArgs) -> Result<(), CliError> {
    let sector = resolve_sector(grid, args.sector.as_deref())?;
    let index = grid
        .levels
        .level_index_for_resolution(args.resolution, &sector)?;
    let level = &grid.levels.levels()[index];
    println!(
        "Level {} (texel size {:.8} deg, tiles {:.6} x {:.6} deg)",
        level.number(),
        level.texel_size(),
        level.lat_delta(),
        level.lon_delta()
    );
    if grid.levels.is_final_level(index) && level.texel_size() > args.resolution {
        println!("Note: finest level is coarser than the requested resolution");
    }
    Ok(())
}

/// The parsed `--sector`, or the dataset coverage when absent.
pub fn resolve_sector(grid: &GridArgs, sector: Option<&str>) -> Result<Sector, CliError> {
    match sector {
        Some(text) => parse_sector(text),
        None => Ok(grid.levels.sector()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sector_defaults_to_coverage() {
        let grid = GridArgs::load(None).unwrap();
        assert_eq!(resolve_sector(&grid, None).unwrap(), Sector::full_sphere());
    }

    #[test]
    fn test_run_rejects_bad_resolution() {
        let grid = GridArgs::load(None).unwrap();
        let args = SelectArgs {
            resolution: -1.0,
            sector: None,
        };
        assert!(matches!(run(&grid, &args), Err(CliError::Grid(_))));
    }

    #[test]
    fn test_run_selects() {
        let grid = GridArgs::load(None).unwrap();
        let args = SelectArgs {
            resolution: 0.05,
            sector: Some("-10,10,-10,10".to_string()),
        };
        assert!(run(&grid, &args).is_ok());
    }
}
