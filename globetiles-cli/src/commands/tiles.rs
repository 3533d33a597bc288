//! `tiles` command: list the tiles covering a view.

use clap::Args;
use globetiles::tile::{Tile, TileQueue};

use super::common::{parse_lat_lon, GridArgs, TileInfo};
use super::select::resolve_sector;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct TilesArgs {
    /// Level index
    #[arg(long, short)]
    pub level: usize,

    /// View sector as MIN_LAT,MAX_LAT,MIN_LON,MAX_LON (default: dataset coverage)
    #[arg(long, allow_hyphen_values = true)]
    pub sector: Option<String>,

    /// Order tiles by distance from this LAT,LON instead of grid order
    #[arg(long, allow_hyphen_values = true)]
    pub from: Option<String>,

    /// Print at most this many tiles
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(grid: &GridArgs, args: &TilesArgs) -> Result<(), CliError> {
    let tiles = collect_tiles(grid, args)?;
    let with_priority = args.from.is_some();

    if args.json {
        let infos: Vec<TileInfo> = tiles
            .iter()
            .map(|tile| TileInfo::from_tile(tile, with_priority))
            .collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for tile in &tiles {
        if with_priority {
            println!("{:>12.6}  {}  {}", tile.priority(), tile, tile.path());
        } else {
            println!("{}  {}", tile, tile.path());
        }
    }
    println!("{} tile(s)", tiles.len());
    Ok(())
}

/// Tiles of the requested level and view, in output order.
fn collect_tiles(grid: &GridArgs, args: &TilesArgs) -> Result<Vec<Tile>, CliError> {
    let sector = resolve_sector(grid, args.sector.as_deref())?;
    let tiles = grid.levels.tiles_in_sector(args.level, &sector)?;

    let mut tiles = match &args.from {
        Some(text) => {
            let eye = parse_lat_lon(text)?;
            let mut queue = TileQueue::new();
            queue.extend(tiles.into_iter().map(|tile| {
                tile.set_priority_distance(eye.angular_distance(&tile.centroid()));
                tile
            }));
            queue.drain_sorted()
        }
        None => tiles,
    };

    if let Some(limit) = args.limit {
        tiles.truncate(limit);
    }
    Ok(tiles)
}
