//! `levels` command: print the level table.

use globetiles::level::Level;

use super::common::GridArgs;
use crate::error::CliError;

pub fn run(grid: &GridArgs) -> Result<(), CliError> {
    let sector = grid.levels.sector();
    println!("Dataset: {} ({})", grid.config.dataset_name, grid.config.cache_name);
    println!("Coverage: {}", sector);
    println!("Origin: {}", grid.levels.tile_origin());
    println!();
    println!(
        "{:>5}  {:>12}  {:>12}  {:>6}  {:>7}  {:>14}  {}",
        "Level", "Lat delta", "Lon delta", "Rows", "Columns", "Texel size", "Flags"
    );
    for level in grid.levels.levels() {
        println!("{}", format_level_row(level));
    }
    Ok(())
}

fn format_level_row(level: &Level) -> String {
    let mut flags = Vec::new();
    if level.is_empty() {
        flags.push("empty");
    }
    if !level.is_active() {
        flags.push("inactive");
    }
    format!(
        "{:>5}  {:>12.6}  {:>12.6}  {:>6}  {:>7}  {:>14.8}  {}",
        level.number(),
        level.lat_delta(),
        level.lon_delta(),
        level.num_rows(),
        level.num_columns(),
        level.texel_size(),
        flags.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_level_row() {
        let grid = GridArgs::load(None).unwrap();
        let row = format_level_row(grid.levels.first_level());
        assert!(row.trim_start().starts_with('0'));
        assert!(row.contains("36.000000"));
        assert!(row.contains("0.07031250"));
        assert!(!row.contains("inactive"));
    }

    #[test]
    fn test_format_level_row_flags() {
        let grid = GridArgs::load(None).unwrap();
        let level = grid.levels.level(2).unwrap();
        level.set_active(false);
        assert!(format_level_row(level).ends_with("inactive"));
    }
}
