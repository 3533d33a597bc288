//! End-to-end tests of the tile grid: configuration to level set to tiles
//! to the fetch queue.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use globetiles::config::DatasetConfig;
use globetiles::geo::{LatLon, Sector};
use globetiles::grid;
use globetiles::level::LevelSet;
use globetiles::tile::{Tile, TileKey, TileQueue};
use globetiles::GridError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn blue_marble() -> LevelSet {
    LevelSet::from_config(&DatasetConfig::default()).unwrap()
}

#[test]
fn test_selection_clamps_to_finest_level() {
    let levels = blue_marble();
    let view = Sector::from_degrees(-10.0, 10.0, -10.0, 10.0).unwrap();

    assert_eq!(levels.level_index_for_resolution(0.05, &view).unwrap(), 1);
    assert_eq!(levels.level_index_for_resolution(0.001, &view).unwrap(), 4);
    assert_eq!(levels.select_level(1e-9, &view).unwrap().number(), 4);
}

#[test]
fn test_selection_outside_coverage() {
    let config = DatasetConfig::default()
        .with_sector(Sector::from_degrees(30.0, 60.0, 0.0, 40.0).unwrap());
    let levels = LevelSet::from_config(&config).unwrap();
    let view = Sector::from_degrees(-10.0, 10.0, -10.0, 10.0).unwrap();

    assert!(matches!(
        levels.level_index_for_resolution(0.05, &view),
        Err(GridError::OutsideCoverage(_))
    ));
}

#[test]
fn test_view_to_paths() {
    let levels = blue_marble();
    let view = Sector::from_degrees(-10.0, 10.0, -10.0, 10.0).unwrap();
    let index = levels.level_index_for_resolution(0.05, &view).unwrap();
    let tiles = levels.tiles_in_sector(index, &view).unwrap();

    let paths: Vec<&str> = tiles.iter().map(Tile::path).collect();
    assert_eq!(
        paths,
        vec![
            "Earth/BlueMarble/1/4/4_9.dds",
            "Earth/BlueMarble/1/4/4_10.dds",
            "Earth/BlueMarble/1/5/5_9.dds",
            "Earth/BlueMarble/1/5/5_10.dds",
        ]
    );
    for tile in &tiles {
        assert!(tile.sector().intersects_interior(&view));
    }
}

#[test]
fn test_resource_identifier_contract() {
    let levels = blue_marble();
    let level = levels.level(3).unwrap();
    assert_eq!(
        level.resource_identifier("Earth/BlueMarble", 12, 45, None),
        "Earth/BlueMarble/3/12/12_45.dds"
    );
}

#[test]
fn test_key_stable_across_sector_instances() {
    let levels = blue_marble();
    let level = Arc::clone(levels.level(2).unwrap());

    let a = Tile::from_sector(
        Sector::from_degrees(-9.0, 0.0, 0.0, 9.0).unwrap(),
        Arc::clone(&level),
    )
    .unwrap();
    let b = levels.tile_at(2, a.row(), a.column()).unwrap();

    assert_eq!(a.key(), b.key());
    assert_eq!(a, b);
    assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);

    let set: HashSet<TileKey> = [a.key().clone(), b.key().clone()].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_antimeridian_view() {
    let levels = blue_marble();
    let view = Sector::from_degrees(0.0, 10.0, 170.0, -170.0).unwrap();
    let tiles = levels.tiles_in_sector(0, &view).unwrap();
    let cells: Vec<(u32, u32)> = tiles.iter().map(|t| (t.row(), t.column())).collect();
    assert_eq!(cells, vec![(2, 0), (2, 9)]);
}

#[test]
fn test_boundary_row_and_seam_columns() {
    assert_eq!(grid::compute_row(10.0, 90.0, -90.0).unwrap(), 17);
    let east = grid::compute_column(1.0, 179.5, -180.0).unwrap();
    let west = grid::compute_column(1.0, -179.9, -180.0).unwrap();
    assert_eq!(east, 359);
    assert_eq!(west, 0);
    assert_eq!((east + 1) % grid::column_count(1.0).unwrap(), west);
}

#[test]
fn test_random_locations_land_in_their_tile() {
    let levels = blue_marble();
    let mut rng = StdRng::seed_from_u64(0x9e37_79b9);

    for _ in 0..500 {
        let location = LatLon::new(
            rng.random_range(-90.0..=90.0),
            rng.random_range(-180.0..180.0),
        )
        .unwrap();
        let index = rng.random_range(0..levels.num_levels());
        let tile = levels.tile_for_location(index, &location).unwrap();
        assert!(
            tile.sector().contains(&location),
            "{} not in {} ({})",
            location,
            tile.sector(),
            tile
        );
    }
}

#[test]
fn test_subdivision_covers_parent() {
    let levels = blue_marble();
    let parent = levels.tile_at(1, 3, 7).unwrap();
    let next = levels.next_level(1).unwrap();
    let children = parent.subdivide(next).unwrap();

    assert_eq!(children.len(), 4);
    for child in &children {
        assert_eq!(child.level_number(), 2);
        assert!(parent.sector().contains_sector(child.sector()));
    }
}

#[test]
fn test_queue_orders_by_distance_from_eye() {
    let levels = blue_marble();
    let view = Sector::from_degrees(-30.0, 30.0, -30.0, 30.0).unwrap();
    let eye = LatLon::new(20.0, 25.0).unwrap();

    let mut queue = TileQueue::new();
    for tile in levels.tiles_in_sector(2, &view).unwrap() {
        tile.set_priority_distance(eye.angular_distance(&tile.centroid()));
        queue.push(tile);
    }

    let first = queue.peek().unwrap();
    assert!(first.sector().contains(&eye));

    let ordered = queue.drain_sorted();
    assert!(ordered
        .windows(2)
        .all(|pair| pair[0].priority() <= pair[1].priority()));
}

#[test]
fn test_tiles_shared_across_threads() {
    let levels = Arc::new(blue_marble());
    let view = Sector::from_degrees(-45.0, 45.0, -90.0, 90.0).unwrap();
    let tiles = Arc::new(levels.tiles_in_sector(2, &view).unwrap());

    std::thread::scope(|scope| {
        for worker in 0..4u32 {
            let tiles = Arc::clone(&tiles);
            scope.spawn(move || {
                for tile in tiles.iter() {
                    let path = tile.path().to_string();
                    assert!(path.starts_with("Earth/BlueMarble/2/"));
                    tile.set_priority(f64::from(worker));
                }
            });
        }
    });

    for tile in tiles.iter() {
        assert!((0.0..4.0).contains(&tile.priority()));
    }
}

#[test]
fn test_config_file_to_tiles() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[dataset]\n\
         cache_name = Earth/Landsat\n\
         format_suffix = jpg\n\
         num_levels = 3\n\
         level_zero_tile_delta_lat = 20\n\
         level_zero_tile_delta_lon = 20\n\
         inactive_levels = 2"
    )
    .unwrap();

    let config = DatasetConfig::load(file.path()).unwrap();
    let levels = LevelSet::from_config(&config).unwrap();
    assert_eq!(levels.num_levels(), 3);
    assert!(!levels.last_level().is_active());

    let tile = levels
        .tile_for_location(1, &LatLon::new(0.0, 0.0).unwrap())
        .unwrap();
    assert_eq!(tile.path(), "Earth/Landsat/1/9/9_18.jpg");
}
