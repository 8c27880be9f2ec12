//! The fixed farm layout.
//!
//! A grass field the size of the map, a tilled-ready soil plot and a pond
//! inside the farmable rectangle, a lake beyond it, and tall grass
//! scattered over whatever grass is left.

use rand::Rng;

use crate::farming::random_tick::RandomTickScheduler;
use crate::farming::{TileGrid, TileType};
use crate::shared::*;

/// Tile the player starts on, just below the soil plot.
pub const PLAYER_SPAWN_TILE: (i32, i32) = (9, 12);

const SOIL_PLOT: (i32, i32, i32, i32) = (5, 4, 10, 6);
const POND: (i32, i32, i32, i32) = (20, 8, 5, 4);
const LAKE: (i32, i32, i32, i32) = (44, 12, 10, 9);

pub fn build_farm<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    scheduler: RandomTickScheduler,
    tall_grass_ratio: f64,
    rng: &mut R,
) -> TileGrid {
    let mut grid = TileGrid::new(width, height, TileType::Grass, scheduler);

    let fill_rect = |grid: &mut TileGrid, (x0, y0, rw, rh): (i32, i32, i32, i32), kind: TileType| {
        for dy in 0..rh {
            for dx in 0..rw {
                grid.set_tile_type(x0 + dx, y0 + dy, kind);
            }
        }
    };

    fill_rect(&mut grid, SOIL_PLOT, TileType::Soil);
    fill_rect(&mut grid, POND, TileType::Water);
    // Round off the pond's corners.
    let (px, py, pw, ph) = POND;
    for (x, y) in [(px, py), (px + pw - 1, py), (px, py + ph - 1), (px + pw - 1, py + ph - 1)] {
        grid.set_tile_type(x, y, TileType::Grass);
    }
    fill_rect(&mut grid, LAKE, TileType::Water);

    let (start_x, start_y) = FARMABLE_MAP_START;
    let (end_x, end_y) = FARMABLE_MAP_END;
    let ratio = tall_grass_ratio.clamp(0.0, 1.0);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if grid.tile(x, y).map(|t| t.tile_type) != Some(TileType::Grass) {
                continue;
            }
            if (x, y) == PLAYER_SPAWN_TILE {
                continue;
            }
            let farmable = (start_x as i32..=end_x as i32).contains(&x)
                && (start_y as i32..=end_y as i32).contains(&y);
            // Wild land beyond the farm is overgrown.
            let chance = if farmable { ratio } else { (ratio * 4.0).min(1.0) };
            if rng.gen_bool(chance) {
                grid.set_tile_type(x, y, TileType::TallGrass);
            }
        }
    }

    grid
}

pub fn player_spawn_position() -> bevy::math::Vec2 {
    TileGrid::tile_center(PLAYER_SPAWN_TILE.0, PLAYER_SPAWN_TILE.1)
}
