//! Axis-aligned actor collision against the grid.

use bevy::prelude::*;

use crate::shared::*;
use super::grid::TileGrid;

/// First blocking tile overlapped by the square `center ± radius`, scanning
/// columns left to right and each column top to bottom.
pub fn first_collision(grid: &TileGrid, center: Vec2, radius: f32) -> Option<(i32, i32)> {
    let (min_x, min_y) = world_to_cell(center - Vec2::splat(radius));
    let (max_x, max_y) = world_to_cell(center + Vec2::splat(radius));

    for x in min_x..=max_x {
        for y in min_y..=max_y {
            if grid.is_collision(x, y) {
                return Some((x, y));
            }
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub position: Vec2,
    /// Tiles that blocked the X and Y steps, in that order.
    pub blocked_by: [Option<(i32, i32)>; 2],
    /// Obstacles knocked down by a crazed actor.
    pub destroyed: u32,
}

impl MoveResult {
    pub fn collided(&self) -> bool {
        self.blocked_by.iter().any(Option::is_some)
    }
}

/// Move by `displacement`, X first then Y, so the actor slides along
/// walls. A step that newly overlaps a blocking tile is undone. An actor
/// that started inside an obstacle moves freely so it can walk out.
///
/// A crazed actor still gets stopped, but flattens the tile it hit.
pub fn move_with_collision(
    grid: &mut TileGrid,
    position: Vec2,
    radius: f32,
    displacement: Vec2,
    crazed: bool,
) -> MoveResult {
    let originally_colliding = first_collision(grid, position, radius).is_some();
    let mut result = MoveResult {
        position,
        blocked_by: [None, None],
        destroyed: 0,
    };

    for (axis, step) in [Vec2::new(displacement.x, 0.0), Vec2::new(0.0, displacement.y)]
        .into_iter()
        .enumerate()
    {
        let candidate = result.position + step;
        if originally_colliding {
            result.position = candidate;
            continue;
        }
        match first_collision(grid, candidate, radius) {
            Some((x, y)) => {
                result.blocked_by[axis] = Some((x, y));
                if crazed && grid.destroy_obstacle(x, y) {
                    result.destroyed += 1;
                }
            }
            None => result.position = candidate,
        }
    }

    result
}

/// Keep a position inside the world rectangle.
pub fn clamp_to_world(grid: &TileGrid, position: Vec2) -> Vec2 {
    let max = Vec2::new(grid.width() as f32, grid.height() as f32) * TILE_SIZE;
    position.clamp(Vec2::ZERO, max)
}
