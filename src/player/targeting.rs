use bevy::prelude::*;

use crate::farming::TileGrid;
use crate::shared::*;

/// The cell under `cursor` if it's on the grid and its centre is within
/// reach of the player.
pub fn reachable_cell(grid: &TileGrid, player: Vec2, cursor: Vec2) -> Option<(i32, i32)> {
    let (x, y) = world_to_cell(cursor);
    grid.index(x, y)?;
    let center = TileGrid::tile_center(x, y);
    (center.distance(player) <= TARGET_RADIUS).then_some((x, y))
}

/// Track the cell under the mouse. Without a window or camera (headless
/// runs) the selection is left alone.
pub fn update_selected_cell(
    grid: Res<TileGrid>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    players: Query<&LogicalPosition, With<Player>>,
    mut selected: ResMut<SelectedCell>,
) {
    let (Ok(window), Ok((camera, camera_transform)), Ok(player)) =
        (windows.get_single(), cameras.get_single(), players.get_single())
    else {
        return;
    };

    let cell = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world_2d(camera_transform, cursor).ok())
        .and_then(|world| reachable_cell(&grid, player.0, Vec2::new(world.x, -world.y)));

    if selected.0 != cell {
        selected.0 = cell;
    }
}
