use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::farming::collision::{clamp_to_world, move_with_collision};
use crate::farming::TileGrid;
use crate::shared::*;

/// Sprite rotation that faces a y-down world direction.
pub fn facing_for(direction: Vec2) -> f32 {
    (-direction.y).atan2(direction.x) + FRAC_PI_2
}

/// Turn raw input into this frame's displacement, updating movement state.
///
/// A crazed actor never stands still: its heading is the input angle plus
/// the time it has spent crazed, so it spins as the timer runs.
pub fn step_displacement(movement: &mut PlayerMovement, input: Vec2, delta: f32) -> Vec2 {
    movement.is_moving = input != Vec2::ZERO;

    if !movement.crazed {
        let Some(direction) = input.try_normalize() else {
            return Vec2::ZERO;
        };
        movement.facing = facing_for(direction);
        return direction * movement.speed * delta;
    }

    movement.crazed_timer += delta;
    let slowed = movement.slowdown_time > 0.0;
    movement.slowdown_time = (movement.slowdown_time - delta).max(0.0);

    let angle = input.y.atan2(input.x) + movement.crazed_timer;
    let direction = Vec2::from_angle(angle);
    movement.facing = facing_for(direction);

    let mut speed = movement.speed * movement.crazed_speed_multiplier;
    if slowed {
        speed *= 0.5;
    }
    direction * speed * delta
}

fn keyboard_direction(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let mut dir = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        dir.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        dir.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }
    dir
}

/// Read WASD / arrows, resolve collisions against the grid axis by axis,
/// clamp to the world, and let a crazed actor trample what it walks over.
pub fn player_movement(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut grid: ResMut<TileGrid>,
    mut query: Query<(&mut LogicalPosition, &mut PlayerMovement), With<Player>>,
) {
    let Ok((mut position, mut movement)) = query.get_single_mut() else {
        return;
    };
    let delta = time.delta_secs().min(MAX_FRAME_DELTA);

    let displacement = step_displacement(&mut movement, keyboard_direction(&keyboard), delta);
    let result = move_with_collision(
        &mut grid,
        position.0,
        movement.radius,
        displacement,
        movement.crazed,
    );
    if movement.crazed && result.collided() {
        movement.slowdown_time = SLOWDOWN_SECONDS;
        if result.destroyed > 0 {
            debug!("[Player] Smashed {} obstacle(s)", result.destroyed);
        }
    }
    position.0 = clamp_to_world(&grid, result.position);

    if movement.crazed {
        let (x, y) = world_to_cell(position.0);
        if grid.trample(x, y) {
            debug!("[Player] Trampled crop at ({}, {})", x, y);
        }
    }
}

/// Mirror the logical position and facing onto the sprite.
pub fn sync_player_transform(
    mut query: Query<(&LogicalPosition, &PlayerMovement, &mut Transform), With<Player>>,
) {
    for (position, movement, mut transform) in query.iter_mut() {
        transform.translation = world_to_translation(position.0, transform.translation.z);
        transform.rotation = Quat::from_rotation_z(movement.facing);
    }
}

pub fn handle_crazed_mode(
    mut events: EventReader<CrazedModeEvent>,
    mut query: Query<&mut PlayerMovement, With<Player>>,
) {
    for event in events.read() {
        for mut movement in query.iter_mut() {
            movement.crazed = event.crazed;
            movement.crazed_timer = 0.0;
            movement.slowdown_time = 0.0;
        }
        info!("[Player] Crazed mode {}", if event.crazed { "on" } else { "off" });
    }
}
