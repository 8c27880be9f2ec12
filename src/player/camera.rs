use bevy::prelude::*;
use crate::shared::*;

/// Smoothly follow the player. Snaps when the gap is large (first frame,
/// or after a teleport).
pub fn camera_follow_player(
    time: Res<Time>,
    player_query: Query<&LogicalPosition, (With<Player>, Without<Camera2d>)>,
    mut camera_query: Query<&mut Transform, (With<Camera2d>, Without<Player>)>,
) {
    let Ok(position) = player_query.get_single() else {
        return;
    };
    let Ok(mut cam_tf) = camera_query.get_single_mut() else {
        return;
    };

    let target = world_to_translation(position.0, cam_tf.translation.z);
    let gap = (target - cam_tf.translation).truncate();
    if gap.x.abs() > TILE_SIZE * 4.0 || gap.y.abs() > TILE_SIZE * 4.0 {
        cam_tf.translation = target;
        return;
    }

    let lerp_speed = 8.0;
    let t = (lerp_speed * time.delta_secs()).min(1.0);
    cam_tf.translation = cam_tf.translation.lerp(target, t);
}
