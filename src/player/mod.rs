mod camera;
mod movement;
mod spawn;
mod targeting;
mod tools;

use bevy::prelude::*;
use crate::farming;
use crate::shared::*;

pub use movement::{facing_for, handle_crazed_mode, player_movement, step_displacement};
pub use targeting::reachable_cell;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerSprites>();
        app.init_resource::<SelectedCell>();

        app.add_systems(OnEnter(GameState::Loading), spawn::load_player_sprites);
        app.add_systems(OnEnter(GameState::Playing), spawn::spawn_player);

        // Movement and collision come before the grid ticks; the selected
        // cell is refreshed before the interaction reads it.
        app.add_systems(
            Update,
            (
                movement::handle_crazed_mode.before(movement::player_movement),
                tools::cycle_held_item,
                movement::player_movement.before(farming::tick_grid),
                targeting::update_selected_cell
                    .after(movement::player_movement)
                    .before(farming::handle_interaction_input),
                movement::sync_player_transform.after(movement::player_movement),
                animate_player_sprite.after(movement::player_movement),
                camera::camera_follow_player.after(movement::sync_player_transform),
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Player sheet handles, loaded once.
#[derive(Resource, Default)]
pub struct PlayerSprites {
    pub loaded: bool,
    pub normal: Handle<Image>,
    pub crazed: Handle<Image>,
    pub layout: Handle<TextureAtlasLayout>,
}

#[derive(Component, Debug, Default)]
pub struct WalkAnimation {
    pub timer: f32,
    pub frame: usize,
}

impl WalkAnimation {
    /// Seconds per frame; crazed walking animates faster.
    pub fn frame_time(crazed: bool) -> f32 {
        if crazed {
            0.08
        } else {
            0.15
        }
    }

    pub fn advance(&mut self, delta: f32, crazed: bool) {
        self.timer += delta;
        let step = Self::frame_time(crazed);
        while self.timer >= step {
            self.timer -= step;
            self.frame = (self.frame + 1) % spawn::WALK_FRAMES as usize;
        }
    }
}

fn animate_player_sprite(
    time: Res<Time>,
    sprites: Res<PlayerSprites>,
    mut query: Query<(&PlayerMovement, &mut WalkAnimation, &mut Sprite), With<Player>>,
) {
    let delta = time.delta_secs().min(MAX_FRAME_DELTA);
    for (movement, mut anim, mut sprite) in query.iter_mut() {
        if movement.is_moving {
            anim.advance(delta, movement.crazed);
        }
        let image = if movement.crazed { &sprites.crazed } else { &sprites.normal };
        if sprite.image != *image {
            sprite.image = image.clone();
        }
        if let Some(atlas) = sprite.texture_atlas.as_mut() {
            atlas.index = anim.frame;
        }
    }
}
