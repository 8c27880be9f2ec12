//! UI domain: floating hint text and sound cues.

use bevy::prelude::*;
use crate::shared::*;

pub mod audio;
pub mod hints;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (hints::spawn_hints, hints::update_hints, audio::handle_play_sfx)
                .run_if(in_state(GameState::Playing)),
        );
    }
}
