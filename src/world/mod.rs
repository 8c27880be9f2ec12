//! World domain: builds the farm grid at startup.

use bevy::prelude::*;

use crate::config::SimulationConfig;
use crate::shared::*;

pub mod farm;

pub use farm::{build_farm, player_spawn_position, PLAYER_SPAWN_TILE};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), build_world);
    }
}

/// Insert the `TileGrid` and the action and effect RNGs, seeded from the
/// config.
pub fn build_world(mut commands: Commands, config: Res<SimulationConfig>) {
    let mut rng = config.world_rng();
    let grid = build_farm(
        MAP_WIDTH,
        MAP_HEIGHT,
        config.scheduler(),
        config.tall_grass_ratio,
        &mut rng,
    );
    info!(
        "[World] Built {}x{} farm{}",
        grid.width(),
        grid.height(),
        match config.rng_seed {
            Some(seed) => format!(" (seed {})", seed),
            None => String::new(),
        }
    );
    commands.insert_resource(grid);
    commands.insert_resource(config.farm_rng());
    commands.insert_resource(config.effect_rng());
}
