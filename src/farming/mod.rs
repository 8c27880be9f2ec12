//! Farming domain: the tile grid, crop growth, tool interactions and the
//! farm's drawing.
//!
//! Other domains talk to it through `TileGrid`'s public API and the events
//! in `crate::shared`.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::shared::*;

pub mod action;
pub mod autotile;
pub mod collision;
pub mod grid;
pub mod random_tick;
pub mod render;
pub mod structure;
pub mod tile;

pub use action::{Action, ActionError, ActionKind, ActionOutcome, Feedback};
pub use grid::{TickReport, TileGrid};
pub use structure::{CropKind, SoilStructure, Structure};
pub use tile::{Tile, TileType};

/// Randomness used when executing actions (harvest yields).
#[derive(Resource, Debug, Clone)]
pub struct FarmRng(pub StdRng);

impl FarmRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<render::FarmingAtlases>()
            .init_resource::<render::DrawList>()
            .init_resource::<render::FarmSpritePool>()
            .init_resource::<render::EffectRng>()
            .add_systems(Startup, render::init_autotile_table)
            // ------------------------------------------------------------------
            // Asset loading, Loading → Playing
            // ------------------------------------------------------------------
            .add_systems(OnEnter(GameState::Loading), render::load_farming_atlases)
            .add_systems(
                Update,
                render::finish_loading_atlases.run_if(in_state(GameState::Loading)),
            )
            // ------------------------------------------------------------------
            // Simulation: growth, then the player's interaction
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (tick_grid, handle_interaction_input)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                render::update_crop_particles.run_if(in_state(GameState::Playing)),
            )
            // ------------------------------------------------------------------
            // Drawing, after all state changes
            // ------------------------------------------------------------------
            .add_systems(
                PostUpdate,
                (render::draw_farm, render::sync_farm_sprites)
                    .chain()
                    .run_if(in_state(GameState::Playing))
                    .run_if(resource_exists::<autotile::AutotileTable>),
            );
    }
}

/// Advance random ticks by this frame's (clamped) delta.
pub fn tick_grid(time: Res<Time>, mut grid: ResMut<TileGrid>) {
    let delta = time.delta_secs().min(MAX_FRAME_DELTA);
    let report = grid.update(delta);
    if report.advanced > 0 {
        debug!(
            "[Farming] Random tick: {} pass(es), {} tile(s) ticked, {} crop(s) grew",
            report.passes, report.ticked, report.advanced
        );
    }
}

/// While the left mouse button is held, apply the held item to the
/// selected cell. Running out of a stack blocks further use until the
/// button is released, so the next slot isn't used by accident.
#[allow(clippy::too_many_arguments)]
pub fn handle_interaction_input(
    mouse: Res<ButtonInput<MouseButton>>,
    selected: Res<SelectedCell>,
    mut grid: ResMut<TileGrid>,
    mut inventory: ResMut<Inventory>,
    mut rng: ResMut<FarmRng>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
    mut hint_events: EventWriter<HintEvent>,
) {
    if !mouse.pressed(MouseButton::Left) {
        inventory.wait_for_mouseup = false;
        return;
    }
    if inventory.wait_for_mouseup {
        return;
    }
    let (Some((x, y)), Some(held)) = (selected.0, inventory.held_item()) else {
        return;
    };
    let Some(action) = grid.get_interaction(x, y, held, &inventory) else {
        return;
    };

    let mut feedback = Feedback::default();
    match action.execute(&mut grid, &mut inventory, &mut rng.0, &mut feedback) {
        Ok(ActionOutcome::Done) => {}
        Ok(ActionOutcome::StackExhausted) => {
            inventory.wait_for_mouseup = true;
            inventory.clamp_selection();
            info!("[Farming] {} used up", held.name());
        }
        Err(err) => {
            warn!("[Farming] Dropped interaction: {}", err);
        }
    }
    feedback.drain_into(&mut sfx_events, &mut hint_events);
}
