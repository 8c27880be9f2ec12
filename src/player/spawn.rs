use bevy::prelude::*;

use crate::config::SimulationConfig;
use crate::shared::*;
use crate::world::player_spawn_position;
use super::PlayerSprites;

/// Frames per walk cycle in the player sheets.
pub const WALK_FRAMES: u32 = 4;
const FRAME_SIZE: u32 = 16;
/// Sheets are drawn at 4× their pixel size.
const SPRITE_SCALE: f32 = 4.0;

pub fn load_player_sprites(
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut sprites: ResMut<PlayerSprites>,
) {
    if sprites.loaded {
        return;
    }
    sprites.normal = asset_server.load("sprites/player_normal.png");
    sprites.crazed = asset_server.load("sprites/player_crazed.png");
    sprites.layout = layouts.add(TextureAtlasLayout::from_grid(
        UVec2::splat(FRAME_SIZE),
        WALK_FRAMES,
        1,
        None,
        None,
    ));
    sprites.loaded = true;
}

/// Runs on `OnEnter(GameState::Playing)`.
pub fn spawn_player(
    mut commands: Commands,
    existing: Query<Entity, With<Player>>,
    config: Res<SimulationConfig>,
    sprites: Res<PlayerSprites>,
) {
    // Guard: don't double-spawn if returning to Playing state.
    if !existing.is_empty() {
        return;
    }

    let position = player_spawn_position();
    let movement = PlayerMovement {
        speed: config.player_speed,
        crazed_speed_multiplier: config.crazed_speed_multiplier,
        ..default()
    };

    let mut sprite = Sprite::from_atlas_image(
        sprites.normal.clone(),
        TextureAtlas {
            layout: sprites.layout.clone(),
            index: 0,
        },
    );
    sprite.custom_size = Some(Vec2::splat(FRAME_SIZE as f32 * SPRITE_SCALE));

    commands.spawn((
        Player,
        LogicalPosition(position),
        movement,
        super::WalkAnimation::default(),
        sprite,
        // Z = 10 so the player draws above terrain and crops.
        Transform::from_translation(world_to_translation(position, 10.0)),
    ));
    info!("[Player] Spawned at {:?}", position);
}
