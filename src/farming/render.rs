//! Drawing the farm.
//!
//! The grid doesn't know about Bevy entities. It draws into a `DrawSurface`;
//! in the game that surface is a `DrawList` that a PostUpdate system turns
//! into a pool of sprites each frame.

use bevy::math::Isometry2d;
use bevy::prelude::*;
use bevy::sprite::Anchor;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::HashMap;

use crate::shared::*;
use super::autotile::{sheet_layout, AutotileTable, SetupError};
use super::structure::{CropKind, MAX_GROWTH_STAGE};
use super::tile::TileType;
use super::grid::TileGrid;

/// Anything the grid can draw into. Positions are screen-space top-left
/// corners in y-down pixels.
pub trait DrawSurface {
    fn viewport_size(&self) -> Vec2;
    /// One dual-grid cell of `layer`, already masked.
    fn draw_terrain(&mut self, layer: TileType, mask: u8, screen: Vec2);
    fn draw_soil(&mut self, wet: bool, screen: Vec2);
    fn draw_crop(&mut self, kind: CropKind, stage: u8, screen: Vec2);
    fn draw_outline(&mut self, screen: Vec2, size: f32, color: Color);
    /// A single short-lived particle centred on `screen`.
    fn draw_particle(&mut self, screen: Vec2, color: Color);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Terrain { layer: TileType, mask: u8, screen: Vec2 },
    Soil { wet: bool, screen: Vec2 },
    Crop { kind: CropKind, stage: u8, screen: Vec2 },
    Outline { screen: Vec2, size: f32, color: Color },
    Particle { screen: Vec2, color: Color },
}

/// Recorded draw calls, in order.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub viewport: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawSurface for DrawList {
    fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    fn draw_terrain(&mut self, layer: TileType, mask: u8, screen: Vec2) {
        self.commands.push(DrawCommand::Terrain { layer, mask, screen });
    }

    fn draw_soil(&mut self, wet: bool, screen: Vec2) {
        self.commands.push(DrawCommand::Soil { wet, screen });
    }

    fn draw_crop(&mut self, kind: CropKind, stage: u8, screen: Vec2) {
        self.commands.push(DrawCommand::Crop { kind, stage, screen });
    }

    fn draw_outline(&mut self, screen: Vec2, size: f32, color: Color) {
        self.commands.push(DrawCommand::Outline { screen, size, color });
    }

    fn draw_particle(&mut self, screen: Vec2, color: Color) {
        self.commands.push(DrawCommand::Particle { screen, color });
    }
}

/// Frame time and randomness for effects that fire while drawing.
pub struct FrameEffects<'a> {
    delta_secs: f32,
    rng: &'a mut dyn RngCore,
}

impl<'a> FrameEffects<'a> {
    pub fn new(delta_secs: f32, rng: &'a mut dyn RngCore) -> Self {
        Self { delta_secs, rng }
    }

    /// Whether an effect that averages `per_second` firings happens this
    /// frame.
    pub fn chance(&mut self, per_second: f32) -> bool {
        let p = f64::from(self.delta_secs * per_second);
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        self.rng.gen_bool(p.min(1.0))
    }

    /// A uniform point in the square of half-width `half` around `center`.
    pub fn point_in_square(&mut self, center: Vec2, half: f32) -> Vec2 {
        center + Vec2::new(self.rng.gen_range(-half..=half), self.rng.gen_range(-half..=half))
    }
}

/// Randomness for draw-time effects. Kept apart from `FarmRng` so effects
/// never change harvest rolls.
#[derive(Resource, Debug, Clone)]
pub struct EffectRng(pub StdRng);

impl Default for EffectRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assets
// ─────────────────────────────────────────────────────────────────────────────

pub fn terrain_sheet_path(layer: TileType) -> &'static str {
    match layer {
        TileType::Water => "tiles/water_tilemap.png",
        TileType::Soil => "tiles/dirt_tilemap.png",
        TileType::Grass => "tiles/grass_tilemap.png",
        TileType::TallGrass => "tiles/tall_grass_tilemap.png",
    }
}

pub fn crop_sprite_path(kind: CropKind, stage: u8) -> String {
    format!("tiles/planted_{}_{}.png", kind.sprite_stem(), stage)
}

/// Texture handles for everything the farm draws. Terrain layouts are only
/// known once the sheets have loaded and been measured.
#[derive(Resource, Debug, Default)]
pub struct FarmingAtlases {
    pub terrain: HashMap<TileType, Handle<Image>>,
    pub terrain_layouts: HashMap<TileType, Handle<TextureAtlasLayout>>,
    pub soil_dry: Handle<Image>,
    pub soil_wet: Handle<Image>,
    pub crops: HashMap<(CropKind, u8), Handle<Image>>,
}

impl FarmingAtlases {
    pub fn is_ready(&self) -> bool {
        self.terrain_layouts.len() == TileType::LAYERS.len()
    }
}

/// Validate the autotile table once at startup. A bad table can't draw
/// anything sensible, so it ends the app.
pub fn init_autotile_table(mut commands: Commands, mut exit: EventWriter<AppExit>) {
    match AutotileTable::standard() {
        Ok(table) => {
            commands.insert_resource(table);
        }
        Err(err) => {
            error!("[Farming] Invalid autotile table: {}", err);
            exit.send(AppExit::error());
        }
    }
}

pub fn load_farming_atlases(asset_server: Res<AssetServer>, mut atlases: ResMut<FarmingAtlases>) {
    for layer in TileType::LAYERS {
        atlases
            .terrain
            .insert(layer, asset_server.load(terrain_sheet_path(layer)));
    }
    atlases.soil_dry = asset_server.load("tiles/farmland.png");
    atlases.soil_wet = asset_server.load("tiles/wet_farmland.png");
    for kind in CropKind::ALL {
        for stage in 0..=MAX_GROWTH_STAGE {
            atlases
                .crops
                .insert((kind, stage), asset_server.load(crop_sprite_path(kind, stage)));
        }
    }
    info!("[Farming] Loading terrain sheets and crop sprites");
}

/// Once every terrain sheet has loaded, slice it into its 4×4 layout and
/// move on to `Playing`. Sheets with the wrong shape are fatal.
pub fn finish_loading_atlases(
    mut atlases: ResMut<FarmingAtlases>,
    images: Res<Assets<Image>>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    asset_server: Res<AssetServer>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: EventWriter<AppExit>,
) {
    let mut pending = Vec::new();
    for layer in TileType::LAYERS {
        if atlases.terrain_layouts.contains_key(&layer) {
            continue;
        }
        let Some(handle) = atlases.terrain.get(&layer).cloned() else {
            continue;
        };
        if let Some(bevy::asset::LoadState::Failed(err)) = asset_server.get_load_state(&handle) {
            error!("[Farming] Could not load {}: {}", terrain_sheet_path(layer), err);
            exit.send(AppExit::error());
            return;
        }
        let Some(image) = images.get(&handle) else {
            continue;
        };
        pending.push((layer, image.width(), image.height()));
    }

    for (layer, width, height) in pending {
        match sheet_layout(width, height) {
            Ok(layout) => {
                atlases.terrain_layouts.insert(layer, layouts.add(layout));
            }
            Err(err) => {
                report_setup_error(layer, &err);
                exit.send(AppExit::error());
                return;
            }
        }
    }

    if atlases.is_ready() {
        info!("[Farming] Terrain sheets ready");
        next_state.set(GameState::Playing);
    }
}

fn report_setup_error(layer: TileType, err: &SetupError) {
    error!("[Farming] {}: {}", terrain_sheet_path(layer), err);
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-frame drawing
// ─────────────────────────────────────────────────────────────────────────────

/// World position (y-down) of the screen's top-left corner.
pub fn camera_offset(camera_translation: Vec3, viewport: Vec2) -> Vec2 {
    Vec2::new(camera_translation.x, -camera_translation.y) - viewport / 2.0
}

/// Record this frame's draw calls. The outline is white when the held item
/// can do something on the selected cell, grey otherwise.
#[allow(clippy::too_many_arguments)]
pub fn draw_farm(
    time: Res<Time>,
    grid: Res<TileGrid>,
    inventory: Res<Inventory>,
    selected: Res<SelectedCell>,
    cameras: Query<&Transform, With<Camera2d>>,
    windows: Query<&Window>,
    mut list: ResMut<DrawList>,
    mut effect_rng: ResMut<EffectRng>,
) {
    let viewport = windows
        .get_single()
        .map(|w| Vec2::new(w.width(), w.height()))
        .unwrap_or(Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let Ok(camera) = cameras.get_single() else {
        return;
    };

    let outline_color = match (selected.0, inventory.held_item()) {
        (Some((x, y)), Some(held)) if grid.get_interaction(x, y, held, &inventory).is_some() => {
            Color::WHITE
        }
        _ => Color::srgb(0.5, 0.5, 0.5),
    };

    list.viewport = viewport;
    list.clear();
    let offset = camera_offset(camera.translation, viewport);
    let delta = time.delta_secs().min(MAX_FRAME_DELTA);
    let mut effects = FrameEffects::new(delta, &mut effect_rng.0);
    grid.draw(&mut *list, offset, selected.0, outline_color, &mut effects);
}

/// A pooled sprite entity reused across frames.
#[derive(Component, Debug)]
pub struct FarmSprite;

#[derive(Resource, Debug, Default)]
pub struct FarmSpritePool {
    pub entities: Vec<Entity>,
}

const TERRAIN_Z: f32 = 0.0;
const STRUCTURE_Z: f32 = 5.0;

/// Turn the draw list into sprites. Sprites are reused in draw order and
/// the spare ones hidden; outlines go through gizmos.
#[allow(clippy::too_many_arguments)]
pub fn sync_farm_sprites(
    mut commands: Commands,
    list: Res<DrawList>,
    atlases: Res<FarmingAtlases>,
    table: Res<AutotileTable>,
    cameras: Query<&Transform, (With<Camera2d>, Without<FarmSprite>)>,
    mut pool: ResMut<FarmSpritePool>,
    mut sprites: Query<(&mut Sprite, &mut Transform, &mut Visibility), With<FarmSprite>>,
    mut gizmos: Gizmos,
) {
    let Ok(camera) = cameras.get_single() else {
        return;
    };
    let offset = camera_offset(camera.translation, list.viewport);

    let mut used = 0;
    for (order, command) in list.commands.iter().enumerate() {
        // Later commands draw over earlier ones.
        let z_step = order as f32 * 1e-4;
        let (sprite, screen, z) = match *command {
            DrawCommand::Outline { screen, size, color } => {
                let center = screen + offset + Vec2::splat(size / 2.0);
                gizmos.rect_2d(
                    Isometry2d::from_translation(world_to_translation(center, 0.0).truncate()),
                    Vec2::splat(size),
                    color,
                );
                continue;
            }
            DrawCommand::Particle { screen, color } => {
                spawn_crop_particle(&mut commands, screen + offset, color);
                continue;
            }
            DrawCommand::Terrain { layer, mask, screen } => {
                let (Some(image), Some(layout)) =
                    (atlases.terrain.get(&layer), atlases.terrain_layouts.get(&layer))
                else {
                    continue;
                };
                let mut sprite = Sprite::from_atlas_image(
                    image.clone(),
                    TextureAtlas {
                        layout: layout.clone(),
                        index: table.cell(mask).atlas_index(),
                    },
                );
                sprite.custom_size = Some(Vec2::splat(TILE_SIZE));
                (sprite, screen, TERRAIN_Z + z_step)
            }
            DrawCommand::Soil { wet, screen } => {
                let image = if wet { &atlases.soil_wet } else { &atlases.soil_dry };
                let mut sprite = Sprite::from_image(image.clone());
                sprite.custom_size = Some(Vec2::splat(TILE_SIZE));
                (sprite, screen, STRUCTURE_Z + z_step)
            }
            DrawCommand::Crop { kind, stage, screen } => {
                let Some(image) = atlases.crops.get(&(kind, stage)) else {
                    continue;
                };
                let mut sprite = Sprite::from_image(image.clone());
                sprite.custom_size = Some(Vec2::splat(TILE_SIZE));
                (sprite, screen, STRUCTURE_Z + z_step)
            }
        };
        let mut sprite = sprite;
        sprite.anchor = Anchor::TopLeft;
        let transform = Transform::from_translation(world_to_translation(screen + offset, z));

        if let Some(&entity) = pool.entities.get(used) {
            if let Ok((mut existing, mut existing_transform, mut visibility)) = sprites.get_mut(entity) {
                *existing = sprite;
                *existing_transform = transform;
                *visibility = Visibility::Inherited;
            }
        } else {
            let entity = commands.spawn((sprite, transform, FarmSprite)).id();
            pool.entities.push(entity);
        }
        used += 1;
    }

    for &entity in pool.entities.iter().skip(used) {
        if let Ok((_, _, mut visibility)) = sprites.get_mut(entity) {
            *visibility = Visibility::Hidden;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ripe-crop particles
// ─────────────────────────────────────────────────────────────────────────────

const PARTICLE_LIFETIME_SECS: f32 = 0.6;
const PARTICLE_SIZE: f32 = 6.0;
/// Upward drift in pixels per second.
const PARTICLE_RISE_SPEED: f32 = 40.0;
/// Above crops, below the player.
const PARTICLE_Z: f32 = 8.0;

#[derive(Component, Debug)]
pub struct CropParticle {
    pub lifetime: Timer,
}

fn spawn_crop_particle(commands: &mut Commands, world: Vec2, color: Color) {
    commands.spawn((
        CropParticle {
            lifetime: Timer::from_seconds(PARTICLE_LIFETIME_SECS, TimerMode::Once),
        },
        Sprite::from_color(color, Vec2::splat(PARTICLE_SIZE)),
        Transform::from_translation(world_to_translation(world, PARTICLE_Z)),
    ));
}

/// Linear fade over the particle's whole life.
pub fn particle_alpha(remaining: f32) -> f32 {
    (remaining / PARTICLE_LIFETIME_SECS).clamp(0.0, 1.0)
}

pub fn update_crop_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut CropParticle, &mut Sprite)>,
) {
    for (entity, mut transform, mut particle, mut sprite) in query.iter_mut() {
        particle.lifetime.tick(time.delta());
        transform.translation.y += PARTICLE_RISE_SPEED * time.delta_secs();
        sprite.color = sprite.color.with_alpha(particle_alpha(particle.lifetime.remaining_secs()));

        if particle.lifetime.finished() {
            commands.entity(entity).despawn();
        }
    }
}
