//! Terrain type and the per-tile interaction rules.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;
use super::action::{ActionKind, ActionOutcome, Feedback};
use super::structure::{SoilStructure, Structure};

/// Terrain layers, in draw order. Later variants are drawn on top of
/// earlier ones, so the ordinal doubles as the layer index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileType {
    Water,
    Soil,
    Grass,
    TallGrass,
}

impl TileType {
    pub const LAYERS: [TileType; 4] = [TileType::Water, TileType::Soil, TileType::Grass, TileType::TallGrass];

    pub fn layer(self) -> usize {
        self as usize
    }

    pub fn is_grass(self) -> bool {
        matches!(self, TileType::Grass | TileType::TallGrass)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    pub structure: Option<Structure>,
}

impl Tile {
    pub fn new(tile_type: TileType) -> Self {
        Self {
            tile_type,
            structure: None,
        }
    }

    /// What using `held` here would do. A structure, when present, decides
    /// alone; terrain rules only apply to bare tiles.
    pub fn resolve_interaction(&self, held: ItemKind, inventory: &Inventory) -> Option<ActionKind> {
        if let Some(structure) = &self.structure {
            return structure.resolve_interaction(held, inventory);
        }

        match (self.tile_type, held) {
            (TileType::Soil, ItemKind::Hoe) => Some(ActionKind::Till),
            (TileType::Grass | TileType::TallGrass, ItemKind::Shovel) => Some(ActionKind::Shovel),
            (TileType::Water, ItemKind::WateringCanEmpty) => Some(ActionKind::FillWateringCan),
            _ => None,
        }
    }

    pub fn random_tick(&mut self) -> bool {
        match &mut self.structure {
            Some(structure) => structure.random_tick(),
            None => false,
        }
    }

    /// Water blocks movement; everything else is walkable, structures included.
    pub fn is_collidable(&self) -> bool {
        self.tile_type == TileType::Water
    }

    pub fn till(&mut self, tile_center: Vec2, feedback: &mut Feedback) -> ActionOutcome {
        self.structure = Some(Structure::Soil(SoilStructure::new()));
        feedback.sound(SoundKind::TillSoil);
        feedback.hint("Tilled soil!", tile_center, Color::WHITE);
        ActionOutcome::Done
    }

    pub fn shovel(&mut self, tile_center: Vec2, feedback: &mut Feedback) -> ActionOutcome {
        self.tile_type = TileType::Soil;
        feedback.sound(SoundKind::TillSoil);
        feedback.hint("Shoveled ground!", tile_center, Color::WHITE);
        ActionOutcome::Done
    }

    pub fn fill_watering_can(
        &mut self,
        inventory: &mut Inventory,
        tile_center: Vec2,
        feedback: &mut Feedback,
    ) -> ActionOutcome {
        inventory.set(ItemKind::WateringCanEmpty, 0);
        inventory.set(ItemKind::WateringCanFull, WATERING_CAN_CAPACITY);
        feedback.sound(SoundKind::Plant);
        feedback.hint("Filled can!", tile_center, Color::srgb(0.53, 0.81, 0.92));
        ActionOutcome::StackExhausted
    }
}
