//! Shared components, resources, events, and states for 22 Seconds.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly, except through the
//! farming core's public API (`TileGrid`, `Action`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

/// Menus, cutscenes and the shop live outside this crate; they drive the
/// state machine from the outside. The simulation only runs in `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// ITEMS & INVENTORY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Hoe,
    Shovel,
    WateringCanFull,
    WateringCanEmpty,
    CarrotSeeds,
    WheatSeeds,
    OnionSeeds,
    Carrot,
    Wheat,
    Onion,
}

impl ItemKind {
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Hoe => "Hoe",
            ItemKind::Shovel => "Shovel",
            ItemKind::WateringCanFull => "Watering Can",
            ItemKind::WateringCanEmpty => "Empty Watering Can",
            ItemKind::CarrotSeeds => "Carrot Seeds",
            ItemKind::WheatSeeds => "Wheat Seeds",
            ItemKind::OnionSeeds => "Onion Seeds",
            ItemKind::Carrot => "Carrot",
            ItemKind::Wheat => "Wheat",
            ItemKind::Onion => "Onion",
        }
    }

    /// Tools and seeds can be held and used on tiles; produce cannot.
    pub fn is_interactable(self) -> bool {
        !matches!(self, ItemKind::Carrot | ItemKind::Wheat | ItemKind::Onion)
    }
}

/// Item counts keyed by kind, plus the currently held (selected) slot.
///
/// Slots are the interactable items with a non-zero count, in `ItemKind`
/// order, so the slot list shrinks when a stack runs out.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub counts: BTreeMap<ItemKind, u32>,
    pub selected_slot: usize,
    /// Set after running out of an item so the player doesn't
    /// accidentally start using the next item available.
    pub wait_for_mouseup: bool,
}

impl Default for Inventory {
    fn default() -> Self {
        let mut counts = BTreeMap::new();
        counts.insert(ItemKind::Hoe, 1);
        counts.insert(ItemKind::Shovel, 1);
        counts.insert(ItemKind::WateringCanFull, WATERING_CAN_CAPACITY);
        counts.insert(ItemKind::CarrotSeeds, 30);
        Self {
            counts,
            selected_slot: 0,
            wait_for_mouseup: false,
        }
    }
}

impl Inventory {
    /// An inventory with nothing in it.
    pub fn empty() -> Self {
        Self {
            counts: BTreeMap::new(),
            selected_slot: 0,
            wait_for_mouseup: false,
        }
    }

    pub fn count(&self, item: ItemKind) -> u32 {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    pub fn has(&self, item: ItemKind, quantity: u32) -> bool {
        self.count(item) >= quantity
    }

    pub fn add(&mut self, item: ItemKind, quantity: u32) {
        let count = self.counts.entry(item).or_insert(0);
        *count = count.saturating_add(quantity);
    }

    /// Remove up to `quantity`. Returns how many were actually removed;
    /// counts never go below zero.
    pub fn remove(&mut self, item: ItemKind, quantity: u32) -> u32 {
        let current = self.count(item);
        let removed = current.min(quantity);
        self.counts.insert(item, current - removed);
        removed
    }

    pub fn set(&mut self, item: ItemKind, quantity: u32) {
        self.counts.insert(item, quantity);
    }

    pub fn interactable_items(&self) -> Vec<(ItemKind, u32)> {
        self.counts
            .iter()
            .filter(|(item, &count)| count > 0 && item.is_interactable())
            .map(|(&item, &count)| (item, count))
            .collect()
    }

    /// The item the actor is currently holding, if any slot is available.
    pub fn held_item(&self) -> Option<ItemKind> {
        self.interactable_items()
            .get(self.selected_slot)
            .map(|(item, _)| *item)
    }

    pub fn select_slot(&mut self, slot: usize) {
        let available = self.interactable_items().len();
        if slot < available {
            self.selected_slot = slot;
        }
    }

    /// Move the selection by `delta` slots, wrapping around both ends.
    pub fn cycle_selection(&mut self, delta: i32) {
        let available = self.interactable_items().len() as i32;
        if available == 0 {
            self.selected_slot = 0;
            return;
        }
        let next = (self.selected_slot as i32 + delta).rem_euclid(available);
        self.selected_slot = next as usize;
    }

    /// Keep the selection inside the slot list after a stack runs out.
    pub fn clamp_selection(&mut self) {
        let available = self.interactable_items().len();
        if self.selected_slot >= available {
            self.selected_slot = available.saturating_sub(1);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER (actor)
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Default)]
pub struct Player;

/// World position in pixels. x grows right, y grows down; tile (0, 0)
/// covers `[0, TILE_SIZE) × [0, TILE_SIZE)`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct LogicalPosition(pub Vec2);

#[derive(Component, Debug, Clone)]
pub struct PlayerMovement {
    pub speed: f32,  // pixels per second
    pub radius: f32, // collision half-extent in pixels
    pub crazed: bool,
    pub crazed_speed_multiplier: f32,
    pub crazed_timer: f32,
    pub slowdown_time: f32,
    pub is_moving: bool,
    /// Sprite rotation in radians; 0 faces down the screen.
    pub facing: f32,
}

impl Default for PlayerMovement {
    fn default() -> Self {
        Self {
            speed: 300.0,
            radius: 16.0,
            crazed: false,
            crazed_speed_multiplier: 3.0,
            crazed_timer: 0.0,
            slowdown_time: 0.0,
            is_moving: false,
            facing: 0.0,
        }
    }
}

/// The grid cell under the cursor, when it is within reach of the player.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectedCell(pub Option<(i32, i32)>);

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    Plant,
    HarvestPlant,
    TillSoil,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlaySfxEvent {
    pub sound: SoundKind,
}

/// Transient floating text at a world position (y-down pixels).
#[derive(Event, Debug, Clone, PartialEq)]
pub struct HintEvent {
    pub text: String,
    pub position: Vec2,
    pub color: Color,
}

/// Sent by the outer game-state layer when the actor enters or leaves
/// crazed mode.
#[derive(Event, Debug, Clone, Copy)]
pub struct CrazedModeEvent {
    pub crazed: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const GAME_NAME: &str = "22 Seconds";

pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

pub const TILE_SIZE: f32 = 80.0;
pub const TARGET_RADIUS: f32 = TILE_SIZE * 2.0;

pub const MAP_WIDTH: usize = 60;
pub const MAP_HEIGHT: usize = 35;
pub const FARMABLE_MAP_START: (usize, usize) = (1, 1);
pub const FARMABLE_MAP_END: (usize, usize) = (34, 34);

/// Milliseconds of accumulated play time per random-tick pass.
pub const MAP_UPDATE_RATE_MS: f32 = 600.0;
pub const RANDOM_TICK_PER_UPDATE_RATIO: f64 = 0.01;

pub const WATERING_CAN_CAPACITY: u32 = 5;

/// Average particles a mature crop gives off per second.
pub const PARTICLES_PER_TILE_SECOND: f32 = 5.0;

/// Frame deltas are clamped so a stalled window doesn't teleport the
/// player through walls or burst crop growth.
pub const MAX_FRAME_DELTA: f32 = 1.0 / 30.0;

pub const SLOWDOWN_SECONDS: f32 = 0.75;

// ═══════════════════════════════════════════════════════════════════════
// COORDINATE HELPERS
// ═══════════════════════════════════════════════════════════════════════

/// Convert a y-down world position to a Bevy (y-up) translation.
pub fn world_to_translation(pos: Vec2, z: f32) -> Vec3 {
    Vec3::new(pos.x, -pos.y, z)
}

/// The grid cell containing a world position.
pub fn world_to_cell(pos: Vec2) -> (i32, i32) {
    (
        (pos.x / TILE_SIZE).floor() as i32,
        (pos.y / TILE_SIZE).floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_saturates_at_max_count() {
        let mut inventory = Inventory::empty();
        inventory.add(ItemKind::Wheat, u32::MAX - 1);
        inventory.add(ItemKind::Wheat, 5);
        assert_eq!(inventory.count(ItemKind::Wheat), u32::MAX);
    }

    #[test]
    fn test_remove_never_underflows() {
        let mut inventory = Inventory::empty();
        inventory.add(ItemKind::CarrotSeeds, 2);
        assert_eq!(inventory.remove(ItemKind::CarrotSeeds, 5), 2);
        assert_eq!(inventory.count(ItemKind::CarrotSeeds), 0);
        assert_eq!(inventory.remove(ItemKind::CarrotSeeds, 1), 0);
    }

    #[test]
    fn test_held_item_skips_produce_and_empty_stacks() {
        let mut inventory = Inventory::empty();
        inventory.add(ItemKind::Carrot, 10);
        inventory.set(ItemKind::Hoe, 0);
        inventory.add(ItemKind::OnionSeeds, 1);
        assert_eq!(inventory.held_item(), Some(ItemKind::OnionSeeds));
    }

    #[test]
    fn test_cycle_selection_wraps() {
        let mut inventory = Inventory::default();
        let slots = inventory.interactable_items().len();
        assert!(slots >= 2);
        inventory.cycle_selection(-1);
        assert_eq!(inventory.selected_slot, slots - 1);
        inventory.cycle_selection(1);
        assert_eq!(inventory.selected_slot, 0);
    }

    #[test]
    fn test_clamp_selection_after_stack_runs_out() {
        let mut inventory = Inventory::default();
        let last = inventory.interactable_items().len() - 1;
        inventory.select_slot(last);
        let held = inventory.held_item().unwrap();
        inventory.set(held, 0);
        inventory.clamp_selection();
        assert_eq!(inventory.selected_slot, last - 1);
    }

    #[test]
    fn test_world_to_cell_floors_negative_positions() {
        assert_eq!(world_to_cell(Vec2::new(-1.0, 0.0)), (-1, 0));
        assert_eq!(world_to_cell(Vec2::new(TILE_SIZE * 2.5, TILE_SIZE)), (2, 1));
    }
}
