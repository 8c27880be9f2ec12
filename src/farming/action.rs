//! Resolved interactions, executed later.
//!
//! Resolving an interaction never touches the grid. The caller decides when
//! (and whether) to execute it, e.g. only while the mouse button is held.

use bevy::prelude::*;
use rand::Rng;
use thiserror::Error;

use crate::shared::*;
use super::grid::TileGrid;
use super::structure::{CropKind, Structure};
use super::tile::TileType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Attach empty tilled soil to a bare soil tile.
    Till,
    /// Dig grass or tall grass down to soil.
    Shovel,
    FillWateringCan,
    Plant(CropKind),
    Harvest,
    Water,
}

/// A resolved, not-yet-executed interaction on one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub cell: (i32, i32),
    pub tile_center: Vec2,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    /// The held item's stack ran out; the caller should deselect the slot.
    StackExhausted,
}

impl ActionOutcome {
    pub(crate) fn consumed(inventory: &Inventory, item: ItemKind) -> Self {
        if inventory.count(item) == 0 {
            ActionOutcome::StackExhausted
        } else {
            ActionOutcome::Done
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("tile ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
    #[error("tile ({x}, {y}) changed since the action was resolved")]
    Stale { x: i32, y: i32 },
}

/// A floating hint produced by an action, before it becomes a `HintEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hint {
    pub text: String,
    pub position: Vec2,
    pub color: Color,
}

/// Side effects gathered while executing actions. The core never talks to
/// audio or UI directly; the plugin drains this into events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feedback {
    pub sounds: Vec<SoundKind>,
    pub hints: Vec<Hint>,
}

impl Feedback {
    pub fn sound(&mut self, sound: SoundKind) {
        self.sounds.push(sound);
    }

    pub fn hint(&mut self, text: impl Into<String>, position: Vec2, color: Color) {
        self.hints.push(Hint {
            text: text.into(),
            position,
            color,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty() && self.hints.is_empty()
    }

    pub fn drain_into(
        &mut self,
        sfx_events: &mut EventWriter<PlaySfxEvent>,
        hint_events: &mut EventWriter<HintEvent>,
    ) {
        for sound in self.sounds.drain(..) {
            sfx_events.send(PlaySfxEvent { sound });
        }
        for hint in self.hints.drain(..) {
            hint_events.send(HintEvent {
                text: hint.text,
                position: hint.position,
                color: hint.color,
            });
        }
    }
}

impl Action {
    /// Apply the action. Preconditions are re-checked against the tile so a
    /// stale action is rejected without changing anything.
    pub fn execute<R: Rng + ?Sized>(
        self,
        grid: &mut TileGrid,
        inventory: &mut Inventory,
        rng: &mut R,
        feedback: &mut Feedback,
    ) -> Result<ActionOutcome, ActionError> {
        let (x, y) = self.cell;
        let tile = grid
            .tile_mut(x, y)
            .ok_or(ActionError::OutOfBounds { x, y })?;
        let stale = ActionError::Stale { x, y };
        let center = self.tile_center;

        match self.kind {
            ActionKind::Till => {
                if tile.tile_type != TileType::Soil || tile.structure.is_some() {
                    return Err(stale);
                }
                Ok(tile.till(center, feedback))
            }
            ActionKind::Shovel => {
                if !tile.tile_type.is_grass() || tile.structure.is_some() {
                    return Err(stale);
                }
                Ok(tile.shovel(center, feedback))
            }
            ActionKind::FillWateringCan => {
                if tile.tile_type != TileType::Water || tile.structure.is_some() {
                    return Err(stale);
                }
                Ok(tile.fill_watering_can(inventory, center, feedback))
            }
            ActionKind::Plant(kind) => match tile.structure.as_mut() {
                Some(Structure::Soil(soil)) if soil.is_empty() && inventory.has(kind.seed_item(), 1) => {
                    Ok(soil.plant(kind, inventory, center, feedback))
                }
                _ => Err(stale),
            },
            ActionKind::Harvest => match tile.structure.as_mut() {
                Some(Structure::Soil(soil)) if soil.is_mature() => {
                    Ok(soil.harvest(inventory, rng, center, feedback))
                }
                _ => Err(stale),
            },
            ActionKind::Water => match tile.structure.as_mut() {
                Some(Structure::Soil(soil)) if !soil.wet && inventory.has(ItemKind::WateringCanFull, 1) => {
                    Ok(soil.water(inventory, center, feedback))
                }
                _ => Err(stale),
            },
        }
    }
}
