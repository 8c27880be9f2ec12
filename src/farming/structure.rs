//! Per-tile structures and the crop growth state machine.
//!
//! A structure is whatever sits on top of a tile's terrain. Today that is
//! only tilled soil, which may carry a crop:
//!
//! ```text
//! Empty ──plant──▶ Growing(0..MAX) ──random tick──▶ Mature(MAX) ──harvest──▶ Empty
//! ```

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::shared::*;
use super::action::{ActionKind, ActionOutcome, Feedback};
use super::render::{DrawSurface, FrameEffects};

pub const MAX_GROWTH_STAGE: u8 = 2;

/// Cumulative thresholds for the harvest yield roll: 10% one, 80% two,
/// 10% three.
const YIELD_ONE_THRESHOLD: f32 = 0.1;
const YIELD_TWO_THRESHOLD: f32 = 0.9;

// ─────────────────────────────────────────────────────────────────────────────
// Crop kinds
// ─────────────────────────────────────────────────────────────────────────────

/// What has been planted, identified by the seed it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropKind {
    CarrotSeeds,
    WheatSeeds,
    OnionSeeds,
}

impl CropKind {
    pub const ALL: [CropKind; 3] = [CropKind::CarrotSeeds, CropKind::WheatSeeds, CropKind::OnionSeeds];

    pub fn from_seed(item: ItemKind) -> Option<Self> {
        match item {
            ItemKind::CarrotSeeds => Some(CropKind::CarrotSeeds),
            ItemKind::WheatSeeds => Some(CropKind::WheatSeeds),
            ItemKind::OnionSeeds => Some(CropKind::OnionSeeds),
            _ => None,
        }
    }

    pub fn seed_item(self) -> ItemKind {
        match self {
            CropKind::CarrotSeeds => ItemKind::CarrotSeeds,
            CropKind::WheatSeeds => ItemKind::WheatSeeds,
            CropKind::OnionSeeds => ItemKind::OnionSeeds,
        }
    }

    pub fn harvest_item(self) -> ItemKind {
        match self {
            CropKind::CarrotSeeds => ItemKind::Carrot,
            CropKind::WheatSeeds => ItemKind::Wheat,
            CropKind::OnionSeeds => ItemKind::Onion,
        }
    }

    pub fn display_name(self) -> &'static str {
        self.harvest_item().name()
    }

    /// Colour of this crop's harvest hint and of its ripe-crop particles.
    pub fn color(self) -> Color {
        match self {
            CropKind::CarrotSeeds => Color::srgb(1.0, 0.65, 0.0),
            CropKind::WheatSeeds => Color::srgb(1.0, 1.0, 0.0),
            CropKind::OnionSeeds => Color::srgb(0.63, 0.13, 0.94),
        }
    }

    /// File stem used by the crop sprites (`planted_<stem>_<stage>.png`).
    pub fn sprite_stem(self) -> &'static str {
        match self {
            CropKind::CarrotSeeds => "carrot",
            CropKind::WheatSeeds => "wheat",
            CropKind::OnionSeeds => "onion",
        }
    }
}

/// Map one uniform draw in `[0, 1)` to a harvest quantity.
pub fn harvest_yield(v: f32) -> u32 {
    if v <= YIELD_ONE_THRESHOLD {
        1
    } else if v <= YIELD_TWO_THRESHOLD {
        2
    } else {
        3
    }
}

pub fn roll_harvest_yield<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    harvest_yield(rng.gen::<f32>())
}

// ─────────────────────────────────────────────────────────────────────────────
// Soil structure
// ─────────────────────────────────────────────────────────────────────────────

/// Tilled soil. Can have one crop growing on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilStructure {
    planted: Option<CropKind>,
    growth_stage: u8,
    pub wet: bool,
}

impl SoilStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Soil with a crop already at `stage` (clamped to the mature stage).
    pub fn with_crop(kind: CropKind, stage: u8) -> Self {
        Self {
            planted: Some(kind),
            growth_stage: stage.min(MAX_GROWTH_STAGE),
            wet: false,
        }
    }

    pub fn planted(&self) -> Option<CropKind> {
        self.planted
    }

    pub fn growth_stage(&self) -> u8 {
        self.growth_stage
    }

    pub fn is_empty(&self) -> bool {
        self.planted.is_none()
    }

    pub fn is_mature(&self) -> bool {
        self.planted.is_some() && self.growth_stage == MAX_GROWTH_STAGE
    }

    /// Advance one growth stage. Returns whether anything changed.
    pub fn random_tick(&mut self) -> bool {
        if self.planted.is_some() && self.growth_stage < MAX_GROWTH_STAGE {
            self.growth_stage += 1;
            true
        } else {
            false
        }
    }

    /// What using `held` on this soil would do, if anything.
    pub fn resolve_interaction(&self, held: ItemKind, inventory: &Inventory) -> Option<ActionKind> {
        if let Some(kind) = CropKind::from_seed(held) {
            if self.is_empty() && inventory.has(held, 1) {
                return Some(ActionKind::Plant(kind));
            }
        }

        if held == ItemKind::Hoe && self.is_mature() {
            return Some(ActionKind::Harvest);
        }

        if held == ItemKind::WateringCanFull && !self.wet && inventory.has(held, 1) {
            return Some(ActionKind::Water);
        }

        None
    }

    pub fn plant(
        &mut self,
        kind: CropKind,
        inventory: &mut Inventory,
        tile_center: Vec2,
        feedback: &mut Feedback,
    ) -> ActionOutcome {
        let seed = kind.seed_item();
        inventory.remove(seed, 1);
        self.planted = Some(kind);
        self.growth_stage = 0;

        feedback.sound(SoundKind::Plant);
        feedback.hint(
            format!("-1 {}", kind.display_name()),
            above(tile_center),
            Color::srgb(1.0, 0.65, 0.0),
        );

        ActionOutcome::consumed(inventory, seed)
    }

    pub fn harvest<R: Rng + ?Sized>(
        &mut self,
        inventory: &mut Inventory,
        rng: &mut R,
        tile_center: Vec2,
        feedback: &mut Feedback,
    ) -> ActionOutcome {
        let Some(kind) = self.planted else {
            return ActionOutcome::Done;
        };
        feedback.sound(SoundKind::HarvestPlant);

        let quantity = roll_harvest_yield(rng);
        inventory.add(kind.harvest_item(), quantity);
        feedback.hint(
            format!("+{} {}", quantity, kind.display_name()),
            above(tile_center),
            kind.color(),
        );

        self.planted = None;
        self.growth_stage = 0;
        self.wet = false;
        ActionOutcome::Done
    }

    pub fn water(
        &mut self,
        inventory: &mut Inventory,
        tile_center: Vec2,
        feedback: &mut Feedback,
    ) -> ActionOutcome {
        self.wet = true;
        inventory.remove(ItemKind::WateringCanFull, 1);
        if inventory.count(ItemKind::WateringCanFull) == 0 {
            inventory.set(ItemKind::WateringCanEmpty, 1);
        }
        feedback.sound(SoundKind::Plant);
        feedback.hint("Watered!", tile_center, Color::srgb(0.53, 0.81, 0.92));

        ActionOutcome::consumed(inventory, ItemKind::WateringCanFull)
    }

    /// Crop is destroyed, soil stays tilled.
    pub fn trample(&mut self) -> bool {
        let had_crop = self.planted.take().is_some();
        self.growth_stage = 0;
        had_crop
    }

    /// Soil, then the crop. Mature crops now and then give off a particle
    /// somewhere over the tile.
    pub fn draw(&self, surface: &mut impl DrawSurface, screen: Vec2, effects: &mut FrameEffects) {
        surface.draw_soil(self.wet, screen);
        let Some(kind) = self.planted else {
            return;
        };
        surface.draw_crop(kind, self.growth_stage, screen);

        if self.is_mature() && effects.chance(PARTICLES_PER_TILE_SECOND) {
            let center = screen + Vec2::splat(TILE_SIZE / 2.0);
            let at = effects.point_in_square(center, TILE_SIZE / 2.0);
            surface.draw_particle(at, kind.color());
        }
    }
}

/// Hints for crops float one tile above the tile centre.
fn above(tile_center: Vec2) -> Vec2 {
    tile_center - Vec2::new(0.0, TILE_SIZE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Structure: closed set of per-tile attachments
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Structure {
    Soil(SoilStructure),
}

impl Structure {
    pub fn random_tick(&mut self) -> bool {
        match self {
            Structure::Soil(soil) => soil.random_tick(),
        }
    }

    pub fn resolve_interaction(&self, held: ItemKind, inventory: &Inventory) -> Option<ActionKind> {
        match self {
            Structure::Soil(soil) => soil.resolve_interaction(held, inventory),
        }
    }

    pub fn draw(&self, surface: &mut impl DrawSurface, screen: Vec2, effects: &mut FrameEffects) {
        match self {
            Structure::Soil(soil) => soil.draw(surface, screen, effects),
        }
    }

    pub fn as_soil(&self) -> Option<&SoilStructure> {
        match self {
            Structure::Soil(soil) => Some(soil),
        }
    }

    pub fn as_soil_mut(&mut self) -> Option<&mut SoilStructure> {
        match self {
            Structure::Soil(soil) => Some(soil),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farming::render::{DrawCommand, DrawList};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeds(kind: ItemKind, n: u32) -> Inventory {
        let mut inventory = Inventory::empty();
        inventory.add(kind, n);
        inventory
    }

    #[test]
    fn test_random_tick_advances_until_mature_then_stops() {
        let mut soil = SoilStructure::with_crop(CropKind::WheatSeeds, 0);
        assert!(soil.random_tick());
        assert!(soil.random_tick());
        assert!(soil.is_mature());
        assert!(!soil.random_tick(), "Mature crops ignore random ticks");
        assert_eq!(soil.growth_stage(), MAX_GROWTH_STAGE);
    }

    #[test]
    fn test_random_tick_on_empty_soil_is_noop() {
        let mut soil = SoilStructure::new();
        assert!(!soil.random_tick());
        assert_eq!(soil.growth_stage(), 0);
    }

    #[test]
    fn test_plant_sets_crop_and_consumes_seed() {
        let mut soil = SoilStructure::new();
        let mut inventory = seeds(ItemKind::CarrotSeeds, 3);
        let mut feedback = Feedback::default();

        let outcome = soil.plant(CropKind::CarrotSeeds, &mut inventory, Vec2::ZERO, &mut feedback);

        assert_eq!(outcome, ActionOutcome::Done);
        assert_eq!(soil.planted(), Some(CropKind::CarrotSeeds));
        assert_eq!(soil.growth_stage(), 0);
        assert_eq!(inventory.count(ItemKind::CarrotSeeds), 2);
        assert_eq!(feedback.hints[0].text, "-1 Carrot");
        assert_eq!(feedback.sounds, vec![SoundKind::Plant]);
    }

    #[test]
    fn test_planting_last_seed_reports_exhausted_stack() {
        let mut soil = SoilStructure::new();
        let mut inventory = seeds(ItemKind::OnionSeeds, 1);
        let outcome = soil.plant(CropKind::OnionSeeds, &mut inventory, Vec2::ZERO, &mut Feedback::default());
        assert_eq!(outcome, ActionOutcome::StackExhausted);
    }

    #[test]
    fn test_occupied_soil_offers_no_seed_action() {
        let soil = SoilStructure::with_crop(CropKind::CarrotSeeds, 1);
        let inventory = seeds(ItemKind::WheatSeeds, 5);
        assert_eq!(soil.resolve_interaction(ItemKind::WheatSeeds, &inventory), None);
    }

    #[test]
    fn test_seed_action_requires_a_seed_in_inventory() {
        let soil = SoilStructure::new();
        let inventory = Inventory::empty();
        assert_eq!(soil.resolve_interaction(ItemKind::CarrotSeeds, &inventory), None);
    }

    #[test]
    fn test_hoe_only_harvests_mature_crops() {
        let inventory = Inventory::empty();
        let growing = SoilStructure::with_crop(CropKind::CarrotSeeds, 1);
        let mature = SoilStructure::with_crop(CropKind::CarrotSeeds, MAX_GROWTH_STAGE);
        assert_eq!(growing.resolve_interaction(ItemKind::Hoe, &inventory), None);
        assert_eq!(mature.resolve_interaction(ItemKind::Hoe, &inventory), Some(ActionKind::Harvest));
    }

    #[test]
    fn test_harvest_resets_to_empty_and_credits_produce() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut soil = SoilStructure::with_crop(CropKind::OnionSeeds, MAX_GROWTH_STAGE);
        soil.wet = true;
        let mut inventory = Inventory::empty();
        let mut feedback = Feedback::default();

        soil.harvest(&mut inventory, &mut rng, Vec2::ZERO, &mut feedback);

        let onions = inventory.count(ItemKind::Onion);
        assert!((1..=3).contains(&onions), "Yield out of range: {}", onions);
        assert!(soil.is_empty());
        assert_eq!(soil.growth_stage(), 0);
        assert!(!soil.wet, "Harvest clears wetness");
        assert_eq!(feedback.hints[0].text, format!("+{} Onion", onions));
    }

    #[test]
    fn test_harvest_yield_thresholds() {
        assert_eq!(harvest_yield(0.0), 1);
        assert_eq!(harvest_yield(0.1), 1);
        assert_eq!(harvest_yield(0.1001), 2);
        assert_eq!(harvest_yield(0.9), 2);
        assert_eq!(harvest_yield(0.95), 3);
    }

    #[test]
    fn test_harvest_yield_distribution() {
        let mut rng = StdRng::seed_from_u64(0x22);
        let samples = 20_000;
        let mut counts = [0u32; 4];
        for _ in 0..samples {
            counts[roll_harvest_yield(&mut rng) as usize] += 1;
        }
        let freq = |n: usize| counts[n] as f64 / samples as f64;
        assert_eq!(counts[0], 0);
        assert!((freq(1) - 0.10).abs() < 0.015, "P(1) = {}", freq(1));
        assert!((freq(2) - 0.80).abs() < 0.015, "P(2) = {}", freq(2));
        assert!((freq(3) - 0.10).abs() < 0.015, "P(3) = {}", freq(3));
    }

    #[test]
    fn test_water_empties_can_on_last_use() {
        let mut soil = SoilStructure::new();
        let mut inventory = seeds(ItemKind::WateringCanFull, 1);
        let outcome = soil.water(&mut inventory, Vec2::ZERO, &mut Feedback::default());

        assert!(soil.wet);
        assert_eq!(inventory.count(ItemKind::WateringCanFull), 0);
        assert_eq!(inventory.count(ItemKind::WateringCanEmpty), 1);
        assert_eq!(outcome, ActionOutcome::StackExhausted);
    }

    #[test]
    fn test_wet_soil_cannot_be_watered_again() {
        let mut soil = SoilStructure::new();
        soil.wet = true;
        let inventory = seeds(ItemKind::WateringCanFull, 5);
        assert_eq!(soil.resolve_interaction(ItemKind::WateringCanFull, &inventory), None);
    }

    fn particles(list: &DrawList) -> Vec<(Vec2, Color)> {
        list.commands
            .iter()
            .filter_map(|c| match *c {
                DrawCommand::Particle { screen, color } => Some((screen, color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_mature_crop_gives_off_particles_in_its_colour() {
        let soil = SoilStructure::with_crop(CropKind::OnionSeeds, MAX_GROWTH_STAGE);
        let mut rng = StdRng::seed_from_u64(4);
        let mut list = DrawList::new(Vec2::splat(TILE_SIZE));
        let origin = Vec2::new(TILE_SIZE, 2.0 * TILE_SIZE);

        // A whole second guarantees at least one particle.
        soil.draw(&mut list, origin, &mut FrameEffects::new(1.0, &mut rng));

        let emitted = particles(&list);
        assert_eq!(emitted.len(), 1);
        let (at, color) = emitted[0];
        assert_eq!(color, CropKind::OnionSeeds.color());
        assert!(at.x >= origin.x && at.x <= origin.x + TILE_SIZE);
        assert!(at.y >= origin.y && at.y <= origin.y + TILE_SIZE);
    }

    #[test]
    fn test_growing_crops_and_still_frames_give_off_no_particles() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut list = DrawList::new(Vec2::splat(TILE_SIZE));

        let growing = SoilStructure::with_crop(CropKind::CarrotSeeds, 1);
        growing.draw(&mut list, Vec2::ZERO, &mut FrameEffects::new(1.0, &mut rng));
        let mature = SoilStructure::with_crop(CropKind::CarrotSeeds, MAX_GROWTH_STAGE);
        mature.draw(&mut list, Vec2::ZERO, &mut FrameEffects::new(0.0, &mut rng));

        assert!(particles(&list).is_empty());
    }

    #[test]
    fn test_particle_rate_matches_frame_time() {
        let soil = SoilStructure::with_crop(CropKind::WheatSeeds, MAX_GROWTH_STAGE);
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut list = DrawList::new(Vec2::splat(TILE_SIZE));
        let frames = 6_000;
        let delta = 1.0 / 60.0;
        for _ in 0..frames {
            soil.draw(&mut list, Vec2::ZERO, &mut FrameEffects::new(delta, &mut rng));
        }

        // 100 simulated seconds at five a second.
        let count = particles(&list).len();
        assert!((420..=580).contains(&count), "particles = {}", count);
    }

    #[test]
    fn test_with_crop_clamps_stage() {
        let soil = SoilStructure::with_crop(CropKind::WheatSeeds, 9);
        assert_eq!(soil.growth_stage(), MAX_GROWTH_STAGE);
    }
}
