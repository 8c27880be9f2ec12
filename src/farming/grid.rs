//! The tile grid: owns every tile and is the only entry point the rest of
//! the game uses to query or change the farm.

use bevy::prelude::*;

use crate::shared::*;
use super::action::Action;
use super::autotile::corner_mask;
use super::random_tick::RandomTickScheduler;
use super::render::{DrawSurface, FrameEffects};
use super::structure::Structure;
use super::tile::{Tile, TileType};

/// What one `update` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub passes: u32,
    pub ticked: usize,
    pub advanced: usize,
}

#[derive(Resource, Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    /// Row-major: `tiles[y * width + x]`.
    tiles: Vec<Tile>,
    scheduler: RandomTickScheduler,
}

impl TileGrid {
    pub fn new(width: usize, height: usize, fill: TileType, scheduler: RandomTickScheduler) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::new(fill); width * height],
            scheduler,
        }
    }

    /// Build from row-major tile types. `None` if the length doesn't match.
    pub fn from_types(
        width: usize,
        height: usize,
        types: Vec<TileType>,
        scheduler: RandomTickScheduler,
    ) -> Option<Self> {
        if types.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            tiles: types.into_iter().map(Tile::new).collect(),
            scheduler,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scheduler(&self) -> &RandomTickScheduler {
        &self.scheduler
    }

    /// The single place coordinates become storage offsets.
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            None
        } else {
            Some(y as usize * self.width + x as usize)
        }
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.index(x, y).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.index(x, y).map(move |i| &mut self.tiles[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), &Tile)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (((i % width) as i32, (i / width) as i32), tile))
    }

    pub fn set_tile_type(&mut self, x: i32, y: i32, tile_type: TileType) -> bool {
        match self.tile_mut(x, y) {
            Some(tile) => {
                tile.tile_type = tile_type;
                true
            }
            None => false,
        }
    }

    pub fn set_structure(&mut self, x: i32, y: i32, structure: Option<Structure>) -> bool {
        match self.tile_mut(x, y) {
            Some(tile) => {
                tile.structure = structure;
                true
            }
            None => false,
        }
    }

    /// World-space centre of a tile, in pixels.
    pub fn tile_center(x: i32, y: i32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * TILE_SIZE,
            (y as f32 + 0.5) * TILE_SIZE,
        )
    }

    // ─────────────────────────────────────────────────────────────────────
    // Simulation
    // ─────────────────────────────────────────────────────────────────────

    /// Accumulate `delta_secs` and run any random-tick passes that are due.
    pub fn update(&mut self, delta_secs: f32) -> TickReport {
        let passes = self.scheduler.advance(delta_secs);
        let mut report = TickReport {
            passes,
            ..default()
        };

        for _ in 0..passes {
            for tile in self.tiles.iter_mut() {
                if self.scheduler.roll() {
                    report.ticked += 1;
                    if tile.random_tick() {
                        report.advanced += 1;
                    }
                }
            }
        }

        report
    }

    /// Resolve what using `held` on `(x, y)` would do. Out-of-range cells
    /// have no interaction.
    pub fn get_interaction(&self, x: i32, y: i32, held: ItemKind, inventory: &Inventory) -> Option<Action> {
        let kind = self.tile(x, y)?.resolve_interaction(held, inventory)?;
        Some(Action {
            cell: (x, y),
            tile_center: Self::tile_center(x, y),
            kind,
        })
    }

    /// Out-of-range cells never collide; the actor is clamped to the world
    /// separately.
    pub fn is_collision(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_some_and(Tile::is_collidable)
    }

    /// Knock down a blocking tile (crazed actor). Returns whether it changed.
    pub fn destroy_obstacle(&mut self, x: i32, y: i32) -> bool {
        let Some(tile) = self.tile_mut(x, y) else {
            return false;
        };
        if !tile.is_collidable() {
            return false;
        }
        tile.tile_type = TileType::Soil;
        tile.structure = None;
        true
    }

    /// Destroy any crop on `(x, y)`, leaving the tilled soil.
    pub fn trample(&mut self, x: i32, y: i32) -> bool {
        self.tile_mut(x, y)
            .and_then(|tile| tile.structure.as_mut())
            .and_then(Structure::as_soil_mut)
            .is_some_and(|soil| soil.trample())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Drawing
    // ─────────────────────────────────────────────────────────────────────

    /// Tile type at `(x, y)` with coordinates clamped onto the grid, so the
    /// border continues past the world edge.
    fn clamped_type(&self, x: i32, y: i32) -> TileType {
        let cx = x.clamp(0, self.width as i32 - 1);
        let cy = y.clamp(0, self.height as i32 - 1);
        self.tiles[cy as usize * self.width + cx as usize].tile_type
    }

    /// Corner mask for the corner at the top-left of tile `(cx, cy)`.
    pub fn corner_mask(&self, layer: TileType, cx: i32, cy: i32) -> u8 {
        if self.tiles.is_empty() {
            return 0;
        }
        corner_mask(
            layer,
            [
                self.clamped_type(cx - 1, cy - 1),
                self.clamped_type(cx, cy - 1),
                self.clamped_type(cx - 1, cy),
                self.clamped_type(cx, cy),
            ],
        )
    }

    /// Draw terrain layers, then structures, then the selection outline.
    /// `camera_offset` is the world position of the screen's top-left.
    pub fn draw(
        &self,
        surface: &mut impl DrawSurface,
        camera_offset: Vec2,
        selected_cell: Option<(i32, i32)>,
        selection_color: Color,
        effects: &mut FrameEffects,
    ) {
        if self.tiles.is_empty() {
            return;
        }
        let viewport = surface.viewport_size();
        let first = ((camera_offset / TILE_SIZE).floor()).as_ivec2();
        let last = (((camera_offset + viewport) / TILE_SIZE).floor()).as_ivec2();

        let x0 = first.x.max(0);
        let y0 = first.y.max(0);
        let x1 = last.x.min(self.width as i32 - 1);
        let y1 = last.y.min(self.height as i32 - 1);

        // Dual-grid cells sit on tile corners, half a tile up and left.
        let half = Vec2::splat(TILE_SIZE / 2.0);
        for layer in TileType::LAYERS {
            for cy in y0..=(y1 + 1) {
                for cx in x0..=(x1 + 1) {
                    let mask = self.corner_mask(layer, cx, cy);
                    // Mask 0 is the empty cell.
                    if mask == 0 {
                        continue;
                    }
                    let corner = Vec2::new(cx as f32, cy as f32) * TILE_SIZE;
                    surface.draw_terrain(layer, mask, corner - half - camera_offset);
                }
            }
        }

        for y in y0..=y1 {
            for x in x0..=x1 {
                let Some(structure) = self.tile(x, y).and_then(|t| t.structure.as_ref()) else {
                    continue;
                };
                let screen = Vec2::new(x as f32, y as f32) * TILE_SIZE - camera_offset;
                structure.draw(surface, screen, effects);
            }
        }

        if let Some((x, y)) = selected_cell {
            if self.index(x, y).is_some() {
                let screen = Vec2::new(x as f32, y as f32) * TILE_SIZE - camera_offset;
                surface.draw_outline(screen, TILE_SIZE, selection_color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farming::action::Feedback;
    use crate::farming::random_tick::MAX_PASSES_PER_ADVANCE;
    use crate::farming::render::{DrawCommand, DrawList};
    use crate::farming::structure::{CropKind, SoilStructure, MAX_GROWTH_STAGE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn soil_grid(width: usize, height: usize) -> TileGrid {
        TileGrid::new(width, height, TileType::Soil, RandomTickScheduler::seeded(42))
    }

    fn soil_at(grid: &TileGrid, x: i32, y: i32) -> &SoilStructure {
        grid.tile(x, y)
            .and_then(|t| t.structure.as_ref())
            .and_then(Structure::as_soil)
            .expect("tile has soil")
    }

    #[test]
    fn test_index_is_row_major_and_bounds_checked() {
        let grid = soil_grid(4, 3);
        assert_eq!(grid.index(0, 0), Some(0));
        assert_eq!(grid.index(3, 0), Some(3));
        assert_eq!(grid.index(0, 1), Some(4));
        assert_eq!(grid.index(3, 2), Some(11));
        assert_eq!(grid.index(4, 0), None);
        assert_eq!(grid.index(0, 3), None);
        assert_eq!(grid.index(-1, 0), None);
    }

    #[test]
    fn test_from_types_rejects_wrong_length() {
        let scheduler = RandomTickScheduler::seeded(0);
        assert!(TileGrid::from_types(2, 2, vec![TileType::Soil; 3], scheduler).is_none());
    }

    #[test]
    fn test_till_center_of_soil_grid_only_changes_that_tile() {
        let mut grid = soil_grid(3, 3);
        let mut inventory = Inventory::default();
        let mut rng = StdRng::seed_from_u64(1);

        let action = grid
            .get_interaction(1, 1, ItemKind::Hoe, &inventory)
            .expect("hoe on bare soil tills");
        action
            .execute(&mut grid, &mut inventory, &mut rng, &mut Feedback::default())
            .unwrap();

        for ((x, y), tile) in grid.iter() {
            assert_eq!(tile.tile_type, TileType::Soil);
            if (x, y) == (1, 1) {
                assert_eq!(tile.structure, Some(Structure::Soil(SoilStructure::new())));
            } else {
                assert!(tile.structure.is_none(), "({}, {}) changed", x, y);
            }
        }
    }

    #[test]
    fn test_harvest_mature_carrot() {
        let mut grid = soil_grid(3, 3);
        grid.set_structure(
            2,
            2,
            Some(Structure::Soil(SoilStructure::with_crop(CropKind::CarrotSeeds, MAX_GROWTH_STAGE))),
        );
        let mut inventory = Inventory::default();
        let before = inventory.count(ItemKind::Carrot);

        let action = grid
            .get_interaction(2, 2, ItemKind::Hoe, &inventory)
            .expect("mature crop is harvestable");
        action
            .execute(&mut grid, &mut inventory, &mut StdRng::seed_from_u64(9), &mut Feedback::default())
            .unwrap();

        let gained = inventory.count(ItemKind::Carrot) - before;
        assert!((1..=3).contains(&gained));
        assert!(soil_at(&grid, 2, 2).is_empty());
        assert_eq!(soil_at(&grid, 2, 2).growth_stage(), 0);
    }

    #[test]
    fn test_out_of_range_queries_fail_safely() {
        let grid = soil_grid(3, 3);
        let inventory = Inventory::default();
        assert!(grid.get_interaction(-1, 0, ItemKind::Hoe, &inventory).is_none());
        assert!(grid.get_interaction(3, 3, ItemKind::Hoe, &inventory).is_none());
        assert!(!grid.is_collision(-1, -1));
        assert!(!grid.is_collision(100, 0));
    }

    #[test]
    fn test_is_collision_only_on_water() {
        let mut grid = soil_grid(3, 1);
        grid.set_tile_type(0, 0, TileType::Water);
        grid.set_tile_type(2, 0, TileType::Grass);
        assert!(grid.is_collision(0, 0));
        assert!(!grid.is_collision(1, 0), "soil next to water is walkable");
        assert!(!grid.is_collision(2, 0));
    }

    #[test]
    fn test_one_update_period_ticks_about_one_percent() {
        let mut grid = soil_grid(100, 100);
        for y in 0..100 {
            for x in 0..100 {
                grid.set_structure(
                    x,
                    y,
                    Some(Structure::Soil(SoilStructure::with_crop(CropKind::WheatSeeds, 0))),
                );
            }
        }

        let report = grid.update(MAP_UPDATE_RATE_MS / 1000.0);

        assert_eq!(report.passes, 1);
        assert!((60..=140).contains(&report.advanced), "advanced = {}", report.advanced);
        let staged = grid
            .iter()
            .filter(|(_, t)| t.structure.as_ref().and_then(Structure::as_soil).unwrap().growth_stage() == 1)
            .count();
        assert_eq!(staged, report.advanced);
    }

    #[test]
    fn test_update_below_period_does_nothing() {
        let mut grid = soil_grid(10, 10);
        let report = grid.update(0.1);
        assert_eq!(report, TickReport::default());
    }

    #[test]
    fn test_update_survives_stalled_and_broken_deltas() {
        let mut grid = soil_grid(10, 10);
        assert_eq!(grid.update(f32::INFINITY), TickReport::default());
        let report = grid.update(1.0e8);
        assert_eq!(report.passes, MAX_PASSES_PER_ADVANCE);
        assert!(report.ticked <= 100 * MAX_PASSES_PER_ADVANCE as usize);
    }

    #[test]
    fn test_draw_emits_particles_only_over_mature_visible_crops() {
        let mut grid = TileGrid::new(3, 1, TileType::Soil, RandomTickScheduler::seeded(0));
        grid.set_structure(0, 0, Some(Structure::Soil(SoilStructure::with_crop(CropKind::CarrotSeeds, MAX_GROWTH_STAGE))));
        grid.set_structure(1, 0, Some(Structure::Soil(SoilStructure::with_crop(CropKind::WheatSeeds, 1))));
        grid.set_structure(2, 0, Some(Structure::Soil(SoilStructure::with_crop(CropKind::OnionSeeds, MAX_GROWTH_STAGE))));
        // Only the first two tiles are on screen.
        let mut list = DrawList::new(Vec2::new(TILE_SIZE * 2.0 - 1.0, TILE_SIZE - 1.0));
        let mut rng = StdRng::seed_from_u64(8);

        grid.draw(&mut list, Vec2::ZERO, None, Color::WHITE, &mut FrameEffects::new(1.0, &mut rng));

        let colors: Vec<Color> = list
            .commands
            .iter()
            .filter_map(|c| match *c {
                DrawCommand::Particle { color, .. } => Some(color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![CropKind::CarrotSeeds.color()]);
    }

    #[test]
    fn test_growth_stage_stays_in_range_under_many_updates() {
        let mut grid = soil_grid(20, 20);
        for y in 0..20 {
            for x in 0..20 {
                grid.set_structure(
                    x,
                    y,
                    Some(Structure::Soil(SoilStructure::with_crop(CropKind::OnionSeeds, 0))),
                );
            }
        }
        for _ in 0..2000 {
            grid.update(MAP_UPDATE_RATE_MS / 1000.0);
        }
        for (_, tile) in grid.iter() {
            let stage = tile.structure.as_ref().and_then(Structure::as_soil).unwrap().growth_stage();
            assert!(stage <= MAX_GROWTH_STAGE);
        }
    }

    #[test]
    fn test_destroy_obstacle_and_trample() {
        let mut grid = soil_grid(2, 1);
        grid.set_tile_type(0, 0, TileType::Water);
        grid.set_structure(
            1,
            0,
            Some(Structure::Soil(SoilStructure::with_crop(CropKind::CarrotSeeds, 1))),
        );

        assert!(grid.destroy_obstacle(0, 0));
        assert!(!grid.is_collision(0, 0));
        assert!(!grid.destroy_obstacle(1, 0), "only blocking tiles are destroyed");

        assert!(grid.trample(1, 0));
        assert!(soil_at(&grid, 1, 0).is_empty());
        assert!(!grid.trample(1, 0));
        assert!(!grid.trample(0, 0));
    }

    #[test]
    fn test_corner_mask_clamps_at_edges() {
        let mut grid = TileGrid::new(2, 2, TileType::Grass, RandomTickScheduler::seeded(0));
        grid.set_tile_type(1, 1, TileType::Soil);
        // Top-left world corner sees only tile (0, 0) four times.
        assert_eq!(grid.corner_mask(TileType::Grass, 0, 0), 0b1111);
        // The centre corner sees three grass tiles and soil at bottom-right.
        assert_eq!(grid.corner_mask(TileType::Grass, 1, 1), 0b0111);
        assert_eq!(grid.corner_mask(TileType::Soil, 1, 1), 0b1111);
        // Bottom-right world corner sees only the soil tile.
        assert_eq!(grid.corner_mask(TileType::Grass, 2, 2), 0);
    }

    #[test]
    fn test_draw_orders_layers_then_structures_then_selection() {
        let mut grid = TileGrid::new(2, 2, TileType::Grass, RandomTickScheduler::seeded(0));
        grid.set_tile_type(0, 0, TileType::Soil);
        grid.set_structure(0, 0, Some(Structure::Soil(SoilStructure::with_crop(CropKind::WheatSeeds, 1))));
        let mut list = DrawList::new(Vec2::new(TILE_SIZE * 2.0, TILE_SIZE * 2.0));

        let mut rng = StdRng::seed_from_u64(0);
        grid.draw(&mut list, Vec2::ZERO, Some((1, 1)), Color::WHITE, &mut FrameEffects::new(0.0, &mut rng));

        let mut last_layer = 0;
        let mut seen_structure = false;
        for command in &list.commands {
            match command {
                DrawCommand::Terrain { layer, .. } => {
                    assert!(!seen_structure, "terrain drawn after structures");
                    assert!(layer.layer() >= last_layer, "layers out of order");
                    last_layer = layer.layer();
                }
                DrawCommand::Soil { .. } | DrawCommand::Crop { .. } | DrawCommand::Particle { .. } => {
                    seen_structure = true
                }
                DrawCommand::Outline { .. } => {}
            }
        }
        assert!(matches!(list.commands.last(), Some(DrawCommand::Outline { .. })));
        assert!(list.commands.contains(&DrawCommand::Crop {
            kind: CropKind::WheatSeeds,
            stage: 1,
            screen: Vec2::ZERO,
        }));
    }

    #[test]
    fn test_draw_skips_offscreen_tiles() {
        let mut grid = TileGrid::new(50, 50, TileType::Soil, RandomTickScheduler::seeded(0));
        grid.set_structure(40, 40, Some(Structure::Soil(SoilStructure::new())));
        let mut list = DrawList::new(Vec2::new(TILE_SIZE * 4.0, TILE_SIZE * 4.0));

        let mut rng = StdRng::seed_from_u64(0);
        grid.draw(&mut list, Vec2::ZERO, Some((40, 40)), Color::WHITE, &mut FrameEffects::new(1.0, &mut rng));

        assert!(!list
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Soil { .. })));
        assert!(list.commands.len() < 100);
    }
}
