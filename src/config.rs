//! Tunable simulation settings, optionally overridden from
//! `assets/config/simulation.ron`.

use bevy::prelude::*;
use serde::Deserialize;

use crate::farming::random_tick::RandomTickScheduler;
use crate::farming::render::EffectRng;
use crate::farming::FarmRng;
use crate::shared::*;

pub const CONFIG_PATH: &str = "assets/config/simulation.ron";

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Milliseconds per random-tick pass.
    pub map_update_rate_ms: f32,
    /// Chance that any one tile is ticked in a pass.
    pub random_tick_ratio: f64,
    /// Fixed seed for growth and harvest rolls. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    /// Share of the grass field the world builder turns into tall grass.
    pub tall_grass_ratio: f64,
    pub player_speed: f32,
    pub crazed_speed_multiplier: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            map_update_rate_ms: MAP_UPDATE_RATE_MS,
            random_tick_ratio: RANDOM_TICK_PER_UPDATE_RATIO,
            rng_seed: None,
            tall_grass_ratio: 0.08,
            player_speed: 300.0,
            crazed_speed_multiplier: 3.0,
        }
    }
}

impl SimulationConfig {
    pub fn parse(text: &str) -> Result<Self, String> {
        let config: Self = ron::from_str(text).map_err(|e| format!("Parse failed: {}", e))?;
        config.validate()
    }

    fn validate(self) -> Result<Self, String> {
        if !(self.map_update_rate_ms > 0.0) {
            return Err(format!("map_update_rate_ms must be positive, got {}", self.map_update_rate_ms));
        }
        for (name, ratio) in [
            ("random_tick_ratio", self.random_tick_ratio),
            ("tall_grass_ratio", self.tall_grass_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(format!("{} must be within 0..=1, got {}", name, ratio));
            }
        }
        if !(self.player_speed >= 0.0) || !(self.crazed_speed_multiplier >= 0.0) {
            return Err("speeds must be non-negative".to_string());
        }
        Ok(self)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
        Self::parse(&text)
    }

    /// The file is optional; anything wrong with it falls back to defaults.
    pub fn load_or_default() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let path = std::path::Path::new(CONFIG_PATH);
            if !path.exists() {
                info!("[Config] No {} found, using defaults", CONFIG_PATH);
                return Self::default();
            }
            match Self::load_from(path) {
                Ok(config) => {
                    info!("[Config] Loaded {}", CONFIG_PATH);
                    config
                }
                Err(e) => {
                    warn!("[Config] {} ignored: {}", CONFIG_PATH, e);
                    Self::default()
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self::default()
        }
    }

    /// Derive a sub-seed so each consumer of randomness gets its own
    /// stream.
    fn derived_seed(&self, stream: u64) -> Option<u64> {
        self.rng_seed
            .map(|seed| seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    pub fn scheduler(&self) -> RandomTickScheduler {
        use rand::rngs::StdRng;
        use rand::SeedableRng;
        let rng = match self.derived_seed(1) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomTickScheduler::new(self.map_update_rate_ms, self.random_tick_ratio, rng)
    }

    pub fn farm_rng(&self) -> FarmRng {
        match self.derived_seed(2) {
            Some(seed) => FarmRng::seeded(seed),
            None => FarmRng::from_entropy(),
        }
    }

    pub fn effect_rng(&self) -> EffectRng {
        use rand::SeedableRng;
        match self.derived_seed(4) {
            Some(seed) => EffectRng(rand::rngs::StdRng::seed_from_u64(seed)),
            None => EffectRng::default(),
        }
    }

    pub fn world_rng(&self) -> rand::rngs::StdRng {
        use rand::SeedableRng;
        match self.derived_seed(3) {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        }
    }
}

/// Inserts `SimulationConfig` unless the app already has one.
pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SimulationConfig>() {
            app.insert_resource(SimulationConfig::load_or_default());
        }
    }
}
