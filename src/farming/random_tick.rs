//! Random-tick scheduling.
//!
//! Elapsed time is accumulated and converted into whole update periods.
//! Each period runs one pass in which every tile is ticked independently
//! with a fixed probability, so growth looks staggered instead of the whole
//! field advancing in lockstep.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::shared::*;

/// Most passes a single `advance` reports. Time beyond that is dropped, so
/// a long stall can't turn into thousands of full-grid passes.
pub const MAX_PASSES_PER_ADVANCE: u32 = 16;

#[derive(Debug, Clone)]
pub struct RandomTickScheduler {
    period_ms: f32,
    ratio: f64,
    accumulated_ms: f32,
    passes_run: u64,
    rng: StdRng,
}

impl RandomTickScheduler {
    pub fn new(period_ms: f32, ratio: f64, rng: StdRng) -> Self {
        Self {
            period_ms: period_ms.max(f32::EPSILON),
            ratio: if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) },
            accumulated_ms: 0.0,
            passes_run: 0,
            rng,
        }
    }

    /// Default timing with a fixed seed, for reproducible growth.
    pub fn seeded(seed: u64) -> Self {
        Self::new(
            MAP_UPDATE_RATE_MS,
            RANDOM_TICK_PER_UPDATE_RATIO,
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn from_entropy() -> Self {
        Self::new(
            MAP_UPDATE_RATE_MS,
            RANDOM_TICK_PER_UPDATE_RATIO,
            StdRng::from_entropy(),
        )
    }

    /// Add elapsed time and return how many whole passes are now due.
    /// Negative and non-finite deltas are ignored.
    pub fn advance(&mut self, delta_secs: f32) -> u32 {
        if !delta_secs.is_finite() || delta_secs <= 0.0 {
            return 0;
        }
        let period = f64::from(self.period_ms);
        let total = f64::from(self.accumulated_ms) + f64::from(delta_secs) * 1000.0;
        let due = (total / period).floor().min(f64::from(MAX_PASSES_PER_ADVANCE)) as u32;
        self.accumulated_ms = (total % period) as f32;
        self.passes_run += u64::from(due);
        due
    }

    /// Whether the tile currently being visited gets a tick this pass.
    pub fn roll(&mut self) -> bool {
        self.rng.gen_bool(self.ratio)
    }

    pub fn passes_run(&self) -> u64 {
        self.passes_run
    }

    pub fn accumulated_ms(&self) -> f32 {
        self.accumulated_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pass_before_period_elapses() {
        let mut scheduler = RandomTickScheduler::seeded(1);
        assert_eq!(scheduler.advance(0.3), 0);
        assert_eq!(scheduler.advance(0.29), 0);
        assert_eq!(scheduler.advance(0.02), 1);
        assert_eq!(scheduler.passes_run(), 1);
    }

    #[test]
    fn test_large_delta_runs_whole_passes_and_keeps_remainder() {
        let mut scheduler = RandomTickScheduler::seeded(1);
        assert_eq!(scheduler.advance(1.5), 2);
        assert!((scheduler.accumulated_ms() - 300.0).abs() < 0.1);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut scheduler = RandomTickScheduler::seeded(1);
        assert_eq!(scheduler.advance(-5.0), 0);
        assert_eq!(scheduler.accumulated_ms(), 0.0);
    }

    #[test]
    fn test_non_finite_delta_is_ignored() {
        let mut scheduler = RandomTickScheduler::seeded(1);
        assert_eq!(scheduler.advance(f32::INFINITY), 0);
        assert_eq!(scheduler.advance(f32::NAN), 0);
        assert_eq!(scheduler.accumulated_ms(), 0.0);
        assert_eq!(scheduler.advance(0.6), 1);
    }

    #[test]
    fn test_huge_delta_is_capped_and_keeps_a_sub_period_remainder() {
        let mut scheduler = RandomTickScheduler::seeded(1);
        assert_eq!(scheduler.advance(1.0e8), MAX_PASSES_PER_ADVANCE);
        assert!(scheduler.accumulated_ms() < MAP_UPDATE_RATE_MS);
        assert_eq!(scheduler.passes_run(), u64::from(MAX_PASSES_PER_ADVANCE));
        assert_eq!(scheduler.advance(f32::MAX), MAX_PASSES_PER_ADVANCE);
    }

    #[test]
    fn test_nan_ratio_never_ticks() {
        let mut scheduler = RandomTickScheduler::new(600.0, f64::NAN, StdRng::seed_from_u64(3));
        assert!((0..1000).all(|_| !scheduler.roll()));
    }

    #[test]
    fn test_roll_rate_matches_ratio() {
        let mut scheduler = RandomTickScheduler::seeded(99);
        let hits = (0..100_000).filter(|_| scheduler.roll()).count();
        assert!((800..1200).contains(&hits), "hits = {}", hits);
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let mut a = RandomTickScheduler::seeded(5);
        let mut b = RandomTickScheduler::seeded(5);
        let ra: Vec<bool> = (0..500).map(|_| a.roll()).collect();
        let rb: Vec<bool> = (0..500).map(|_| b.roll()).collect();
        assert_eq!(ra, rb);
    }
}
