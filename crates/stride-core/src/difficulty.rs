//! Difficulty progression and score accumulation.
//!
//! Difficulty is a monotonic step function over elapsed running time: tier
//! `n` promotes to `n + 1` once more than `n * 5` seconds have passed, and
//! saturates at the last configured tier. The tracker is queried every
//! running frame; evaluation is idempotent when no threshold was crossed.

use serde::{Deserialize, Serialize};

/// Seconds of running time per difficulty level before promotion.
pub const TIER_SECONDS: f32 = 5.0;

/// Points accrued per running second at multiplier 1.0.
const SCORE_RATE: f32 = 10.0;

/// One difficulty tier: enemy speed and score multiplier, keyed by level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTier {
    pub level: u32,
    pub enemy_velocity: [f32; 2],
    pub score_multiplier: f32,
}

impl DifficultyTier {
    pub fn new(level: u32, enemy_velocity: [f32; 2], score_multiplier: f32) -> Self {
        Self {
            level,
            enemy_velocity,
            score_multiplier,
        }
    }

    /// Elapsed running time after which this tier promotes.
    #[allow(clippy::cast_precision_loss)]
    pub fn time_threshold(&self) -> f32 {
        self.level as f32 * TIER_SECONDS
    }
}

/// Monotonic tracker over an ordered tier table. Never regresses; resets
/// only when a new run starts.
#[derive(Debug, Clone)]
pub struct DifficultyTracker {
    tiers: Vec<DifficultyTier>,
    current: usize,
}

impl DifficultyTracker {
    /// Creates a tracker at the first tier. The table must be non-empty and
    /// strictly ascending (enforced by config validation).
    pub fn new(tiers: Vec<DifficultyTier>) -> Self {
        debug_assert!(!tiers.is_empty());
        Self { tiers, current: 0 }
    }

    pub fn current(&self) -> &DifficultyTier {
        &self.tiers[self.current]
    }

    pub fn is_max(&self) -> bool {
        self.current + 1 == self.tiers.len()
    }

    /// Drops back to the first tier (new run).
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Promotes by one tier if the elapsed running time crossed the current
    /// tier's threshold. Returns the new tier on promotion, `None` otherwise.
    /// Safe to call every frame.
    pub fn evaluate(&mut self, elapsed: f32) -> Option<&DifficultyTier> {
        if self.is_max() {
            return None;
        }
        if elapsed > self.current().time_threshold() {
            self.current += 1;
            tracing::info!("[difficulty] promoted to level {}", self.current().level);
            return Some(self.current());
        }
        None
    }
}

/// Monotonically non-decreasing score, scaled by the active tier multiplier.
#[derive(Debug, Clone, Default)]
pub struct Score {
    points: f64,
    multiplier: f32,
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0.0,
            multiplier: 1.0,
        }
    }

    /// Accrues points for `delta` seconds of running time.
    pub fn update(&mut self, delta: f32) {
        if delta <= 0.0 {
            return;
        }
        self.points += f64::from(delta * SCORE_RATE * self.multiplier);
    }

    pub fn set_multiplier(&mut self, multiplier: f32) {
        self.multiplier = multiplier;
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Current score, rounded down to whole points.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn value(&self) -> u64 {
        self.points as u64
    }

    /// Clears the accumulator (new run). The multiplier is reassigned by the
    /// difficulty reset that accompanies it.
    pub fn reset(&mut self) {
        self.points = 0.0;
        self.multiplier = 1.0;
    }
}
