//! Stage configuration.
//!
//! All world geometry, physics tuning, and the difficulty tier table live
//! here so the simulation core stays data-driven and testable with small
//! worlds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::difficulty::DifficultyTier;
use crate::physics::{SOLVER_ITERATIONS, TIME_STEP};

/// Configuration validation error.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("difficulty tier table is empty")]
    NoTiers,
    #[error("difficulty tier levels must be strictly ascending (tier index {0})")]
    TierOrder(usize),
    #[error("fixed timestep must be positive, got {0}")]
    TimeStep(f32),
    #[error("solver iterations must be at least 1")]
    SolverIterations,
    #[error("world bounds are degenerate ({min_x} >= {max_x})")]
    Bounds { min_x: f32, max_x: f32 },
    #[error("enemy archetype list is empty")]
    NoArchetypes,
    #[error("viewport must have positive extent")]
    Viewport,
}

/// Horizontal extent of the live world; bodies outside it are destroyed by
/// the per-frame sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: f32,
    pub max_x: f32,
}

/// Static ground strip the runner lands on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroundConfig {
    pub x: f32,
    pub y: f32,
    pub half_width: f32,
    pub half_height: f32,
}

/// Runner body geometry, impulses, and dodge pose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub x: f32,
    pub y: f32,
    pub half_width: f32,
    pub half_height: f32,
    pub density: f32,
    pub gravity_scale: f32,
    /// Linear impulse applied once per airborne period.
    pub jump_impulse: [f32; 2],
    /// Torque impulse applied on the fatal hit (tumble).
    pub hit_spin_impulse: f32,
    /// Collider half extents while dodging.
    pub dodge_half_extents: [f32; 2],
    /// Body center height while dodging.
    pub dodge_y: f32,
}

/// One enemy body shape the spawner can pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub name: String,
    pub half_width: f32,
    pub half_height: f32,
    /// Body center height at spawn (flying archetypes sit above the runner).
    pub y: f32,
}

/// Enemy spawning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Spawn edge; enemies enter here and travel toward the runner.
    pub spawn_x: f32,
    pub archetypes: Vec<EnemyArchetype>,
}

/// Complete stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Viewport extent in world units; menu bounds and the jump/dodge zones
    /// are laid out against it.
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub bounds: WorldBounds,
    pub gravity: [f32; 2],
    pub time_step: f32,
    pub solver_iterations: usize,
    pub ground: GroundConfig,
    pub runner: RunnerConfig,
    pub enemy: EnemyConfig,
    /// Ordered difficulty tiers; promotion threshold is `level * 5` seconds.
    pub tiers: Vec<DifficultyTier>,
    /// Seed for enemy archetype selection.
    pub seed: u64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 480.0,
            bounds: WorldBounds {
                min_x: -5.0,
                max_x: 30.0,
            },
            gravity: [0.0, -10.0],
            time_step: TIME_STEP,
            solver_iterations: SOLVER_ITERATIONS,
            ground: GroundConfig {
                x: 12.5,
                y: -1.0,
                half_width: 12.5,
                half_height: 1.0,
            },
            runner: RunnerConfig {
                x: 2.0,
                y: 1.0,
                half_width: 0.5,
                half_height: 1.0,
                density: 0.5,
                gravity_scale: 3.0,
                jump_impulse: [0.0, 13.0],
                hit_spin_impulse: 2.0,
                dodge_half_extents: [1.0, 0.5],
                dodge_y: 0.5,
            },
            enemy: EnemyConfig {
                spawn_x: 25.0,
                archetypes: vec![
                    EnemyArchetype {
                        name: "running_small".into(),
                        half_width: 0.5,
                        half_height: 0.5,
                        y: 0.55,
                    },
                    EnemyArchetype {
                        name: "running_long".into(),
                        half_width: 1.0,
                        half_height: 0.5,
                        y: 0.55,
                    },
                    EnemyArchetype {
                        name: "running_big".into(),
                        half_width: 0.5,
                        half_height: 0.75,
                        y: 0.8,
                    },
                    EnemyArchetype {
                        name: "flying_small".into(),
                        half_width: 0.5,
                        half_height: 0.25,
                        y: 2.0,
                    },
                    EnemyArchetype {
                        name: "flying_wide".into(),
                        half_width: 1.0,
                        half_height: 0.25,
                        y: 2.0,
                    },
                ],
            },
            tiers: vec![
                DifficultyTier::new(1, [-10.0, 0.0], 1.0),
                DifficultyTier::new(2, [-12.0, 0.0], 2.0),
                DifficultyTier::new(3, [-14.0, 0.0], 3.0),
                DifficultyTier::new(4, [-16.0, 0.0], 4.0),
                DifficultyTier::new(5, [-18.0, 0.0], 5.0),
            ],
            seed: 0,
        }
    }
}

impl StageConfig {
    /// Validates the configuration. Construction of a stage fails fast on
    /// the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        for (index, pair) in self.tiers.windows(2).enumerate() {
            if pair[1].level <= pair[0].level {
                return Err(ConfigError::TierOrder(index + 1));
            }
        }
        if self.time_step <= 0.0 {
            return Err(ConfigError::TimeStep(self.time_step));
        }
        if self.solver_iterations == 0 {
            return Err(ConfigError::SolverIterations);
        }
        if self.bounds.min_x >= self.bounds.max_x {
            return Err(ConfigError::Bounds {
                min_x: self.bounds.min_x,
                max_x: self.bounds.max_x,
            });
        }
        if self.enemy.archetypes.is_empty() {
            return Err(ConfigError::NoArchetypes);
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(ConfigError::Viewport);
        }
        Ok(())
    }
}
