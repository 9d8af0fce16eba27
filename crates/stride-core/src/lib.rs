//! Stride Core Library
//!
//! Simulation core of a single-lane runner game: a fixed-step physics driver
//! on top of `Rapier2D`, the game-state machine, contact resolution, and the
//! monotonic difficulty progression.
//!
//! Rendering, audio playback, persisted preferences, and leaderboards are
//! external collaborators; the core talks to them through the traits in
//! [`services`] and [`input`].

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod body;
pub mod config;
pub mod contact;
pub mod difficulty;
pub mod game;
pub mod input;
pub mod physics;
pub mod runner;
pub mod services;
pub mod stage;

pub use body::{Role, role_of};
pub use config::{ConfigError, EnemyArchetype, EnemyConfig, GroundConfig, RunnerConfig, StageConfig, WorldBounds};
pub use contact::ContactKind;
pub use difficulty::{DifficultyTier, DifficultyTracker, Score, TIER_SECONDS};
pub use game::{GameState, MenuAction};
pub use input::{Camera, InputRouter, Rect, StretchViewport};
pub use physics::{PhysicsWorld, TIME_STEP, default_gravity};
pub use runner::RunnerActor;
pub use services::{AudioService, NullAudio, NullStats, SoundKind, StatsService};
pub use stage::GameStage;
