//! The game stage: fixed-step simulation loop and mode transitions.
//!
//! One `tick(delta)` per render frame drives everything: elapsed-time and
//! difficulty bookkeeping, the out-of-bounds body sweep (spawn replacement
//! before destroy), fixed-timestep physics advancement through the
//! accumulator, and contact resolution — strictly after that frame's
//! stepping, strictly before the next frame's input.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rapier2d::prelude::{
    ActiveEvents, ColliderBuilder, ColliderHandle, CollisionEvent, RigidBodyBuilder,
    RigidBodyHandle, Vector,
};

use crate::body::{Role, role_of};
use crate::config::{ConfigError, StageConfig};
use crate::contact::{ContactKind, classify};
use crate::difficulty::{DifficultyTracker, Score};
use crate::game::{GameState, MenuAction};
use crate::physics::PhysicsWorld;
use crate::runner::RunnerActor;
use crate::services::{AudioService, SoundKind, StatsService};

/// Owns the physics world, the run state, and the injected collaborators.
pub struct GameStage {
    config: StageConfig,
    world: PhysicsWorld,
    ground: RigidBodyHandle,
    runner: Option<RunnerActor>,
    state: GameState,
    difficulty: DifficultyTracker,
    score: Score,
    elapsed: f32,
    accumulator: f32,
    rng: ChaCha8Rng,
    audio: Box<dyn AudioService>,
    stats: Box<dyn StatsService>,
}

impl GameStage {
    /// Builds the base scene (world plus ground) in the OVER state.
    pub fn new(
        config: StageConfig,
        audio: Box<dyn AudioService>,
        stats: Box<dyn StatsService>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = build_world(&config);
        let ground = spawn_ground(&mut world, &config);
        let difficulty = DifficultyTracker::new(config.tiers.clone());
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            world,
            ground,
            runner: None,
            state: GameState::Over,
            difficulty,
            score: Score::new(),
            elapsed: 0.0,
            accumulator: 0.0,
            rng,
            audio,
            stats,
        })
    }

    /// Advances the stage by one render frame.
    pub fn tick(&mut self, delta: f32) {
        // PAUSED is a full freeze: no accumulator growth, no sweep.
        if self.state == GameState::Paused {
            return;
        }

        if self.state.simulates() {
            self.elapsed += delta;
            self.update_difficulty();
            self.score.update(delta);
        }

        self.sweep_bodies();

        self.accumulator += delta;
        let mut events = Vec::new();
        while self.accumulator >= self.config.time_step {
            events.extend(self.world.step_with_events());
            self.accumulator -= self.config.time_step;
        }

        for event in events {
            if let CollisionEvent::Started(a, b, _) = event {
                self.resolve_contact(a, b);
            }
        }
    }

    /// Dispatches a menu command. Commands without a transition in the
    /// current state are no-ops; returns whether anything happened.
    pub fn apply_menu(&mut self, action: MenuAction) -> bool {
        match action {
            MenuAction::Start => self.start(),
            MenuAction::Pause => self.pause(),
            MenuAction::Resume => self.resume(),
            MenuAction::ToggleAbout => self.toggle_about(),
            MenuAction::Leaderboard => self.open_leaderboard(),
            MenuAction::ToggleSound => {
                self.audio.toggle_sound();
                true
            }
            MenuAction::ToggleMusic => {
                self.audio.toggle_music();
                true
            }
        }
    }

    /// OVER → RUNNING: rebuilds the world, respawns the runner and ground,
    /// resets difficulty, score, and elapsed time, spawns the first enemy.
    pub fn start(&mut self) -> bool {
        if self.state != GameState::Over {
            return false;
        }
        self.reset_world();
        self.runner = Some(RunnerActor::spawn(&mut self.world, &self.config.runner));
        self.difficulty.reset();
        self.score.reset();
        self.score
            .set_multiplier(self.difficulty.current().score_multiplier);
        self.elapsed = 0.0;
        self.spawn_enemy();
        self.state = GameState::Running;
        tracing::info!("[stage] run started");
        true
    }

    /// RUNNING → PAUSED. No world reset.
    pub fn pause(&mut self) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        self.state = GameState::Paused;
        true
    }

    /// PAUSED → RUNNING. No world reset.
    pub fn resume(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.state = GameState::Running;
        true
    }

    /// OVER ↔ ABOUT toggle; CHOICE backs out to OVER.
    pub fn toggle_about(&mut self) -> bool {
        match self.state {
            GameState::Over => {
                self.state = GameState::About;
                true
            }
            GameState::About | GameState::Choice => {
                self.state = GameState::Over;
                true
            }
            _ => false,
        }
    }

    /// OVER → CHOICE, rebuilding the base scene.
    pub fn open_leaderboard(&mut self) -> bool {
        if self.state != GameState::Over {
            return false;
        }
        self.reset_world();
        self.state = GameState::Choice;
        true
    }

    /// Jump input (right gameplay zone). Applies at most one impulse per
    /// airborne period; plays the jump sound when it does.
    pub fn runner_jump(&mut self) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let Some(runner) = self.runner.as_mut() else {
            return false;
        };
        if runner.jump(&mut self.world) {
            self.audio.play_sound(SoundKind::Jump);
            true
        } else {
            false
        }
    }

    /// Dodge input (left gameplay zone).
    pub fn runner_dodge(&mut self) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let Some(runner) = self.runner.as_mut() else {
            return false;
        };
        runner.dodge(&mut self.world)
    }

    /// Pointer release while dodging.
    pub fn runner_stop_dodge(&mut self) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let Some(runner) = self.runner.as_mut() else {
            return false;
        };
        runner.stop_dodge(&mut self.world)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score_value(&self) -> u64 {
        self.score.value()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn difficulty(&self) -> &DifficultyTracker {
        &self.difficulty
    }

    pub fn runner(&self) -> Option<&RunnerActor> {
        self.runner.as_ref()
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn ground_handle(&self) -> RigidBodyHandle {
        self.ground
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Number of live Enemy-tagged bodies.
    pub fn enemy_count(&self) -> usize {
        self.world
            .rigid_body_set
            .iter()
            .filter(|(_, body)| Role::decode(body.user_data) == Some(Role::Enemy))
            .count()
    }

    /// Queries the difficulty tracker and applies promotion side effects:
    /// runner hook and score multiplier. Called every running frame.
    fn update_difficulty(&mut self) {
        if let Some(tier) = self.difficulty.evaluate(self.elapsed) {
            let multiplier = tier.score_multiplier;
            if let Some(runner) = self.runner.as_mut() {
                runner.on_difficulty_change(tier);
            }
            self.score.set_multiplier(multiplier);
        }
    }

    /// Two-phase out-of-bounds sweep: collect doomed bodies first, then
    /// spawn replacements and destroy. An out-of-bounds enemy is replaced
    /// only while the run is alive; stray bodies are destroyed regardless.
    fn sweep_bodies(&mut self) {
        let bounds = self.config.bounds;
        let doomed: Vec<(RigidBodyHandle, Option<Role>)> = self
            .world
            .rigid_body_set
            .iter()
            .filter(|(_, body)| {
                let x = body.translation().x;
                x < bounds.min_x || x > bounds.max_x
            })
            .map(|(handle, body)| (handle, Role::decode(body.user_data)))
            .collect();

        let run_alive = self.runner.as_ref().is_some_and(|r| !r.is_hit());
        for (handle, role) in doomed {
            if role == Some(Role::Enemy) && run_alive {
                self.spawn_enemy();
            }
            self.world.remove_rigid_body(handle);
        }
    }

    /// Spawns one enemy at the spawn edge with the current tier's velocity,
    /// picking a seeded-random archetype.
    fn spawn_enemy(&mut self) {
        let index = self.rng.random_range(0..self.config.enemy.archetypes.len());
        let archetype = &self.config.enemy.archetypes[index];
        let [vx, vy] = self.difficulty.current().enemy_velocity;

        let body = RigidBodyBuilder::kinematic_velocity_based()
            .translation(Vector::new(self.config.enemy.spawn_x, archetype.y))
            .linvel(Vector::new(vx, vy))
            .user_data(Role::Enemy.encode())
            .build();
        let handle = self.world.add_rigid_body(body);

        let collider = ColliderBuilder::cuboid(archetype.half_width, archetype.half_height)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.world.add_collider(collider, handle);

        tracing::debug!(
            "[stage] spawned enemy '{}' at vx={vx}",
            archetype.name
        );
    }

    /// Resolves one begin-contact event, exactly once per physical event.
    fn resolve_contact(&mut self, a: ColliderHandle, b: ColliderHandle) {
        let role_a = self
            .world
            .body_of_collider(a)
            .and_then(|h| role_of(&self.world, h));
        let role_b = self
            .world
            .body_of_collider(b)
            .and_then(|h| role_of(&self.world, h));

        match classify(role_a, role_b) {
            ContactKind::RunnerEnemy => {
                {
                    let Some(runner) = self.runner.as_mut() else {
                        return;
                    };
                    // Simultaneous multi-fixture contacts resolve once.
                    if runner.is_hit() {
                        return;
                    }
                    runner.hit(&mut self.world);
                }
                self.audio.play_sound(SoundKind::Hit);
                self.stats.submit_score(self.score.value());
                self.enter_over();
                self.stats.record_game_played();
                let jumps = self.runner.as_ref().map_or(0, RunnerActor::jump_count);
                self.stats.record_jump_count(jumps);
            }
            ContactKind::RunnerGround => {
                if let Some(runner) = self.runner.as_mut() {
                    runner.landed();
                }
            }
            ContactKind::Ignored => {}
        }
    }

    /// Hit event: RUNNING → OVER. Score was already submitted by the
    /// contact resolution; difficulty and elapsed time reset here.
    fn enter_over(&mut self) {
        tracing::info!("[stage] run over (score={})", self.score.value());
        self.state = GameState::Over;
        self.difficulty.reset();
        self.elapsed = 0.0;
    }

    /// Rebuilds the base scene: fresh world and ground, no runner. The
    /// accumulator is deliberately left alone; it is reset only at
    /// construction.
    fn reset_world(&mut self) {
        self.world = build_world(&self.config);
        self.ground = spawn_ground(&mut self.world, &self.config);
        self.runner = None;
    }
}

fn build_world(config: &StageConfig) -> PhysicsWorld {
    let [gx, gy] = config.gravity;
    PhysicsWorld::with_parameters(
        Vector::new(gx, gy),
        config.time_step,
        config.solver_iterations,
    )
}

fn spawn_ground(world: &mut PhysicsWorld, config: &StageConfig) -> RigidBodyHandle {
    let ground = config.ground;
    let body = RigidBodyBuilder::fixed()
        .translation(Vector::new(ground.x, ground.y))
        .user_data(Role::Ground.encode())
        .build();
    let handle = world.add_rigid_body(body);

    let collider = ColliderBuilder::cuboid(ground.half_width, ground.half_height)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build();
    world.add_collider(collider, handle);
    handle
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::services::{NullAudio, NullStats};

    #[derive(Default)]
    struct RecordingStats {
        submitted: RefCell<Vec<u64>>,
        games: Cell<u32>,
        jumps: Cell<u32>,
    }

    impl StatsService for RecordingStats {
        fn submit_score(&self, value: u64) {
            self.submitted.borrow_mut().push(value);
        }
        fn record_game_played(&self) {
            self.games.set(self.games.get() + 1);
        }
        fn record_jump_count(&self, jumps: u32) {
            self.jumps.set(self.jumps.get() + jumps);
        }
    }

    #[derive(Default)]
    struct RecordingAudio {
        sounds: RefCell<Vec<SoundKind>>,
        sound_toggles: Cell<u32>,
    }

    impl AudioService for RecordingAudio {
        fn play_sound(&self, kind: SoundKind) {
            self.sounds.borrow_mut().push(kind);
        }
        fn toggle_sound(&self) {
            self.sound_toggles.set(self.sound_toggles.get() + 1);
        }
        fn toggle_music(&self) {}
    }

    fn stage() -> GameStage {
        GameStage::new(
            StageConfig::default(),
            Box::new(NullAudio),
            Box::new(NullStats),
        )
        .unwrap()
    }

    fn stage_with_stats() -> (GameStage, Rc<RecordingStats>) {
        let stats = Rc::new(RecordingStats::default());
        let stage = GameStage::new(
            StageConfig::default(),
            Box::new(NullAudio),
            Box::new(Rc::clone(&stats)),
        )
        .unwrap();
        (stage, stats)
    }

    fn enemy_collider(stage: &GameStage) -> ColliderHandle {
        stage
            .world()
            .collider_set
            .iter()
            .find(|(_, collider)| {
                collider
                    .parent()
                    .and_then(|h| role_of(stage.world(), h))
                    == Some(Role::Enemy)
            })
            .map(|(handle, _)| handle)
            .expect("no enemy in world")
    }

    fn ground_collider(stage: &GameStage) -> ColliderHandle {
        stage
            .world()
            .collider_set
            .iter()
            .find(|(_, collider)| {
                collider
                    .parent()
                    .and_then(|h| role_of(stage.world(), h))
                    == Some(Role::Ground)
            })
            .map(|(handle, _)| handle)
            .expect("no ground in world")
    }

    #[test]
    fn test_initial_state() {
        let stage = stage();
        assert_eq!(stage.state(), GameState::Over);
        assert!(stage.runner().is_none());
        assert_eq!(stage.enemy_count(), 0);
        assert_eq!(stage.accumulator(), 0.0);
    }

    #[test]
    fn test_start_spawns_runner_and_first_enemy() {
        let mut stage = stage();
        assert!(stage.start());
        assert_eq!(stage.state(), GameState::Running);
        assert!(stage.runner().is_some());
        assert_eq!(stage.enemy_count(), 1);
        assert_eq!(stage.score_value(), 0);
        assert_eq!(stage.difficulty().current().level, 1);

        // Start is only valid from OVER.
        assert!(!stage.start());
    }

    #[test]
    fn test_accumulator_floor_mod_arithmetic() {
        let mut stage = stage();
        let dt = stage.config().time_step;

        let delta = 0.0345;
        stage.tick(delta);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected_steps = (delta / dt) as u64;
        assert_eq!(stage.world().current_frame(), expected_steps);

        #[allow(clippy::cast_precision_loss)]
        let expected_accumulator = delta - expected_steps as f32 * dt;
        assert!((stage.accumulator() - expected_accumulator).abs() < 1e-5);

        // A second frame carries the remainder forward.
        stage.tick(delta);
        let total = 2.0 * delta;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected_steps = (total / dt) as u64;
        assert_eq!(stage.world().current_frame(), expected_steps);
    }

    #[test]
    fn test_paused_tick_is_a_full_freeze() {
        let mut stage = stage();
        stage.start();
        stage.tick(0.1);

        let frame = stage.world().current_frame();
        let accumulator = stage.accumulator();
        let elapsed = stage.elapsed();

        assert!(stage.pause());
        stage.tick(0.5);

        assert_eq!(stage.world().current_frame(), frame);
        assert_eq!(stage.accumulator(), accumulator);
        assert_eq!(stage.elapsed(), elapsed);

        assert!(stage.resume());
        assert_eq!(stage.state(), GameState::Running);
    }

    #[test]
    fn test_elapsed_advances_only_while_running() {
        let mut stage = stage();
        stage.tick(0.2);
        assert_eq!(stage.elapsed(), 0.0);

        stage.start();
        stage.tick(0.2);
        assert!(stage.elapsed() > 0.0);
    }

    #[test]
    fn test_difficulty_promotes_after_six_seconds() {
        let mut stage = stage();
        stage.start();

        // 6.1 seconds of running time in 0.1s frames.
        for _ in 0..61 {
            stage.tick(0.1);
        }

        assert_eq!(stage.difficulty().current().level, 2);
        assert_eq!(stage.difficulty().current().score_multiplier, 2.0);
        assert_eq!(stage.runner().unwrap().tier_level(), 2);
    }

    #[test]
    fn test_hit_resolves_exactly_once() {
        let (mut stage, stats) = stage_with_stats();
        stage.start();
        stage.runner_jump();
        let score_before = {
            stage.tick(1.0);
            stage.score_value()
        };

        let enemy = enemy_collider(&stage);
        let runner = stage.runner().unwrap().collider_handle();

        stage.resolve_contact(runner, enemy);
        assert!(stage.runner().unwrap().is_hit());
        assert_eq!(stage.state(), GameState::Over);
        assert_eq!(stage.elapsed(), 0.0);
        assert_eq!(stage.difficulty().current().level, 1);

        // Duplicate contact in the same frame: no double submission.
        stage.resolve_contact(enemy, runner);

        assert_eq!(stats.submitted.borrow().len(), 1);
        assert!(stats.submitted.borrow()[0] >= score_before);
        assert_eq!(stats.games.get(), 1);
        assert_eq!(stats.jumps.get(), 1);
    }

    #[test]
    fn test_ground_contact_clears_jumping() {
        let mut stage = stage();
        stage.start();
        stage.runner_jump();
        assert!(stage.runner().unwrap().is_jumping());

        let ground = ground_collider(&stage);
        let runner = stage.runner().unwrap().collider_handle();
        stage.resolve_contact(ground, runner);

        assert!(!stage.runner().unwrap().is_jumping());

        // Idempotent regardless of prior value.
        stage.resolve_contact(ground, runner);
        assert!(!stage.runner().unwrap().is_jumping());
    }

    #[test]
    fn test_out_of_bounds_enemy_is_replaced_while_alive() {
        let mut stage = stage();
        stage.start();
        assert_eq!(stage.enemy_count(), 1);

        let enemy_body = stage
            .world()
            .collider_set
            .get(enemy_collider(&stage))
            .unwrap()
            .parent()
            .unwrap();
        let min_x = stage.config().bounds.min_x;
        stage.world.set_body_translation(enemy_body, min_x - 1.0, 1.0);

        // Sweep runs inside the tick; zero delta keeps physics still.
        stage.tick(0.0);
        assert_eq!(stage.enemy_count(), 1);
        assert!(
            stage.world().get_rigid_body(enemy_body).is_none(),
            "stale enemy must be destroyed"
        );
    }

    #[test]
    fn test_out_of_bounds_enemy_not_replaced_after_hit() {
        let mut stage = stage();
        stage.start();

        let enemy = enemy_collider(&stage);
        let runner = stage.runner().unwrap().collider_handle();
        stage.resolve_contact(runner, enemy);

        let enemy_body = stage
            .world()
            .collider_set
            .get(enemy_collider(&stage))
            .unwrap()
            .parent()
            .unwrap();
        let min_x = stage.config().bounds.min_x;
        stage.world.set_body_translation(enemy_body, min_x - 1.0, 1.0);

        stage.tick(0.0);
        assert_eq!(stage.enemy_count(), 0);
    }

    #[test]
    fn test_menu_transition_table() {
        let mut stage = stage();

        // No-ops from OVER.
        assert!(!stage.pause());
        assert!(!stage.resume());

        // OVER <-> ABOUT.
        assert!(stage.apply_menu(MenuAction::ToggleAbout));
        assert_eq!(stage.state(), GameState::About);
        assert!(!stage.apply_menu(MenuAction::Start));
        assert!(!stage.apply_menu(MenuAction::Leaderboard));
        assert!(stage.apply_menu(MenuAction::ToggleAbout));
        assert_eq!(stage.state(), GameState::Over);

        // OVER -> CHOICE, back out to OVER.
        assert!(stage.apply_menu(MenuAction::Leaderboard));
        assert_eq!(stage.state(), GameState::Choice);
        assert!(!stage.apply_menu(MenuAction::Leaderboard));
        assert!(stage.apply_menu(MenuAction::ToggleAbout));
        assert_eq!(stage.state(), GameState::Over);

        // Full run cycle.
        assert!(stage.apply_menu(MenuAction::Start));
        assert!(stage.apply_menu(MenuAction::Pause));
        assert!(!stage.apply_menu(MenuAction::Start));
        assert!(stage.apply_menu(MenuAction::Resume));
        assert_eq!(stage.state(), GameState::Running);
    }

    #[test]
    fn test_sound_toggle_routed_to_audio_service() {
        let audio = Rc::new(RecordingAudio::default());
        let mut stage = GameStage::new(
            StageConfig::default(),
            Box::new(Rc::clone(&audio)),
            Box::new(NullStats),
        )
        .unwrap();

        assert!(stage.apply_menu(MenuAction::ToggleSound));
        assert_eq!(audio.sound_toggles.get(), 1);
    }

    #[test]
    fn test_jump_plays_sound_once() {
        let audio = Rc::new(RecordingAudio::default());
        let mut stage = GameStage::new(
            StageConfig::default(),
            Box::new(Rc::clone(&audio)),
            Box::new(NullStats),
        )
        .unwrap();
        stage.start();

        assert!(stage.runner_jump());
        assert!(!stage.runner_jump());
        assert_eq!(audio.sounds.borrow().as_slice(), &[SoundKind::Jump]);
    }

    #[test]
    fn test_gameplay_inputs_ignored_outside_running() {
        let mut stage = stage();
        assert!(!stage.runner_jump());
        assert!(!stage.runner_dodge());
        assert!(!stage.runner_stop_dodge());

        stage.start();
        stage.pause();
        assert!(!stage.runner_jump());
    }

    #[test]
    fn test_deterministic_enemy_archetypes_per_seed() {
        let spawn_names = |seed: u64| -> Vec<String> {
            let mut config = StageConfig::default();
            config.seed = seed;
            let mut stage =
                GameStage::new(config, Box::new(NullAudio), Box::new(NullStats)).unwrap();
            stage.start();
            let mut names = Vec::new();
            for _ in 0..8 {
                let enemy_body = stage
                    .world()
                    .collider_set
                    .get(enemy_collider(&stage))
                    .unwrap()
                    .parent()
                    .unwrap();
                let half_height = stage
                    .world()
                    .collider_set
                    .get(enemy_collider(&stage))
                    .unwrap()
                    .shape()
                    .as_cuboid()
                    .unwrap()
                    .half_extents
                    .y;
                names.push(format!("{half_height}"));
                let min_x = stage.config().bounds.min_x;
                stage
                    .world
                    .set_body_translation(enemy_body, min_x - 1.0, 1.0);
                stage.tick(0.0);
            }
            names
        };

        assert_eq!(spawn_names(7), spawn_names(7));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = StageConfig::default();
        config.tiers.clear();
        let result = GameStage::new(config, Box::new(NullAudio), Box::new(NullStats));
        assert!(matches!(result, Err(ConfigError::NoTiers)));
    }
}

