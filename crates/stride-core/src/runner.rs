//! The player actor.
//!
//! `RunnerActor` wraps the runner-tagged body and owns the action state
//! machine: grounded/jumping and upright/dodging, plus the sticky hit flag
//! that ends the run. Every transition is guarded so repeated inputs are
//! silent no-ops, never errors.

use rapier2d::prelude::{
    ActiveEvents, ColliderBuilder, ColliderHandle, RigidBodyBuilder, RigidBodyHandle, Vector,
};

use crate::body::Role;
use crate::config::RunnerConfig;
use crate::difficulty::DifficultyTier;
use crate::physics::PhysicsWorld;

/// The player's actor state, bound to one Runner-tagged body.
#[derive(Debug)]
pub struct RunnerActor {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    config: RunnerConfig,
    jumping: bool,
    dodging: bool,
    hit: bool,
    jump_count: u32,
    tier_level: u32,
}

impl RunnerActor {
    /// Spawns the runner body into the world and returns the actor wrapping
    /// it. Spawns grounded, upright, and unhit.
    pub fn spawn(world: &mut PhysicsWorld, config: &RunnerConfig) -> Self {
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(config.x, config.y))
            .gravity_scale(config.gravity_scale)
            .user_data(Role::Runner.encode())
            .ccd_enabled(true)
            .build();
        let body_handle = world.add_rigid_body(body);

        let collider = ColliderBuilder::cuboid(config.half_width, config.half_height)
            .density(config.density)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle = world.add_collider(collider, body_handle);

        Self {
            body: body_handle,
            collider: collider_handle,
            config: config.clone(),
            jumping: false,
            dodging: false,
            hit: false,
            jump_count: 0,
            tier_level: 1,
        }
    }

    /// Applies the jump impulse if the runner can jump: not airborne, not
    /// dodging, not hit. At most one impulse per airborne period; cleared by
    /// [`Self::landed`]. Returns whether the impulse was applied.
    pub fn jump(&mut self, world: &mut PhysicsWorld) -> bool {
        if self.jumping || self.dodging || self.hit {
            return false;
        }
        let [ix, iy] = self.config.jump_impulse;
        world.apply_linear_impulse(self.body, Vector::new(ix, iy));
        self.jumping = true;
        self.jump_count += 1;
        true
    }

    /// Clears the airborne flag. Idempotent; called on every Runner-Ground
    /// contact.
    pub fn landed(&mut self) {
        self.jumping = false;
    }

    /// Ducks into the dodge pose: the collider shrinks to the dodge extents
    /// and the body drops to the dodge height. No-op while airborne, already
    /// dodging, or hit. Returns whether the pose changed.
    pub fn dodge(&mut self, world: &mut PhysicsWorld) -> bool {
        if self.dodging || self.jumping || self.hit {
            return false;
        }
        let [hx, hy] = self.config.dodge_half_extents;
        world.set_box_shape(self.collider, hx, hy);
        let x = self.translation_x(world);
        world.set_body_translation(self.body, x, self.config.dodge_y);
        self.dodging = true;
        true
    }

    /// Stands back up. No-op if not dodging; a hit runner stays down.
    pub fn stop_dodge(&mut self, world: &mut PhysicsWorld) -> bool {
        if !self.dodging {
            return false;
        }
        self.dodging = false;
        if !self.hit {
            world.set_box_shape(self.collider, self.config.half_width, self.config.half_height);
            let x = self.translation_x(world);
            world.set_body_translation(self.body, x, self.config.y);
        }
        true
    }

    /// Marks the runner as hit and applies the tumble impulse. Sticky for
    /// the rest of the run; later calls are no-ops. Returns whether this
    /// call resolved the hit.
    pub fn hit(&mut self, world: &mut PhysicsWorld) -> bool {
        if self.hit {
            return false;
        }
        self.hit = true;
        world.apply_torque_impulse(self.body, self.config.hit_spin_impulse);
        true
    }

    /// Hook for tier promotions (animation speed, visuals); the core only
    /// records the level.
    pub fn on_difficulty_change(&mut self, tier: &DifficultyTier) {
        self.tier_level = tier.level;
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn is_dodging(&self) -> bool {
        self.dodging
    }

    pub fn is_hit(&self) -> bool {
        self.hit
    }

    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    pub fn tier_level(&self) -> u32 {
        self.tier_level
    }

    pub fn body_handle(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn collider_handle(&self) -> ColliderHandle {
        self.collider
    }

    fn translation_x(&self, world: &PhysicsWorld) -> f32 {
        world
            .get_rigid_body(self.body)
            .map_or(self.config.x, |body| body.translation().x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;

    fn setup() -> (PhysicsWorld, RunnerActor) {
        let config = StageConfig::default();
        let mut world = PhysicsWorld::new();
        let runner = RunnerActor::spawn(&mut world, &config.runner);
        (world, runner)
    }

    fn velocity_y(world: &PhysicsWorld, runner: &RunnerActor) -> f32 {
        world
            .get_rigid_body(runner.body_handle())
            .unwrap()
            .linvel()
            .y
    }

    #[test]
    fn test_spawn_is_grounded_and_tagged() {
        let (world, runner) = setup();
        assert!(!runner.is_jumping());
        assert!(!runner.is_dodging());
        assert!(!runner.is_hit());
        assert_eq!(
            crate::body::role_of(&world, runner.body_handle()),
            Some(Role::Runner)
        );
    }

    #[test]
    fn test_single_impulse_per_airborne_period() {
        let (mut world, mut runner) = setup();

        assert!(runner.jump(&mut world));
        let vy_after_first = velocity_y(&world, &runner);
        assert!(vy_after_first > 0.0);

        // Repeated jumps while airborne apply nothing.
        for _ in 0..5 {
            assert!(!runner.jump(&mut world));
        }
        assert_eq!(velocity_y(&world, &runner), vy_after_first);
        assert_eq!(runner.jump_count(), 1);

        runner.landed();
        assert!(runner.jump(&mut world));
        assert_eq!(runner.jump_count(), 2);
    }

    #[test]
    fn test_landed_is_idempotent() {
        let (mut world, mut runner) = setup();
        runner.jump(&mut world);
        runner.landed();
        runner.landed();
        assert!(!runner.is_jumping());
    }

    #[test]
    fn test_dodge_reshapes_collider() {
        let (mut world, mut runner) = setup();

        assert!(runner.dodge(&mut world));
        assert!(runner.is_dodging());
        let cuboid = world
            .collider_set
            .get(runner.collider_handle())
            .unwrap()
            .shape()
            .as_cuboid()
            .unwrap();
        assert_eq!(cuboid.half_extents.y, 0.5);

        // Already dodging: no-op.
        assert!(!runner.dodge(&mut world));

        assert!(runner.stop_dodge(&mut world));
        let cuboid = world
            .collider_set
            .get(runner.collider_handle())
            .unwrap()
            .shape()
            .as_cuboid()
            .unwrap();
        assert_eq!(cuboid.half_extents.y, 1.0);

        // Not dodging: no-op.
        assert!(!runner.stop_dodge(&mut world));
    }

    #[test]
    fn test_no_dodge_while_airborne() {
        let (mut world, mut runner) = setup();
        runner.jump(&mut world);
        assert!(!runner.dodge(&mut world));
    }

    #[test]
    fn test_no_jump_while_dodging() {
        let (mut world, mut runner) = setup();
        runner.dodge(&mut world);
        assert!(!runner.jump(&mut world));
    }

    #[test]
    fn test_hit_is_sticky() {
        let (mut world, mut runner) = setup();

        assert!(runner.hit(&mut world));
        assert!(runner.is_hit());
        assert!(!runner.hit(&mut world));
        assert!(runner.is_hit());

        // A hit runner no longer responds to inputs.
        assert!(!runner.jump(&mut world));
        assert!(!runner.dodge(&mut world));
    }

    #[test]
    fn test_hit_runner_stays_down() {
        let (mut world, mut runner) = setup();
        runner.dodge(&mut world);
        runner.hit(&mut world);

        assert!(runner.stop_dodge(&mut world));
        let cuboid = world
            .collider_set
            .get(runner.collider_handle())
            .unwrap()
            .shape()
            .as_cuboid()
            .unwrap();
        // Shape untouched after the hit.
        assert_eq!(cuboid.half_extents.y, 0.5);
    }

    #[test]
    fn test_difficulty_hook_records_level() {
        let (_, mut runner) = setup();
        runner.on_difficulty_change(&DifficultyTier::new(3, [-14.0, 0.0], 3.0));
        assert_eq!(runner.tier_level(), 3);
    }
}
