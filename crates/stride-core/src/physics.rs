//! Physics engine collaborator built on `Rapier2D`.
//!
//! The core never reaches into solver internals; everything it needs from the
//! engine goes through this wrapper: body lifecycle, fixed stepping with
//! collision-event collection, impulse application, and collider reshaping.

use std::fmt;
use std::num::NonZeroUsize;

use parking_lot::Mutex;
use rapier2d::prelude::*;

/// Default fixed timestep for physics stepping (300 Hz).
pub const TIME_STEP: f32 = 1.0 / 300.0;

/// Default number of velocity solver iterations per step.
pub const SOLVER_ITERATIONS: usize = 6;

/// Default gravity vector (downward, in m/s²).
pub fn default_gravity() -> Vector {
    Vector::new(0.0, -10.0)
}

/// Physics world owning all `Rapier2D` solver state.
///
/// Only ever mutated from within a tick; stepping is fixed-timestep, the
/// frame-delta decoupling lives in the simulation loop.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    pub frame: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings.
    pub fn new() -> Self {
        Self::with_parameters(default_gravity(), TIME_STEP, SOLVER_ITERATIONS)
    }

    /// Creates a new physics world with custom gravity, timestep, and
    /// velocity solver iteration count.
    pub fn with_parameters(gravity: Vector, dt: f32, solver_iterations: usize) -> Self {
        let mut integration_parameters = IntegrationParameters {
            dt,
            ..Default::default()
        };
        if let Some(n) = NonZeroUsize::new(solver_iterations) {
            integration_parameters.num_solver_iterations = n.into();
        }

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity,
            frame: 0,
        }
    }

    /// Advances the simulation by one fixed timestep and returns the
    /// collision events raised during that step.
    pub fn step_with_events(&mut self) -> Vec<CollisionEvent> {
        let collector = EventCollector::default();
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &collector,
        );
        self.frame += 1;
        collector.events.into_inner()
    }

    /// Advances the simulation by one fixed timestep, discarding events.
    pub fn step(&mut self) {
        let _ = self.step_with_events();
    }

    /// Adds a rigid body to the world and returns its handle.
    pub fn add_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(rigid_body)
    }

    /// Adds a collider attached to a rigid body.
    pub fn add_collider(
        &mut self,
        collider: Collider,
        parent: RigidBodyHandle,
    ) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Removes a rigid body and its attached colliders.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Gets an immutable reference to a rigid body.
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Gets a mutable reference to a rigid body.
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Resolves the rigid body a collider is attached to.
    pub fn body_of_collider(&self, handle: ColliderHandle) -> Option<RigidBodyHandle> {
        self.collider_set.get(handle).and_then(Collider::parent)
    }

    /// Applies a one-shot linear impulse at the body's center of mass.
    pub fn apply_linear_impulse(&mut self, handle: RigidBodyHandle, impulse: Vector) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.apply_impulse(impulse, true);
        }
    }

    /// Applies a one-shot torque impulse to a body.
    pub fn apply_torque_impulse(&mut self, handle: RigidBodyHandle, impulse: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.apply_torque_impulse(impulse, true);
        }
    }

    /// Teleports a body to a new translation, waking it.
    pub fn set_body_translation(&mut self, handle: RigidBodyHandle, x: f32, y: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(Vector::new(x, y), true);
        }
    }

    /// Replaces a collider's shape with an axis-aligned box of the given
    /// half extents (used when the runner ducks into the dodge pose).
    pub fn set_box_shape(&mut self, handle: ColliderHandle, half_width: f32, half_height: f32) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_shape(SharedShape::cuboid(half_width, half_height));
        }
    }

    /// Returns the current simulation frame number.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }
}

/// Event handler that buffers collision events raised during a step.
#[derive(Default)]
struct EventCollector {
    events: Mutex<Vec<CollisionEvent>>,
}

impl EventHandler for EventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.events.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}
