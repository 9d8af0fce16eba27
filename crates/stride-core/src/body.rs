//! Body role tagging and classification.
//!
//! Every simulated body carries exactly one semantic role, encoded into the
//! rapier body's `user_data` (0 means untagged). Classification is a pure
//! lookup; untagged bodies classify as `None` and their contacts are ignored.

use rapier2d::prelude::RigidBodyHandle;

use crate::physics::PhysicsWorld;

const USER_DATA_RUNNER: u128 = 1;
const USER_DATA_GROUND: u128 = 2;
const USER_DATA_ENEMY: u128 = 3;

/// Semantic role of a simulated body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Runner,
    Ground,
    Enemy,
}

impl Role {
    /// Encodes the role into body `user_data`.
    pub fn encode(self) -> u128 {
        match self {
            Self::Runner => USER_DATA_RUNNER,
            Self::Ground => USER_DATA_GROUND,
            Self::Enemy => USER_DATA_ENEMY,
        }
    }

    /// Decodes body `user_data` back into a role, if tagged.
    pub fn decode(user_data: u128) -> Option<Self> {
        match user_data {
            USER_DATA_RUNNER => Some(Self::Runner),
            USER_DATA_GROUND => Some(Self::Ground),
            USER_DATA_ENEMY => Some(Self::Enemy),
            _ => None,
        }
    }
}

/// Returns the role tag of a body, or `None` if the body is missing or
/// untagged. Pure query, no side effects.
pub fn role_of(world: &PhysicsWorld, handle: RigidBodyHandle) -> Option<Role> {
    world
        .get_rigid_body(handle)
        .and_then(|body| Role::decode(body.user_data))
}
