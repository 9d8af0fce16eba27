//! Contact pair classification.
//!
//! Pure half of contact resolution: an unordered role pair maps to the kind
//! of resolution the stage applies. The side effects (hit bookkeeping,
//! score submission, the OVER transition) live in [`crate::stage`] so they
//! happen exactly once per begin-contact event.

use crate::body::Role;

/// What a begin-contact between two bodies means for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Fatal obstacle hit; ends the run unless the runner is already hit.
    RunnerEnemy,
    /// Landing; clears the airborne flag.
    RunnerGround,
    /// Any other pair, including untagged bodies.
    Ignored,
}

/// Classifies an unordered pair of body roles.
pub fn classify(a: Option<Role>, b: Option<Role>) -> ContactKind {
    match (a, b) {
        (Some(Role::Runner), Some(Role::Enemy)) | (Some(Role::Enemy), Some(Role::Runner)) => {
            ContactKind::RunnerEnemy
        }
        (Some(Role::Runner), Some(Role::Ground)) | (Some(Role::Ground), Some(Role::Runner)) => {
            ContactKind::RunnerGround
        }
        _ => ContactKind::Ignored,
    }
}
