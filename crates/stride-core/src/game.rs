//! High-level game modes and menu commands.

use serde::{Deserialize, Serialize};

/// The finite set of high-level game modes. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Main menu shown, no active run.
    #[default]
    Over,
    /// Active play.
    Running,
    /// Frozen run, resumable.
    Paused,
    /// Credits screen.
    About,
    /// Leaderboard / selection view.
    Choice,
}

impl GameState {
    /// Whether running time and difficulty advance in this state.
    pub fn simulates(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Menu commands dispatched by the input router. Each active menu control is
/// bound to one of these; invalid commands for the current state are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Start,
    Pause,
    Resume,
    ToggleAbout,
    Leaderboard,
    ToggleSound,
    ToggleMusic,
}
