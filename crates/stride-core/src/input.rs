//! Pointer input routing.
//!
//! Screen coordinates come from the platform shell, get translated to world
//! coordinates through the camera collaborator, and are hit-tested against
//! the menu controls active in the current mode. Menu controls always win
//! over the gameplay zones; the gameplay zones only apply while running.

use crate::game::{GameState, MenuAction};
use crate::stage::GameStage;

/// Axis-aligned rectangle in world units, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// Screen-to-world translation, provided by the rendering side.
pub trait Camera {
    fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> (f32, f32);
}

/// Reference camera: stretches the screen onto the world viewport and flips
/// the y axis (screen y grows downward, world y grows upward).
#[derive(Debug, Clone, Copy)]
pub struct StretchViewport {
    pub screen_width: f32,
    pub screen_height: f32,
    pub world_width: f32,
    pub world_height: f32,
}

impl Camera for StretchViewport {
    fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        let x = screen_x / self.screen_width * self.world_width;
        let y = (self.screen_height - screen_y) / self.screen_height * self.world_height;
        (x, y)
    }
}

/// Hit-tests pointer events against menu controls and gameplay zones.
///
/// Control bounds are fixed fractions of the viewport. Sound and music
/// toggles are part of the fixed menu and stay active in every mode; the
/// remaining controls depend on the current mode.
#[derive(Debug, Clone)]
pub struct InputRouter {
    sound: Rect,
    music: Rect,
    pause: Rect,
    start: Rect,
    leaderboard: Rect,
    about: Rect,
    left_zone: Rect,
    right_zone: Rect,
}

impl InputRouter {
    pub fn new(world_width: f32, world_height: f32) -> Self {
        let (w, h) = (world_width, world_height);
        let small = h / 10.0;
        let large = w / 4.0;
        Self {
            sound: Rect::new(w / 64.0, h * 13.0 / 20.0, small, small),
            music: Rect::new(w / 64.0, h * 4.0 / 5.0, small, small),
            pause: Rect::new(w / 64.0, h / 2.0, small, small),
            start: Rect::new(w * 3.0 / 16.0, h / 4.0, large, large),
            leaderboard: Rect::new(w * 9.0 / 16.0, h / 4.0, large, large),
            about: Rect::new(w * 23.0 / 25.0, h * 13.0 / 20.0, small, small),
            left_zone: Rect::new(0.0, 0.0, w / 2.0, h),
            right_zone: Rect::new(w / 2.0, 0.0, w / 2.0, h),
        }
    }

    /// The menu command under a world point for the given mode, if any.
    pub fn menu_action_at(&self, state: GameState, x: f32, y: f32) -> Option<MenuAction> {
        let state_action = match state {
            GameState::Over => {
                if self.start.contains(x, y) {
                    Some(MenuAction::Start)
                } else if self.leaderboard.contains(x, y) {
                    Some(MenuAction::Leaderboard)
                } else if self.about.contains(x, y) {
                    Some(MenuAction::ToggleAbout)
                } else {
                    None
                }
            }
            GameState::Running => self.pause.contains(x, y).then_some(MenuAction::Pause),
            GameState::Paused => self.pause.contains(x, y).then_some(MenuAction::Resume),
            GameState::About | GameState::Choice => {
                self.about.contains(x, y).then_some(MenuAction::ToggleAbout)
            }
        };
        if state_action.is_some() {
            return state_action;
        }

        // Fixed menu, active in every mode.
        if self.sound.contains(x, y) {
            Some(MenuAction::ToggleSound)
        } else if self.music.contains(x, y) {
            Some(MenuAction::ToggleMusic)
        } else {
            None
        }
    }

    /// Routes a pointer-down event. Menu controls take priority; otherwise
    /// the right half of the screen jumps and the left half dodges, only
    /// while running. Returns whether anything was triggered.
    pub fn pointer_down(
        &self,
        stage: &mut GameStage,
        camera: &dyn Camera,
        screen_x: f32,
        screen_y: f32,
    ) -> bool {
        let (x, y) = camera.screen_to_world(screen_x, screen_y);

        if let Some(action) = self.menu_action_at(stage.state(), x, y) {
            return stage.apply_menu(action);
        }

        if stage.state() != GameState::Running {
            return false;
        }
        if self.right_zone.contains(x, y) {
            stage.runner_jump()
        } else if self.left_zone.contains(x, y) {
            stage.runner_dodge()
        } else {
            false
        }
    }

    /// Routes a pointer-up event: stands the runner back up if dodging.
    pub fn pointer_up(&self, stage: &mut GameStage) -> bool {
        stage.runner_stop_dodge()
    }
}
