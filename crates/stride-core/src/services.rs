//! Injected collaborator contracts.
//!
//! Audio playback, preferences, and leaderboard/stats persistence live
//! outside the core. Calls are fire-and-forget: the signatures are
//! infallible and the core never awaits or retries them.

use std::rc::Rc;

/// Sound effects the core requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Jump,
    Hit,
}

/// Audio playback and persisted mute preferences.
pub trait AudioService {
    fn play_sound(&self, kind: SoundKind);
    fn toggle_sound(&self);
    fn toggle_music(&self);
}

/// Leaderboard and per-player statistics.
pub trait StatsService {
    fn submit_score(&self, value: u64);
    fn record_game_played(&self);
    fn record_jump_count(&self, jumps: u32);
}

impl<T: AudioService + ?Sized> AudioService for Rc<T> {
    fn play_sound(&self, kind: SoundKind) {
        (**self).play_sound(kind);
    }
    fn toggle_sound(&self) {
        (**self).toggle_sound();
    }
    fn toggle_music(&self) {
        (**self).toggle_music();
    }
}

impl<T: StatsService + ?Sized> StatsService for Rc<T> {
    fn submit_score(&self, value: u64) {
        (**self).submit_score(value);
    }
    fn record_game_played(&self) {
        (**self).record_game_played();
    }
    fn record_jump_count(&self, jumps: u32) {
        (**self).record_jump_count(jumps);
    }
}

/// Audio sink that discards everything (headless runs and tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioService for NullAudio {
    fn play_sound(&self, _kind: SoundKind) {}
    fn toggle_sound(&self) {}
    fn toggle_music(&self) {}
}

/// Stats sink that discards everything (headless runs and tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStats;

impl StatsService for NullStats {
    fn submit_score(&self, _value: u64) {}
    fn record_game_played(&self) {}
    fn record_jump_count(&self, _jumps: u32) {}
}
