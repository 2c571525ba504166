//! Narrow interfaces to everything outside the simulation core.
//!
//! The core never touches a terminal, window or sound device directly.  It is
//! handed implementations of these traits by whoever owns the game.

use std::time::Instant;

use crate::entities::{Actor, Choice, LevelKind, Overlay};
use crate::error::Result;
use crate::level::LevelEngine;

/// Visual side of the game.  Calls are infallible: a presentation that
/// cannot draw something substitutes a default or skips it.
pub trait Presentation {
    /// Start showing an actor.
    fn render(&mut self, actor: &Actor);
    /// Stop showing an actor.
    fn remove(&mut self, actor: &Actor);
    fn show_overlay(&mut self, overlay: Overlay);
    fn hide_overlay(&mut self, overlay: Overlay);
    /// Number of hearts to display.
    fn update_health_display(&mut self, hearts: u32);
    /// Buttons the player may press once a level has ended.
    fn offer_choices(&mut self, choices: &[Choice]);
    /// Drop every visual, overlay and button.
    fn clear(&mut self);
}

/// Discrete commands from the input device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    MoveUp,
    MoveDown,
    Stop,
    Fire,
}

/// Builds level engines for the progression layer.
pub trait LevelFactory {
    /// The level a fresh campaign starts on.
    fn first_level(&mut self, now: Instant) -> Result<LevelEngine>;

    /// The level after `current`, or `None` when the campaign is over.
    fn next_level(&mut self, current: LevelKind, now: Instant) -> Result<Option<LevelEngine>>;
}
