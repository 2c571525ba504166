//! Win/lose/transition control across levels.
//!
//! UI work triggered while a tick is in flight (offering buttons, swapping
//! the level) never runs inside that tick: it goes into a single pending
//! slot that `frame` drains at the next frame boundary.

use std::time::Instant;

use rand::Rng;

use crate::audio::{Audio, TrackId};
use crate::collaborators::{InputEvent, LevelFactory, Presentation};
use crate::config::GameConfig;
use crate::entities::{Choice, LevelKind, LevelStatus, Overlay};
use crate::error::{GameError, Result};
use crate::level::LevelEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Won,
    Lost,
    /// The campaign cannot continue; only a restart is offered.
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    OfferChoices(Vec<Choice>),
    NextLevel,
    Restart,
}

// ── Level factory ────────────────────────────────────────────────────────────

/// Builds levels One → Two → Boss from the configured level table.
#[derive(Debug, Clone)]
pub struct Campaign {
    config: GameConfig,
}

impl Campaign {
    pub fn new(config: GameConfig) -> Self {
        Campaign { config }
    }

    fn build(&self, kind: LevelKind, now: Instant) -> Result<LevelEngine> {
        LevelEngine::new(
            kind,
            self.config.levels.get(kind).clone(),
            self.config.world.clone(),
            now,
        )
    }
}

impl LevelFactory for Campaign {
    fn first_level(&mut self, now: Instant) -> Result<LevelEngine> {
        self.build(LevelKind::One, now)
    }

    fn next_level(&mut self, current: LevelKind, now: Instant) -> Result<Option<LevelEngine>> {
        let next = match current {
            LevelKind::One => LevelKind::Two,
            LevelKind::Two => LevelKind::Boss,
            LevelKind::Boss => return Ok(None),
        };
        self.build(next, now).map(Some)
    }
}

// ── Game ─────────────────────────────────────────────────────────────────────

pub struct Game<P, A, F> {
    level: LevelEngine,
    phase: Phase,
    transitioning: bool,
    pending: Option<PendingAction>,
    presentation: P,
    audio: A,
    factory: F,
}

impl<P: Presentation, A: Audio, F: LevelFactory> Game<P, A, F> {
    /// Put `level` on screen and start it with its music.
    pub fn new(mut level: LevelEngine, mut presentation: P, audio: A, factory: F) -> Result<Self> {
        level.initialize_scene(&mut presentation)?;
        let mut game = Game {
            level,
            phase: Phase::Running,
            transitioning: false,
            pending: None,
            presentation,
            audio,
            factory,
        };
        game.start_level();
        Ok(game)
    }

    pub fn level(&self) -> &LevelEngine {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut LevelEngine {
        &mut self.level
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    // ── Frame driver ─────────────────────────────────────────────────────────

    /// One timer firing: drain deferred UI work, then tick the level if its
    /// loop is running and react to the outcome.
    pub fn frame(&mut self, now: Instant, rng: &mut impl Rng) -> Phase {
        self.drain_pending(now);
        if self.level.is_running() {
            let status = self.level.tick(now, rng, &mut self.presentation);
            self.evaluate(status);
        }
        self.phase
    }

    /// Enemy fire, triggered separately from the tick.
    pub fn generate_enemy_fire(&mut self, now: Instant, rng: &mut impl Rng) {
        self.level.generate_enemy_fire(now, rng, &mut self.presentation);
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant, rng: &mut impl Rng) {
        match event {
            InputEvent::MoveUp => self.level.move_player_up(),
            InputEvent::MoveDown => self.level.move_player_down(),
            InputEvent::Stop => self.level.stop_player(),
            InputEvent::Fire => self.level.fire_projectile(now, rng, &mut self.presentation),
        }
    }

    fn evaluate(&mut self, status: LevelStatus) {
        match status {
            LevelStatus::Won => self.win_game(),
            LevelStatus::Lost => self.lose_game(),
            LevelStatus::Initializing | LevelStatus::Running => {}
        }
    }

    fn win_game(&mut self) {
        let (kind, kills) = (self.level.kind(), self.level.kill_count());
        log::info!("level {:?} won with {} kills", kind, kills);
        self.level.stop();
        self.audio.stop();
        self.presentation.show_overlay(Overlay::Win);
        self.phase = Phase::Won;
        self.defer(PendingAction::OfferChoices(vec![Choice::NextLevel, Choice::Restart]));
    }

    fn lose_game(&mut self) {
        log::info!("level {:?} lost", self.level.kind());
        self.level.stop();
        self.audio.stop();
        self.presentation.show_overlay(Overlay::GameOver);
        self.phase = Phase::Lost;
        self.defer(PendingAction::OfferChoices(vec![Choice::Restart]));
    }

    fn complete(&mut self, reason: &GameError) {
        log::warn!("campaign cannot continue: {reason}");
        self.level.stop();
        self.phase = Phase::Completed;
        self.defer(PendingAction::OfferChoices(vec![Choice::Restart]));
    }

    // ── Choices ──────────────────────────────────────────────────────────────

    /// A button press.  Requests arriving while a transition is pending are
    /// ignored.
    pub fn choose(&mut self, choice: Choice) {
        if self.transitioning {
            log::info!("transition already in progress; ignoring {:?}", choice);
            return;
        }
        let action = match (choice, self.phase) {
            (Choice::NextLevel, Phase::Won) => PendingAction::NextLevel,
            (Choice::Restart, Phase::Won | Phase::Lost | Phase::Completed) => {
                PendingAction::Restart
            }
            _ => {
                log::debug!("{:?} not available while {:?}", choice, self.phase);
                return;
            }
        };
        self.transitioning = true;
        self.defer(action);
    }

    /// Single-slot queue: a newer action replaces an older one.
    fn defer(&mut self, action: PendingAction) {
        if let Some(previous) = self.pending.replace(action) {
            log::debug!("pending {:?} superseded", previous);
            if matches!(previous, PendingAction::NextLevel | PendingAction::Restart) {
                self.transitioning = false;
            }
        }
    }

    fn drain_pending(&mut self, now: Instant) {
        let Some(action) = self.pending.take() else {
            return;
        };
        match action {
            PendingAction::OfferChoices(choices) => self.presentation.offer_choices(&choices),
            PendingAction::NextLevel => {
                let result = self.go_to_next_level(now);
                self.transitioning = false;
                if let Err(e) = result {
                    self.complete(&e);
                }
            }
            PendingAction::Restart => {
                let result = self.restart(now);
                self.transitioning = false;
                if let Err(e) = result {
                    self.complete(&e);
                }
            }
        }
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    fn go_to_next_level(&mut self, now: Instant) -> Result<()> {
        match self.factory.next_level(self.level.kind(), now)? {
            Some(next) => self.transition_to(next),
            None => {
                let kind = self.level.kind();
                log::info!("no level after {:?}; game completed, restarting", kind);
                self.restart_current(now)
            }
        }
    }

    fn transition_to(&mut self, mut next: LevelEngine) -> Result<()> {
        log::info!("transitioning {:?} -> {:?}", self.level.kind(), next.kind());
        self.level.stop();
        self.presentation.clear();
        next.initialize_scene(&mut self.presentation)?;
        self.level = next;
        self.start_level();
        log::info!("transition to {:?} complete", self.level.kind());
        Ok(())
    }

    fn restart(&mut self, now: Instant) -> Result<()> {
        if self.phase == Phase::Completed {
            let first = self.factory.first_level(now)?;
            return self.transition_to(first);
        }
        self.restart_current(now)
    }

    fn restart_current(&mut self, now: Instant) -> Result<()> {
        self.level.reset(now, &mut self.presentation)?;
        self.start_level();
        Ok(())
    }

    fn start_level(&mut self) {
        self.level.start();
        self.phase = Phase::Running;
        if let Err(e) = self.audio.play(TrackId::Background) {
            log::warn!("background music unavailable: {e}");
        }
    }
}
