mod common;

use std::time::Instant;

use sky_battle::actors::PLAYER_START;
use sky_battle::collaborators::{InputEvent, LevelFactory};
use sky_battle::config::{GameConfig, LevelConfig, LevelTable, WorldConfig};
use sky_battle::entities::*;
use sky_battle::error::{GameError, Result};
use sky_battle::level::LevelEngine;
use sky_battle::progression::{Campaign, Game, PendingAction, Phase};

use common::{quiet_config, seeded_rng, RecordingAudio, RecordingPresentation};

type TestGame<F> = Game<RecordingPresentation, RecordingAudio, F>;

fn quiet_campaign() -> Campaign {
    Campaign::new(GameConfig {
        levels: LevelTable {
            one: quiet_config(1, 5),
            two: quiet_config(2, 3),
            boss: quiet_config(1, 5),
        },
        ..GameConfig::default()
    })
}

fn game_on(kind: LevelKind, config: LevelConfig) -> TestGame<Campaign> {
    let world = WorldConfig::default();
    let level = LevelEngine::new(kind, config, world, Instant::now()).unwrap();
    let view = RecordingPresentation::default();
    Game::new(level, view, RecordingAudio::default(), quiet_campaign()).unwrap()
}

/// Line up a kill for the next tick.
fn stage_kill<F: LevelFactory>(game: &mut TestGame<F>) {
    let mut scratch = RecordingPresentation::default();
    common::stage_kill(game.level_mut(), &mut scratch, Instant::now());
}

/// Line up a hit on the player for the next tick.
fn stage_hit<F: LevelFactory>(game: &mut TestGame<F>) {
    let mut scratch = RecordingPresentation::default();
    common::stage_hit(game.level_mut(), &mut scratch);
}

/// Fails every request after the first level.
struct BrokenCampaign;

impl LevelFactory for BrokenCampaign {
    fn first_level(&mut self, now: Instant) -> Result<LevelEngine> {
        let world = WorldConfig::default();
        LevelEngine::new(LevelKind::One, quiet_config(1, 5), world, now)
    }

    fn next_level(&mut self, current: LevelKind, _now: Instant) -> Result<Option<LevelEngine>> {
        Err(GameError::LevelConstruction {
            level: current,
            reason: "assets missing".to_string(),
        })
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

#[test]
fn new_game_starts_level_with_music() {
    let game = game_on(LevelKind::One, quiet_config(1, 5));
    assert_eq!(game.phase(), Phase::Running);
    assert!(game.level().is_running());
    assert_eq!(game.audio().plays, 1);
    assert!(game.presentation().overlays.contains(&Overlay::Hearts));
    assert_eq!(game.presentation().hearts, Some(5));
}

#[test]
fn broken_audio_is_not_fatal() {
    let world = WorldConfig::default();
    let config = quiet_config(1, 5);
    let level = LevelEngine::new(LevelKind::One, config, world, Instant::now()).unwrap();
    let game = Game::new(
        level,
        RecordingPresentation::default(),
        RecordingAudio::broken(),
        quiet_campaign(),
    )
    .unwrap();
    assert_eq!(game.phase(), Phase::Running);
    assert!(game.level().is_running());
    assert!(!game.audio().playing);
}

#[test]
fn campaign_order() {
    let now = Instant::now();
    let mut campaign = Campaign::new(GameConfig::default());
    assert_eq!(campaign.first_level(now).unwrap().kind(), LevelKind::One);
    let two = campaign.next_level(LevelKind::One, now).unwrap().unwrap();
    assert_eq!(two.kind(), LevelKind::Two);
    assert_eq!(two.config().enemy_cap, 10);
    let boss = campaign.next_level(LevelKind::Two, now).unwrap().unwrap();
    assert_eq!(boss.kind(), LevelKind::Boss);
    assert_eq!(boss.config().enemy_kind, EnemyKind::Boss);
    assert!(campaign.next_level(LevelKind::Boss, now).unwrap().is_none());
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[test]
fn input_reaches_the_player() {
    let mut rng = seeded_rng();
    let mut game = game_on(LevelKind::One, quiet_config(10, 5));
    let now = Instant::now();

    game.handle_input(InputEvent::Fire, now, &mut rng);
    assert_eq!(game.level().player_projectiles().len(), 1);

    game.handle_input(InputEvent::MoveUp, now, &mut rng);
    game.frame(now, &mut rng);
    assert_eq!(game.level().player().unwrap().actor.y(), PLAYER_START.1 - 8.0);

    game.handle_input(InputEvent::Stop, now, &mut rng);
    game.frame(now, &mut rng);
    assert_eq!(game.level().player().unwrap().actor.y(), PLAYER_START.1 - 8.0);
}

// ── Win ───────────────────────────────────────────────────────────────────────

#[test]
fn win_stops_level_and_defers_choices() {
    let mut rng = seeded_rng();
    let mut game = game_on(LevelKind::One, quiet_config(1, 5));
    stage_kill(&mut game);

    assert_eq!(game.frame(Instant::now(), &mut rng), Phase::Won);
    assert!(!game.level().is_running());
    assert!(game.presentation().overlays.contains(&Overlay::Win));
    assert_eq!(game.audio().stops, 1);
    assert!(!game.audio().playing);
    // Buttons wait for the next frame boundary.
    assert!(game.presentation().choices.is_empty());
    assert_eq!(
        game.pending(),
        Some(&PendingAction::OfferChoices(vec![Choice::NextLevel, Choice::Restart]))
    );

    game.frame(Instant::now(), &mut rng);
    assert_eq!(game.presentation().choices, vec![Choice::NextLevel, Choice::Restart]);
    assert!(game.pending().is_none());
    assert_eq!(game.phase(), Phase::Won);
}

#[test]
fn next_level_transition_is_deferred_and_exclusive() {
    let mut rng = seeded_rng();
    let mut game = game_on(LevelKind::One, quiet_config(1, 5));
    stage_kill(&mut game);
    game.frame(Instant::now(), &mut rng);
    game.frame(Instant::now(), &mut rng);

    game.choose(Choice::NextLevel);
    assert!(game.is_transitioning());
    assert_eq!(game.level().kind(), LevelKind::One);

    game.choose(Choice::Restart);
    assert_eq!(game.pending(), Some(&PendingAction::NextLevel));

    game.frame(Instant::now(), &mut rng);
    assert_eq!(game.level().kind(), LevelKind::Two);
    assert_eq!(game.phase(), Phase::Running);
    assert!(!game.is_transitioning());
    assert!(game.level().is_running());
    assert_eq!(game.audio().plays, 2);
    assert_eq!(game.presentation().clears, 1);
    assert!(game.presentation().choices.is_empty());
    assert_eq!(game.presentation().hearts, Some(3));
}

#[test]
fn restart_after_win_replays_same_level() {
    let mut rng = seeded_rng();
    let mut game = game_on(LevelKind::One, quiet_config(1, 5));
    stage_kill(&mut game);
    game.frame(Instant::now(), &mut rng);
    game.frame(Instant::now(), &mut rng);

    game.choose(Choice::Restart);
    game.frame(Instant::now(), &mut rng);

    assert_eq!(game.level().kind(), LevelKind::One);
    assert_eq!(game.level().kill_count(), 0);
    assert_eq!(game.phase(), Phase::Running);
}

#[test]
fn winning_boss_level_restarts_it() {
    let mut rng = seeded_rng();
    let mut game = game_on(LevelKind::Boss, quiet_config(1, 5));
    stage_kill(&mut game);
    game.frame(Instant::now(), &mut rng);
    game.frame(Instant::now(), &mut rng);

    game.choose(Choice::NextLevel);
    game.frame(Instant::now(), &mut rng);

    assert_eq!(game.level().kind(), LevelKind::Boss);
    assert_eq!(game.level().kill_count(), 0);
    assert_eq!(game.phase(), Phase::Running);
    assert!(game.level().is_running());
    assert!(!game.is_transitioning());
}

// ── Loss ──────────────────────────────────────────────────────────────────────

#[test]
fn loss_offers_only_restart() {
    let mut rng = seeded_rng();
    let mut game = game_on(LevelKind::One, quiet_config(10, 1));
    stage_hit(&mut game);

    assert_eq!(game.frame(Instant::now(), &mut rng), Phase::Lost);
    assert!(game.presentation().overlays.contains(&Overlay::GameOver));
    assert_eq!(game.audio().stops, 1);
    game.frame(Instant::now(), &mut rng);
    assert_eq!(game.presentation().choices, vec![Choice::Restart]);

    game.choose(Choice::NextLevel);
    assert!(!game.is_transitioning());
    assert!(game.pending().is_none());
}

#[test]
fn restart_after_loss_resets_level() {
    let mut rng = seeded_rng();
    let mut game = game_on(LevelKind::One, quiet_config(10, 1));
    stage_hit(&mut game);
    game.frame(Instant::now(), &mut rng);
    game.frame(Instant::now(), &mut rng);

    game.choose(Choice::Restart);
    assert!(game.is_transitioning());
    game.frame(Instant::now(), &mut rng);

    assert_eq!(game.phase(), Phase::Running);
    assert!(!game.is_transitioning());
    assert_eq!(game.level().kind(), LevelKind::One);
    assert_eq!(game.level().player().unwrap().health(), 1);
    assert!(game.level().enemy_projectiles().is_empty());
    assert!(game.presentation().choices.is_empty());
    assert_eq!(game.audio().plays, 2);
}

#[test]
fn choices_ignored_while_running() {
    let mut game = game_on(LevelKind::One, quiet_config(10, 5));
    game.choose(Choice::NextLevel);
    game.choose(Choice::Restart);
    assert!(game.pending().is_none());
    assert!(!game.is_transitioning());
}

// ── Factory failure ───────────────────────────────────────────────────────────

#[test]
fn factory_failure_completes_campaign_and_restart_recovers() {
    let mut rng = seeded_rng();
    let now = Instant::now();
    let mut factory = BrokenCampaign;
    let level = factory.first_level(now).unwrap();
    let view = RecordingPresentation::default();
    let mut game = Game::new(level, view, RecordingAudio::default(), factory).unwrap();

    stage_kill(&mut game);
    game.frame(now, &mut rng);
    game.frame(now, &mut rng);
    game.choose(Choice::NextLevel);
    game.frame(now, &mut rng);

    assert_eq!(game.phase(), Phase::Completed);
    assert!(!game.is_transitioning());
    assert!(!game.level().is_running());
    assert_eq!(game.pending(), Some(&PendingAction::OfferChoices(vec![Choice::Restart])));

    game.frame(now, &mut rng);
    assert_eq!(game.presentation().choices, vec![Choice::Restart]);

    game.choose(Choice::Restart);
    game.frame(now, &mut rng);

    assert_eq!(game.phase(), Phase::Running);
    assert_eq!(game.level().kind(), LevelKind::One);
    assert_eq!(game.level().kill_count(), 0);
    assert!(game.level().is_running());
}
