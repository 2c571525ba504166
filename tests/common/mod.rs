#![allow(dead_code)]

use std::collections::HashSet;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use sky_battle::audio::{Audio, AudioError, TrackId};
use sky_battle::collaborators::Presentation;
use sky_battle::config::{LevelConfig, WorldConfig};
use sky_battle::entities::{
    Actor, ActorId, Choice, EnemyKind, Fighter, LevelKind, Overlay, Projectile, ProjectileKind,
    Side, Sprite,
};
use sky_battle::level::LevelEngine;

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// A level that never spawns on its own.
pub fn quiet_config(kills_to_advance: u32, player_health: u32) -> LevelConfig {
    LevelConfig {
        enemy_cap: 10,
        spawn_probability: 0.0,
        kills_to_advance,
        player_health,
        enemy_kind: EnemyKind::Basic,
    }
}

pub fn running_level(config: LevelConfig, now: Instant) -> LevelEngine {
    let world = WorldConfig::default();
    let mut level = LevelEngine::new(LevelKind::One, config, world, now).unwrap();
    level.start();
    level
}

/// Basic enemy under an id from the level's own allocator.
pub fn add_enemy(
    level: &mut LevelEngine,
    view: &mut RecordingPresentation,
    x: f64,
    y: f64,
    now: Instant,
) -> ActorId {
    let id = level.next_actor_id();
    level.add_enemy_unit(Fighter::enemy(id, x, y, now), view).unwrap();
    id
}

/// Projectile under an id from the level's own allocator, tracked on its
/// owner's side.
pub fn add_shot(
    level: &mut LevelEngine,
    view: &mut RecordingPresentation,
    kind: ProjectileKind,
    x: f64,
    y: f64,
) -> ActorId {
    let id = level.next_actor_id();
    let shot = Projectile::new(id, kind, x, y);
    match shot.side {
        Side::Player => level.add_player_projectile(shot, view),
        Side::Enemy => level.add_enemy_projectile(shot, view),
    }
    id
}

/// An enemy at (600, 300) and a player shot that reaches it next tick.
pub fn stage_kill(level: &mut LevelEngine, view: &mut RecordingPresentation, now: Instant) {
    add_enemy(level, view, 600.0, 300.0, now);
    add_shot(level, view, ProjectileKind::UserFire, 540.0, 310.0);
}

/// An enemy shot that reaches the player at its start position next tick.
pub fn stage_hit(level: &mut LevelEngine, view: &mut RecordingPresentation) -> ActorId {
    add_shot(level, view, ProjectileKind::EnemyFire, 50.0, 310.0)
}

// ── Recording presentation ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingPresentation {
    pub visible: HashSet<ActorId>,
    pub rendered: Vec<(ActorId, Sprite)>,
    pub removed: Vec<(ActorId, Sprite)>,
    pub overlays: HashSet<Overlay>,
    pub hearts: Option<u32>,
    pub choices: Vec<Choice>,
    pub clears: usize,
}

impl RecordingPresentation {
    pub fn removed_of(&self, sprite: Sprite) -> usize {
        self.removed.iter().filter(|(_, s)| *s == sprite).count()
    }

    pub fn rendered_of(&self, sprite: Sprite) -> usize {
        self.rendered.iter().filter(|(_, s)| *s == sprite).count()
    }

    pub fn forget_history(&mut self) {
        self.rendered.clear();
        self.removed.clear();
    }
}

impl Presentation for RecordingPresentation {
    fn render(&mut self, actor: &Actor) {
        self.visible.insert(actor.id);
        self.rendered.push((actor.id, actor.sprite));
    }

    fn remove(&mut self, actor: &Actor) {
        self.visible.remove(&actor.id);
        self.removed.push((actor.id, actor.sprite));
    }

    fn show_overlay(&mut self, overlay: Overlay) {
        self.overlays.insert(overlay);
    }

    fn hide_overlay(&mut self, overlay: Overlay) {
        self.overlays.remove(&overlay);
    }

    fn update_health_display(&mut self, hearts: u32) {
        self.hearts = Some(hearts);
    }

    fn offer_choices(&mut self, choices: &[Choice]) {
        self.choices = choices.to_vec();
    }

    fn clear(&mut self) {
        self.visible.clear();
        self.overlays.clear();
        self.hearts = None;
        self.choices.clear();
        self.clears += 1;
    }
}

// ── Recording audio ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub plays: usize,
    pub stops: usize,
    pub playing: bool,
    pub broken: bool,
}

impl RecordingAudio {
    pub fn broken() -> Self {
        RecordingAudio { broken: true, ..Default::default() }
    }
}

impl Audio for RecordingAudio {
    fn play(&mut self, track: TrackId) -> Result<(), AudioError> {
        if self.broken {
            return Err(AudioError::UnknownTrack(track));
        }
        self.plays += 1;
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.playing = false;
    }

    fn set_volume(&mut self, _volume: f32) {}
}
