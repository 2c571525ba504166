//! Per-variant actor behaviour.
//!
//! Fighters are a tagged variant (`FighterKind`) rather than a class tree;
//! every polymorphic operation below is a `match` over the variant, so the
//! movement, fire and damage policy of each fighter type sits in one table.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::entities::{
    Actor, BossPlane, Fighter, FighterKind, IdAllocator, PlayerPlane, Projectile, ProjectileKind,
    Side, Sprite,
};

// ── Tuning tables ────────────────────────────────────────────────────────────

/// Minimum gap between two successful shots of a cooldown-gated fighter.
pub const FIRE_COOLDOWN: Duration = Duration::from_millis(1000);

pub const PLAYER_START: (f64, f64) = (5.0, 300.0);
pub const PLAYER_VERTICAL_STEP: f64 = 8.0;
pub const PLAYER_Y_UPPER_BOUND: f64 = -40.0;
pub const PLAYER_Y_LOWER_BOUND: f64 = 600.0;
const PLAYER_FIRE_OFFSET: (f64, f64) = (105.0, 20.0);

pub const ENEMY_HORIZONTAL_VELOCITY: f64 = -6.0;
pub const ENEMY_FIRE_PROBABILITY: f64 = 0.01;
const ENEMY_HEALTH: u32 = 1;
const ENEMY_FIRE_OFFSET: (f64, f64) = (-100.0, 50.0);

pub const BOSS_START: (f64, f64) = (1000.0, 400.0);
pub const BOSS_HEALTH: u32 = 100;
pub const BOSS_VERTICAL_STEP: f64 = 8.0;
pub const BOSS_MOVES_PER_CYCLE: usize = 5;
pub const BOSS_MAX_FRAMES_SAME_MOVE: u32 = 10;
pub const BOSS_Y_UPPER_BOUND: f64 = -100.0;
pub const BOSS_Y_LOWER_BOUND: f64 = 475.0;
pub const BOSS_SHIELD_PROBABILITY: f64 = 0.002;
pub const BOSS_MAX_SHIELD_FRAMES: u32 = 500;
pub const BOSS_FIRE_PROBABILITY: f64 = 0.04;
const BOSS_FIREBALL_X: f64 = 950.0;
const BOSS_FIREBALL_Y_OFFSET: f64 = 75.0;

fn projectile_velocity(kind: ProjectileKind) -> f64 {
    match kind {
        ProjectileKind::UserFire => 15.0,
        ProjectileKind::EnemyFire => -10.0,
        ProjectileKind::Fireball => -15.0,
    }
}

/// Bernoulli draw that tolerates p = 0 and p = 1 exactly.
fn roll(rng: &mut impl Rng, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

// ── Shared contract ──────────────────────────────────────────────────────────

/// The capability the collision engine and cleanup pass work against.
pub trait Destructible {
    fn actor(&self) -> &Actor;
    fn actor_mut(&mut self) -> &mut Actor;

    /// Apply one unit of contact damage.
    fn take_damage(&mut self);

    fn destroy(&mut self) {
        self.actor_mut().destroy();
    }

    fn is_destroyed(&self) -> bool {
        self.actor().is_destroyed()
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

impl Projectile {
    pub fn new(id: u64, kind: ProjectileKind, x: f64, y: f64) -> Self {
        let (sprite, side) = match kind {
            ProjectileKind::UserFire => (Sprite::UserFire, Side::Player),
            ProjectileKind::EnemyFire => (Sprite::EnemyFire, Side::Enemy),
            ProjectileKind::Fireball => (Sprite::Fireball, Side::Enemy),
        };
        Projectile {
            actor: Actor::new(id, sprite, x, y),
            kind,
            side,
            velocity_x: projectile_velocity(kind),
            velocity_y: 0.0,
        }
    }

    pub fn update_position(&mut self) {
        self.actor.move_horizontally(self.velocity_x);
        self.actor.move_vertically(self.velocity_y);
    }

    pub fn update_actor(&mut self) {
        self.update_position();
    }
}

impl Destructible for Projectile {
    fn actor(&self) -> &Actor {
        &self.actor
    }

    fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    /// No health pool: any hit consumes the projectile.
    fn take_damage(&mut self) {
        self.destroy();
    }
}

// ── Boss plane state ─────────────────────────────────────────────────────────

impl BossPlane {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut move_pattern = Vec::with_capacity(BOSS_MOVES_PER_CYCLE * 3);
        for _ in 0..BOSS_MOVES_PER_CYCLE {
            move_pattern.push(BOSS_VERTICAL_STEP);
            move_pattern.push(-BOSS_VERTICAL_STEP);
            move_pattern.push(0.0);
        }
        move_pattern.shuffle(rng);
        BossPlane {
            move_pattern,
            dwell: 0,
            cursor: 0,
            shielded: false,
            shield_frames: 0,
        }
    }

    /// Current vertical delta; after `BOSS_MAX_FRAMES_SAME_MOVE` reads the
    /// pattern is reshuffled and the cursor steps forward.
    fn next_move(&mut self, rng: &mut impl Rng) -> f64 {
        let current = self.move_pattern[self.cursor];
        self.dwell += 1;
        if self.dwell >= BOSS_MAX_FRAMES_SAME_MOVE {
            self.move_pattern.shuffle(rng);
            self.dwell = 0;
            self.cursor = (self.cursor + 1) % self.move_pattern.len();
        }
        current
    }

    pub fn activate_shield(&mut self) {
        self.shielded = true;
        self.shield_frames = 0;
    }

    pub fn deactivate_shield(&mut self) {
        self.shielded = false;
        self.shield_frames = 0;
    }

    fn update_shield(&mut self, rng: &mut impl Rng) {
        if self.shielded {
            self.shield_frames += 1;
            if self.shield_frames >= BOSS_MAX_SHIELD_FRAMES {
                self.deactivate_shield();
                log::debug!("boss shield down");
            }
        } else if roll(rng, BOSS_SHIELD_PROBABILITY) {
            self.activate_shield();
            log::debug!("boss shield up");
        }
    }
}

// ── Fighters ─────────────────────────────────────────────────────────────────

impl Fighter {
    pub fn player(id: u64, health: u32, now: Instant) -> Self {
        Fighter {
            actor: Actor::new(id, Sprite::UserPlane, PLAYER_START.0, PLAYER_START.1),
            kind: FighterKind::Player(PlayerPlane::default()),
            health,
            last_fired: now,
        }
    }

    pub fn enemy(id: u64, x: f64, y: f64, now: Instant) -> Self {
        Fighter {
            actor: Actor::new(id, Sprite::EnemyPlane, x, y),
            kind: FighterKind::Enemy,
            health: ENEMY_HEALTH,
            last_fired: now,
        }
    }

    pub fn boss(id: u64, now: Instant, rng: &mut impl Rng) -> Self {
        Fighter {
            actor: Actor::new(id, Sprite::BossPlane, BOSS_START.0, BOSS_START.1),
            kind: FighterKind::Boss(BossPlane::new(rng)),
            health: BOSS_HEALTH,
            last_fired: now,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, FighterKind::Player(_))
    }

    pub fn is_shielded(&self) -> bool {
        matches!(&self.kind, FighterKind::Boss(boss) if boss.shielded)
    }

    pub fn boss_state_mut(&mut self) -> Option<&mut BossPlane> {
        match &mut self.kind {
            FighterKind::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    // ── Player commands ──────────────────────────────────────────────────────

    fn set_velocity_multiplier(&mut self, multiplier: i8) {
        if let FighterKind::Player(plane) = &mut self.kind {
            plane.velocity_multiplier = multiplier;
        }
    }

    pub fn move_up(&mut self) {
        self.set_velocity_multiplier(-1);
    }

    pub fn move_down(&mut self) {
        self.set_velocity_multiplier(1);
    }

    pub fn stop(&mut self) {
        self.set_velocity_multiplier(0);
    }

    pub fn increment_kill_count(&mut self) {
        if let FighterKind::Player(plane) = &mut self.kind {
            plane.kill_count += 1;
        }
    }

    pub fn kill_count(&self) -> u32 {
        match &self.kind {
            FighterKind::Player(plane) => plane.kill_count,
            _ => 0,
        }
    }

    // ── Per-tick update ──────────────────────────────────────────────────────

    pub fn update_position(&mut self, rng: &mut impl Rng) {
        match &mut self.kind {
            FighterKind::Player(plane) => {
                if plane.velocity_multiplier == 0 {
                    return;
                }
                let prior = self.actor.translate_y();
                self.actor
                    .move_vertically(PLAYER_VERTICAL_STEP * f64::from(plane.velocity_multiplier));
                let y = self.actor.y();
                if !(PLAYER_Y_UPPER_BOUND..=PLAYER_Y_LOWER_BOUND).contains(&y) {
                    self.actor.restore_translate_y(prior);
                }
            }
            FighterKind::Enemy => self.actor.move_horizontally(ENEMY_HORIZONTAL_VELOCITY),
            FighterKind::Boss(boss) => {
                let prior = self.actor.translate_y();
                let delta = boss.next_move(rng);
                self.actor.move_vertically(delta);
                let y = self.actor.y();
                if !(BOSS_Y_UPPER_BOUND..=BOSS_Y_LOWER_BOUND).contains(&y) {
                    self.actor.restore_translate_y(prior);
                }
            }
        }
    }

    pub fn update_actor(&mut self, rng: &mut impl Rng) {
        self.update_position(rng);
        if let FighterKind::Boss(boss) = &mut self.kind {
            boss.update_shield(rng);
        }
    }

    // ── Firing ───────────────────────────────────────────────────────────────

    /// Whether the fire cooldown has elapsed.  The boss fires on its own
    /// per-tick probability and ignores the cooldown.
    pub fn can_fire(&self, now: Instant) -> bool {
        match self.kind {
            FighterKind::Boss(_) => true,
            _ => now.saturating_duration_since(self.last_fired) >= FIRE_COOLDOWN,
        }
    }

    /// Produce a projectile, or `None` when this tick's fire roll fails.
    /// The player always fires.
    pub fn fire_projectile(
        &mut self,
        ids: &mut IdAllocator,
        now: Instant,
        rng: &mut impl Rng,
    ) -> Option<Projectile> {
        let (x, y) = (self.actor.x(), self.actor.y());
        let projectile = match self.kind {
            FighterKind::Player(_) => Projectile::new(
                ids.next(),
                ProjectileKind::UserFire,
                x + PLAYER_FIRE_OFFSET.0,
                y + PLAYER_FIRE_OFFSET.1,
            ),
            FighterKind::Enemy => {
                if !roll(rng, ENEMY_FIRE_PROBABILITY) {
                    return None;
                }
                Projectile::new(
                    ids.next(),
                    ProjectileKind::EnemyFire,
                    x + ENEMY_FIRE_OFFSET.0,
                    y + ENEMY_FIRE_OFFSET.1,
                )
            }
            FighterKind::Boss(_) => {
                if !roll(rng, BOSS_FIRE_PROBABILITY) {
                    return None;
                }
                Projectile::new(
                    ids.next(),
                    ProjectileKind::Fireball,
                    BOSS_FIREBALL_X,
                    y + BOSS_FIREBALL_Y_OFFSET,
                )
            }
        };
        self.last_fired = now;
        Some(projectile)
    }
}

impl Destructible for Fighter {
    fn actor(&self) -> &Actor {
        &self.actor
    }

    fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    /// Decrement health and destroy at zero.  A shielded boss absorbs the hit.
    fn take_damage(&mut self) {
        if self.is_shielded() {
            return;
        }
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.destroy();
        }
    }
}
