//! Simulation entity types: the actor base, fighters, projectiles and the
//! small enums the level and progression layers pass around.
//!
//! Per-variant behaviour (movement, firing, damage) lives in `actors`; this
//! module only holds the data and the base-actor invariants.

use std::time::Instant;

use serde::Deserialize;

pub type ActorId = u64;

// ── Geometry ─────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in world coordinates (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

// ── Visual handles ───────────────────────────────────────────────────────────

/// Opaque visual handle handed to the presentation collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sprite {
    UserPlane,
    EnemyPlane,
    BossPlane,
    UserFire,
    EnemyFire,
    Fireball,
}

impl Sprite {
    /// Hitbox size (width, height) in world units.
    pub fn size(self) -> (f64, f64) {
        match self {
            Sprite::UserPlane => (120.0, 45.0),
            Sprite::EnemyPlane => (120.0, 45.0),
            Sprite::BossPlane => (240.0, 90.0),
            Sprite::UserFire => (50.0, 12.0),
            Sprite::EnemyFire => (40.0, 16.0),
            Sprite::Fireball => (60.0, 36.0),
        }
    }

    /// Key used in the `[glyphs]` config table.
    pub fn name(self) -> &'static str {
        match self {
            Sprite::UserPlane => "user_plane",
            Sprite::EnemyPlane => "enemy_plane",
            Sprite::BossPlane => "boss_plane",
            Sprite::UserFire => "user_fire",
            Sprite::EnemyFire => "enemy_fire",
            Sprite::Fireball => "fireball",
        }
    }
}

// ── Actor base ───────────────────────────────────────────────────────────────

/// Hands out unique actor ids for one level instance.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: ActorId,
}

impl IdAllocator {
    pub fn next(&mut self) -> ActorId {
        self.next += 1;
        self.next
    }
}

/// Positioned, destructible entity.
///
/// Position is `origin + translate`; all motion goes through the translate
/// deltas so a rejected move is undone by restoring the previous delta.
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub sprite: Sprite,
    origin_x: f64,
    origin_y: f64,
    translate_x: f64,
    translate_y: f64,
    destroyed: bool,
}

impl Actor {
    pub fn new(id: ActorId, sprite: Sprite, x: f64, y: f64) -> Self {
        Actor {
            id,
            sprite,
            origin_x: x,
            origin_y: y,
            translate_x: 0.0,
            translate_y: 0.0,
            destroyed: false,
        }
    }

    pub fn x(&self) -> f64 {
        self.origin_x + self.translate_x
    }

    pub fn y(&self) -> f64 {
        self.origin_y + self.translate_y
    }

    pub fn translate_y(&self) -> f64 {
        self.translate_y
    }

    pub fn bounds(&self) -> Bounds {
        let (width, height) = self.sprite.size();
        Bounds { x: self.x(), y: self.y(), width, height }
    }

    pub fn move_horizontally(&mut self, dx: f64) {
        self.translate_x += dx;
    }

    pub fn move_vertically(&mut self, dy: f64) {
        self.translate_y += dy;
    }

    /// Undo vertical motion by restoring a previously read delta.
    pub fn restore_translate_y(&mut self, translate_y: f64) {
        self.translate_y = translate_y;
    }

    /// Idempotent; there is no way back once destroyed.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    /// Player shot, flies right.
    UserFire,
    /// Basic enemy shot.
    EnemyFire,
    /// Boss shot, faster than `EnemyFire`.
    Fireball,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub actor: Actor,
    pub kind: ProjectileKind,
    pub side: Side,
    pub velocity_x: f64,
    pub velocity_y: f64,
}

// ── Fighters ─────────────────────────────────────────────────────────────────

/// What the spawner produces for a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Basic,
    Boss,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerPlane {
    /// -1 up, 0 idle, +1 down.
    pub velocity_multiplier: i8,
    pub kill_count: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossPlane {
    pub move_pattern: Vec<f64>,
    pub dwell: u32,
    pub cursor: usize,
    pub shielded: bool,
    pub shield_frames: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FighterKind {
    Player(PlayerPlane),
    Enemy,
    Boss(BossPlane),
}

#[derive(Clone, Debug)]
pub struct Fighter {
    pub actor: Actor,
    pub kind: FighterKind,
    pub(crate) health: u32,
    pub(crate) last_fired: Instant,
}

// ── Level & progression enums ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelKind {
    One,
    Two,
    Boss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelStatus {
    Initializing,
    Running,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Overlay {
    Hearts,
    Win,
    GameOver,
    Shield,
}

/// Buttons offered once a level has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    NextLevel,
    Restart,
}
