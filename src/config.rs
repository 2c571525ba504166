//! Runtime configuration loaded from `sky_battle.toml`.
//!
//! Every field has a compiled default, so a missing file simply means the
//! stock game.  A `[levels.<name>]` table replaces that level's entry as a
//! whole; a `[glyphs]` table replaces the whole glyph map, and sprites it
//! leaves out are drawn with a fallback glyph.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::entities::{EnemyKind, LevelKind, Sprite};
use crate::error::{GameError, Result};

pub const CONFIG_PATH: &str = "sky_battle.toml";

// ── World ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Fixed tick interval in milliseconds.
    pub tick_millis: u64,
    /// Enemies spawn with their top edge in `[0, height - spawn_margin)`.
    pub spawn_margin: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            width: 1300.0,
            height: 750.0,
            tick_millis: 50,
            spawn_margin: 150.0,
        }
    }
}

// ── Levels ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LevelConfig {
    /// Target number of live enemies.
    pub enemy_cap: usize,
    /// Per-slot spawn chance each tick.
    pub spawn_probability: f64,
    pub kills_to_advance: u32,
    pub player_health: u32,
    pub enemy_kind: EnemyKind,
}

impl LevelConfig {
    pub fn level_one() -> Self {
        LevelConfig {
            enemy_cap: 5,
            spawn_probability: 0.20,
            kills_to_advance: 10,
            player_health: 5,
            enemy_kind: EnemyKind::Basic,
        }
    }

    pub fn level_two() -> Self {
        LevelConfig {
            enemy_cap: 10,
            spawn_probability: 0.30,
            kills_to_advance: 20,
            player_health: 3,
            enemy_kind: EnemyKind::Basic,
        }
    }

    pub fn boss_level() -> Self {
        LevelConfig {
            enemy_cap: 1,
            spawn_probability: 1.0,
            kills_to_advance: 1,
            player_health: 5,
            enemy_kind: EnemyKind::Boss,
        }
    }

    pub fn validate(&self, level: LevelKind) -> Result<()> {
        let invalid = |reason: &str| GameError::InvalidLevelConfig {
            level,
            reason: reason.to_string(),
        };
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(invalid("spawn_probability must be within [0, 1]"));
        }
        if self.kills_to_advance == 0 {
            return Err(invalid("kills_to_advance must be at least 1"));
        }
        if self.player_health == 0 {
            return Err(invalid("player_health must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LevelTable {
    pub one: LevelConfig,
    pub two: LevelConfig,
    pub boss: LevelConfig,
}

impl Default for LevelTable {
    fn default() -> Self {
        LevelTable {
            one: LevelConfig::level_one(),
            two: LevelConfig::level_two(),
            boss: LevelConfig::boss_level(),
        }
    }
}

impl LevelTable {
    pub fn get(&self, kind: LevelKind) -> &LevelConfig {
        match kind {
            LevelKind::One => &self.one,
            LevelKind::Two => &self.two,
            LevelKind::Boss => &self.boss,
        }
    }
}

// ── Audio ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub background_music: String,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            background_music: "assets/audio/background_music.mp3".to_string(),
            volume: 1.0,
        }
    }
}

// ── Glyphs ───────────────────────────────────────────────────────────────────

fn default_glyphs() -> HashMap<String, String> {
    [
        (Sprite::UserPlane, "=≡►"),
        (Sprite::EnemyPlane, "◄≡="),
        (Sprite::BossPlane, "◄▓▓█▓"),
        (Sprite::UserFire, "─"),
        (Sprite::EnemyFire, "•"),
        (Sprite::Fireball, "●"),
    ]
    .into_iter()
    .map(|(sprite, glyph)| (sprite.name().to_string(), glyph.to_string()))
    .collect()
}

// ── Top level ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub levels: LevelTable,
    pub audio: AudioConfig,
    pub glyphs: HashMap<String, String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            world: WorldConfig::default(),
            levels: LevelTable::default(),
            audio: AudioConfig::default(),
            glyphs: default_glyphs(),
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Read `path`, falling back to the compiled defaults when the file is
    /// absent or unparsable.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    log::info!("loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("failed to parse {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("no {} found; using compiled defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_stock_game() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config.levels.one, LevelConfig::level_one());
        assert_eq!(config.world.tick_millis, 50);
        assert_eq!(config.glyphs.len(), 6);
    }

    #[test]
    fn level_override_replaces_entry() {
        let config = GameConfig::from_toml_str(
            r#"
            [levels.two]
            enemy_cap = 3
            spawn_probability = 0.5
            kills_to_advance = 4
            player_health = 2
            enemy_kind = "basic"
            "#,
        )
        .unwrap();
        assert_eq!(config.levels.two.enemy_cap, 3);
        assert_eq!(config.levels.boss.enemy_kind, EnemyKind::Boss);
    }

    #[test]
    fn bad_probability_fails_validation() {
        let mut level = LevelConfig::level_one();
        level.spawn_probability = 1.5;
        assert!(matches!(
            level.validate(LevelKind::One),
            Err(GameError::InvalidLevelConfig { level: LevelKind::One, .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            GameConfig::from_toml_str("world = 3"),
            Err(GameError::ConfigParse(_))
        ));
    }
}
