//! Error types for the simulation core and the terminal front end.
//!
//! Only construction-time failures travel up to `main`.  Everything that can
//! go wrong while a level is running (spawning, audio, missing glyphs) is
//! logged and swallowed at the point where it happens.

use crate::entities::LevelKind;

#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// A level table entry that cannot drive a level.
    #[error("invalid configuration for level {level:?}: {reason}")]
    InvalidLevelConfig { level: LevelKind, reason: String },

    /// The level factory could not build the requested level.
    #[error("could not construct level {level:?}: {reason}")]
    LevelConstruction { level: LevelKind, reason: String },

    /// A spawn was refused, e.g. the enemy collection is already at its cap.
    #[error("spawn rejected: {0}")]
    SpawnRejected(String),

    /// The config file exists but is not valid TOML for `GameConfig`.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Terminal or filesystem IO.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, GameError>;
