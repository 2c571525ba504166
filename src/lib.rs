//! Simulation core of a side-on arcade shooter: actors, collisions, enemy
//! spawning, and the level win/lose progression, with rendering, audio and
//! input behind narrow collaborator traits.

pub mod actors;
pub mod audio;
pub mod collaborators;
pub mod collision;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod level;
pub mod progression;
pub mod spawner;
