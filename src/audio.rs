//! Background music collaborator.
//!
//! Playback is fire-and-forget: the progression layer logs any `AudioError`
//! and carries on.  The terminal build has no sound device, so
//! [`SilentPlayer`] only tracks what would be playing.

use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackId {
    Background,
}

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("no file registered for track {0:?}")]
    UnknownTrack(TrackId),

    #[error("music file not found: {}", .0.display())]
    MissingFile(PathBuf),
}

pub trait Audio {
    fn play(&mut self, track: TrackId) -> Result<(), AudioError>;
    fn stop(&mut self);
    /// Volume in [0, 1]; out-of-range values are clamped.
    fn set_volume(&mut self, volume: f32);
}

/// Tracks the current track and volume without producing sound.
#[derive(Debug, Default)]
pub struct SilentPlayer {
    tracks: HashMap<TrackId, PathBuf>,
    playing: Option<TrackId>,
    volume: f32,
}

impl SilentPlayer {
    pub fn new(tracks: HashMap<TrackId, PathBuf>, volume: f32) -> Self {
        SilentPlayer {
            tracks,
            playing: None,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn playing(&self) -> Option<TrackId> {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl Audio for SilentPlayer {
    fn play(&mut self, track: TrackId) -> Result<(), AudioError> {
        let path = self
            .tracks
            .get(&track)
            .ok_or(AudioError::UnknownTrack(track))?;
        if !path.exists() {
            return Err(AudioError::MissingFile(path.clone()));
        }
        log::info!("music: {:?} from {} (looping)", track, path.display());
        self.playing = Some(track);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(track) = self.playing.take() {
            log::info!("music: stopped {:?}", track);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}
