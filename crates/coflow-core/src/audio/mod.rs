//! Double-buffered step audio.
//!
//! Audio here is accompaniment only: the sequencer timer is the clock, and
//! nothing in this module reports a failure back to its caller. Load, play
//! and seek errors are logged and dropped so a missing file or a refused
//! playback never stalls a session.

pub mod crossfade;
pub mod decoded;
pub mod slot;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use crossfade::{CrossfadeEngine, CrossfadeSettings, SlotId};
pub use decoded::{AudioCache, DecodedAudio, DecodedPlayer, decode_audio_file_mono};
pub use slot::BufferSlot;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("no source loaded")]
    NotLoaded,
    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("playback refused: {0}")]
    Refused(String),
}

/// Location of a step's audio file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaSource(PathBuf);

impl MediaSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Playback handle behind one buffer slot.
pub trait MediaPlayer: Send {
    /// Buffers `source` without starting playback.
    fn load(&mut self, source: &MediaSource) -> Result<(), PlaybackError>;

    fn unload(&mut self);

    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    fn set_volume(&mut self, volume: f32);

    fn set_looping(&mut self, looping: bool);

    fn seek(&mut self, position_sec: f64) -> Result<(), PlaybackError>;

    fn position_sec(&self) -> f64;

    /// Mixes this player's output into `out` (mono, additive). Players that
    /// drive a device themselves leave the buffer alone.
    fn render(&mut self, _out: &mut [f32], _sample_rate: u32) {}
}
