use tracing::{debug, warn};

use super::{MediaPlayer, MediaSource};

/// One of the two interchangeable playback handles.
///
/// The slot mirrors the state it pushed into its player so the engine can
/// reason about it without querying the backend, and it swallows every
/// backend error.
pub struct BufferSlot {
    name: &'static str,
    player: Box<dyn MediaPlayer>,
    source: Option<MediaSource>,
    volume: f32,
    looping: bool,
    playing: bool,
}

impl BufferSlot {
    #[must_use]
    pub fn new(name: &'static str, player: Box<dyn MediaPlayer>) -> Self {
        Self {
            name,
            player,
            source: None,
            volume: 1.0,
            looping: false,
            playing: false,
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn position_sec(&self) -> f64 {
        self.player.position_sec()
    }

    /// Buffers `source` unless it is already the slot's source.
    pub fn load(&mut self, source: &MediaSource) {
        if self.source.as_ref() == Some(source) {
            return;
        }

        if let Err(error) = self.player.load(source) {
            warn!(slot = self.name, path = %source.path().display(), %error, "audio load failed");
        } else {
            debug!(slot = self.name, path = %source.path().display(), "audio buffered");
        }
        self.source = Some(source.clone());
    }

    pub fn play(&mut self) {
        if self.source.is_none() {
            return;
        }

        match self.player.play() {
            Ok(()) => self.playing = true,
            Err(error) => {
                self.playing = false;
                warn!(slot = self.name, %error, "audio playback failed");
            }
        }
    }

    pub fn pause(&mut self) {
        self.player.pause();
        self.playing = false;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.player.set_volume(self.volume);
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        self.player.set_looping(looping);
    }

    pub fn seek(&mut self, position_sec: f64) {
        if self.source.is_none() {
            return;
        }
        if let Err(error) = self.player.seek(position_sec.max(0.0)) {
            debug!(slot = self.name, position_sec, %error, "audio seek failed");
        }
    }

    pub fn clear(&mut self) {
        self.pause();
        self.seek(0.0);
        self.player.unload();
        self.source = None;
    }

    pub fn render(&mut self, out: &mut [f32], sample_rate: u32) {
        if self.playing {
            self.player.render(out, sample_rate);
        }
    }
}

impl std::fmt::Debug for BufferSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferSlot")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("volume", &self.volume)
            .field("looping", &self.looping)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}
