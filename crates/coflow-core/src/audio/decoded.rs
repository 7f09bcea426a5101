use std::{
    collections::HashMap,
    fs::File,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error as SymphoniaError,
    formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};
use tracing::{debug, info, instrument, warn};

use super::{MediaPlayer, MediaSource, PlaybackError};

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    #[must_use]
    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

#[instrument(fields(path = %path.display()))]
pub fn decode_audio_file_mono(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path)
        .with_context(|| format!("failed to open audio file: {}", path.display()))?;
    let source = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|value| value.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        source,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| anyhow::anyhow!("no default audio track found in {}", path.display()))?;
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(48_000);
    let mut channels = track
        .codec_params
        .channels
        .map(|value| value.count() as u16)
        .unwrap_or(2);
    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(error)) if error.kind() == ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                return Err(anyhow::anyhow!(
                    "audio stream reset required for {}",
                    path.display()
                ));
            }
            Err(error) => return Err(error.into()),
        };

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(error) => return Err(error.into()),
        };

        sample_rate = decoded.spec().rate;
        channels = decoded.spec().channels.count() as u16;
        push_mono_samples(decoded, &mut samples);
    }

    if samples.is_empty() {
        return Err(anyhow::anyhow!(
            "decoded zero samples from {}",
            path.display()
        ));
    }

    debug!(
        sample_rate,
        channels,
        total_frames = samples.len(),
        "audio decode complete"
    );

    Ok(DecodedAudio {
        sample_rate,
        channels,
        samples,
    })
}

fn push_mono_samples(decoded: symphonia::core::audio::AudioBufferRef<'_>, samples: &mut Vec<f32>) {
    let spec = *decoded.spec();
    let channel_count = spec.channels.count().max(1);
    let mut sample_buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
    sample_buffer.copy_interleaved_ref(decoded);

    for frame in sample_buffer.samples().chunks(channel_count) {
        let sum: f32 = frame.iter().copied().sum();
        samples.push(sum / channel_count as f32);
    }
}

/// Decoded sources shared by both slots, so a gesture repeated across steps
/// is decoded once.
#[derive(Debug, Default)]
pub struct AudioCache {
    entries: Mutex<HashMap<PathBuf, Arc<DecodedAudio>>>,
}

impl AudioCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_decode(&self, path: &Path) -> Result<Arc<DecodedAudio>> {
        if let Some(hit) = self.entries.lock().get(path) {
            debug!(path = %path.display(), "audio cache hit");
            return Ok(Arc::clone(hit));
        }

        let decoded = Arc::new(decode_audio_file_mono(path)?);
        self.entries
            .lock()
            .insert(path.to_path_buf(), Arc::clone(&decoded));
        Ok(decoded)
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.lock().contains_key(path)
    }

    /// Decodes every source not cached yet and returns how many were added.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn warm(&self, sources: &[MediaSource]) -> usize {
        let mut added = 0;
        for source in sources {
            if self.contains(source.path()) {
                continue;
            }
            match self.get_or_decode(source.path()) {
                Ok(_) => added += 1,
                Err(error) => {
                    warn!(path = %source.path().display(), %error, "audio warm-up failed");
                }
            }
        }
        info!(added, cached = self.len(), "audio cache warmed");
        added
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Software player over a fully decoded mono buffer. Output is mixed into
/// caller-provided buffers by `render`, resampled by nearest frame.
#[derive(Debug)]
pub struct DecodedPlayer {
    cache: Arc<AudioCache>,
    audio: Option<Arc<DecodedAudio>>,
    position_frames: f64,
    volume: f32,
    looping: bool,
    playing: bool,
}

impl DecodedPlayer {
    #[must_use]
    pub fn new(cache: Arc<AudioCache>) -> Self {
        Self {
            cache,
            audio: None,
            position_frames: 0.0,
            volume: 1.0,
            looping: false,
            playing: false,
        }
    }
}

impl MediaPlayer for DecodedPlayer {
    fn load(&mut self, source: &MediaSource) -> Result<(), PlaybackError> {
        self.audio = None;
        self.position_frames = 0.0;
        let decoded =
            self.cache
                .get_or_decode(source.path())
                .map_err(|error| PlaybackError::Decode {
                    path: source.path().to_path_buf(),
                    reason: format!("{error:#}"),
                })?;
        self.audio = Some(decoded);
        Ok(())
    }

    fn unload(&mut self) {
        self.audio = None;
        self.position_frames = 0.0;
        self.playing = false;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.audio.is_none() {
            return Err(PlaybackError::NotLoaded);
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn seek(&mut self, position_sec: f64) -> Result<(), PlaybackError> {
        let audio = self.audio.as_ref().ok_or(PlaybackError::NotLoaded)?;
        let length = audio.samples.len() as f64;
        let target = position_sec.max(0.0) * f64::from(audio.sample_rate);
        self.position_frames = if self.looping && length > 0.0 {
            target % length
        } else {
            target.min(length)
        };
        Ok(())
    }

    fn position_sec(&self) -> f64 {
        self.audio.as_ref().map_or(0.0, |audio| {
            if audio.sample_rate == 0 {
                0.0
            } else {
                self.position_frames / f64::from(audio.sample_rate)
            }
        })
    }

    fn render(&mut self, out: &mut [f32], sample_rate: u32) {
        let Some(audio) = self.audio.as_ref() else {
            return;
        };
        if !self.playing || sample_rate == 0 || audio.samples.is_empty() {
            return;
        }

        let length = audio.samples.len() as f64;
        let increment = f64::from(audio.sample_rate) / f64::from(sample_rate);
        for sample in out.iter_mut() {
            if self.position_frames >= length {
                if self.looping {
                    self.position_frames %= length;
                } else {
                    self.playing = false;
                    break;
                }
            }
            let index = (self.position_frames as usize).min(audio.samples.len() - 1);
            *sample += audio.samples[index] * self.volume;
            self.position_frames += increment;
        }
    }
}
