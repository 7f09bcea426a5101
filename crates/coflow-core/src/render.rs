use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    cues::CueEvent,
    engine::Engine,
    model::SessionStatus,
    time::frames_to_seconds,
};

pub const DEFAULT_RENDER_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_FRAME_RATE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub sample_rate: u32,
    pub frame_rate: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_RENDER_SAMPLE_RATE,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl RenderOptions {
    fn samples_per_frame(self) -> usize {
        (self.sample_rate / self.frame_rate.max(1)).max(1) as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderReport {
    pub frames: u64,
    pub sample_rate: u32,
    pub duration_sec: f64,
    pub cues: Vec<CueEvent>,
    pub completed: bool,
}

/// Plays the loaded session start to finish at a fixed frame cadence and
/// returns the mixed mono output. Cues and timing follow the same path as
/// real-time playback.
#[instrument(skip(engine), fields(steps = engine.steps().len()))]
pub fn render_session_samples(
    engine: &mut Engine,
    options: RenderOptions,
) -> (Vec<f32>, RenderReport) {
    let mut report = RenderReport {
        sample_rate: options.sample_rate,
        ..RenderReport::default()
    };
    let mut samples = Vec::new();

    if options.sample_rate == 0 || options.frame_rate == 0 {
        warn!(
            sample_rate = options.sample_rate,
            frame_rate = options.frame_rate,
            "nothing to render, rates must be positive"
        );
        return (samples, report);
    }

    engine.play();
    if engine.status() != SessionStatus::Playing {
        warn!("nothing to render, session did not start");
        return (samples, report);
    }

    let block_len = options.samples_per_frame();
    let dt_sec = frames_to_seconds(block_len, options.sample_rate);
    let frame_budget = frame_budget(engine, dt_sec, options.frame_rate);
    let mut block = vec![0.0_f32; block_len];

    while report.frames < frame_budget {
        let outcome = engine.frame(dt_sec);
        report.frames += 1;
        report.cues.extend(outcome.cues);

        if engine.status() != SessionStatus::Playing {
            report.completed = engine.status() == SessionStatus::Completed;
            break;
        }

        block.fill(0.0);
        engine.render_audio(&mut block, options.sample_rate);
        samples.extend_from_slice(&block);
    }

    report.duration_sec = frames_to_seconds(samples.len(), options.sample_rate);
    info!(
        frames = report.frames,
        duration_sec = report.duration_sec,
        cues = report.cues.len(),
        completed = report.completed,
        "session rendered"
    );
    (samples, report)
}

#[instrument(skip(engine), fields(path = %path.display()))]
pub fn render_session_to_wav(
    engine: &mut Engine,
    path: &Path,
    options: RenderOptions,
) -> Result<RenderReport> {
    let (samples, report) = render_session_samples(engine, options);
    write_wav(path, &samples, options.sample_rate)?;
    Ok(report)
}

pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create wav output directory: {}", parent.display())
        })?;
    }

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create wav file: {}", path.display()))?;

    for sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
        writer
            .write_sample(quantized)
            .context("failed to write left channel sample")?;
        writer
            .write_sample(quantized)
            .context("failed to write right channel sample")?;
    }

    writer.finalize().context("failed to finalize wav file")?;
    info!(frames = samples.len(), "wav render written");
    Ok(())
}

/// Upper bound on frames for the loaded session: every step can overshoot by
/// at most one frame, plus a second of slack.
fn frame_budget(engine: &Engine, dt_sec: f64, frame_rate: u32) -> u64 {
    if !(dt_sec.is_finite() && dt_sec > 0.0) {
        return 0;
    }

    let view = engine.view();
    let remaining_sec = (view.session_total_sec - view.session_elapsed_sec).max(0.0);
    ((remaining_sec / dt_sec).ceil() as u64)
        .saturating_add(view.step_count as u64)
        .saturating_add(u64::from(frame_rate))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        audio::{MediaPlayer, MediaSource, PlaybackError},
        cues::CueType,
        engine::EngineSettings,
        fixtures::{ScriptedPlayer, steps_with_durations, test_catalog},
    };

    /// Emits a constant level while playing.
    #[derive(Debug, Default)]
    struct ConstantPlayer {
        inner: ScriptedPlayer,
        playing: bool,
        volume: f32,
    }

    impl MediaPlayer for ConstantPlayer {
        fn load(&mut self, source: &MediaSource) -> Result<(), PlaybackError> {
            self.inner.load(source)
        }

        fn unload(&mut self) {
            self.inner.unload();
            self.playing = false;
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            self.inner.play()?;
            self.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.playing = false;
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }

        fn set_looping(&mut self, _looping: bool) {}

        fn seek(&mut self, position_sec: f64) -> Result<(), PlaybackError> {
            self.inner.seek(position_sec)
        }

        fn position_sec(&self) -> f64 {
            self.inner.position_sec()
        }

        fn render(&mut self, out: &mut [f32], _sample_rate: u32) {
            if self.playing {
                for sample in out.iter_mut() {
                    *sample += 0.25 * self.volume;
                }
            }
        }
    }

    fn engine() -> Engine {
        Engine::new(Arc::new(test_catalog()), EngineSettings::default()).with_players(
            Box::new(ConstantPlayer::default()),
            Box::new(ConstantPlayer::default()),
        )
    }

    #[test]
    fn renders_whole_session_with_cues() {
        let mut engine = engine();
        engine
            .load_steps(steps_with_durations(&[1.0, 1.0]))
            .expect("steps should load");

        let options = RenderOptions {
            sample_rate: 8_000,
            frame_rate: 50,
        };
        let (samples, report) = render_session_samples(&mut engine, options);

        assert!(report.completed);
        assert!((report.duration_sec - 2.0).abs() < 0.05);
        assert_eq!(samples.len() % 160, 0);
        assert!(samples.iter().all(|sample| (sample - 0.25).abs() < 1e-4));
        assert_eq!(
            report
                .cues
                .iter()
                .filter(|event| event.cue == CueType::Start)
                .count(),
            2
        );
        assert_eq!(engine.status(), SessionStatus::Completed);
    }

    #[test]
    fn empty_session_renders_nothing() {
        let mut engine = engine();
        let (samples, report) = render_session_samples(&mut engine, RenderOptions::default());
        assert!(samples.is_empty());
        assert!(!report.completed);
        assert_eq!(report.frames, 0);
    }

    #[test]
    fn zero_rates_render_nothing() {
        for (sample_rate, frame_rate) in [(0, 60), (44_100, 0), (0, 0)] {
            let mut engine = engine();
            engine
                .load_steps(steps_with_durations(&[1.0]))
                .expect("steps should load");

            let (samples, report) = render_session_samples(
                &mut engine,
                RenderOptions {
                    sample_rate,
                    frame_rate,
                },
            );
            assert!(samples.is_empty());
            assert_eq!(report.frames, 0);
            assert_eq!(engine.status(), SessionStatus::Idle);
        }
    }

    #[test]
    fn frame_budget_saturates_and_rejects_bad_steps() {
        let mut engine = engine();
        engine
            .load_steps(steps_with_durations(&[1.0]))
            .expect("steps should load");
        assert_eq!(frame_budget(&engine, 0.0, 60), 0);
        assert_eq!(frame_budget(&engine, f64::NAN, 60), 0);
        assert_eq!(frame_budget(&engine, 1e-300, u32::MAX), u64::MAX);
    }

    #[test]
    fn wav_file_has_stereo_frames() {
        let temp = tempfile::tempdir().expect("tempdir should be creatable");
        let path = temp.path().join("out/session.wav");
        write_wav(&path, &[0.0, 0.5, -0.5, 2.0], 8_000).expect("wav should write");

        let reader = hound::WavReader::open(&path).expect("wav should open");
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.duration(), 4);
    }
}
