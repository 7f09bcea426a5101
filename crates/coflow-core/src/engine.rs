use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    audio::{
        AudioCache, CrossfadeEngine, CrossfadeSettings, DecodedPlayer, MediaPlayer, MediaSource,
    },
    catalog::{self, CatalogError, ContentLookup},
    cues::{CueEvent, FiredCues, cues_to_fire},
    model::{ContentId, Flow, SessionStatus, Step},
    sequencer::{Sequencer, SessionView, Transition},
    snapshot::{
        MemorySnapshotStorage, SessionSnapshot, SnapshotError, SnapshotLoop, SnapshotSettings,
        SnapshotStorage, SnapshotStore, restore_from_snapshot,
    },
    wake_lock::{NoopWakeLock, WakeLockGuard, WakeLockProvider},
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("content not found: {0}")]
    ContentNotFound(ContentId),
    #[error("flow not found: {0}")]
    FlowNotFound(String),
    #[error("session has no steps: {0}")]
    EmptySession(String),
    #[error("invalid duration for {id}: {duration_sec}")]
    InvalidDuration { id: ContentId, duration_sec: f64 },
    #[error("snapshot rejected: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("io error: {0}")]
    Io(String),
}

impl From<anyhow::Error> for EngineError {
    fn from(value: anyhow::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<CatalogError> for EngineError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::ContentNotFound(id) => Self::ContentNotFound(id),
            CatalogError::FlowNotFound(id) => Self::FlowNotFound(id),
            CatalogError::EmptyFlow(id) => Self::EmptySession(id),
            CatalogError::InvalidDuration { id, duration_sec } => {
                Self::InvalidDuration { id, duration_sec }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub crossfade: CrossfadeSettings,
    pub snapshot: SnapshotSettings,
    pub wake_lock_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            crossfade: CrossfadeSettings::default(),
            snapshot: SnapshotSettings::default(),
            wake_lock_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameOutcome {
    pub cues: Vec<CueEvent>,
    pub transitions: Vec<Transition>,
}

impl FrameOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty() && self.transitions.is_empty()
    }
}

pub struct Engine {
    lookup: Arc<dyn ContentLookup>,
    settings: EngineSettings,
    sequencer: Sequencer,
    audio: CrossfadeEngine,
    audio_step: Option<usize>,
    fired: FiredCues,
    snapshots: SnapshotStore,
    snapshot_loop: Option<SnapshotLoop>,
    wake_lock: WakeLockGuard,
    pending: Vec<Transition>,
}

impl Engine {
    #[must_use]
    pub fn new(lookup: Arc<dyn ContentLookup>, settings: EngineSettings) -> Self {
        let cache = Arc::new(AudioCache::new());
        let audio = CrossfadeEngine::new(
            Box::new(DecodedPlayer::new(Arc::clone(&cache))),
            Box::new(DecodedPlayer::new(cache)),
            settings.crossfade,
            Arc::clone(&lookup),
        );

        Self {
            lookup,
            settings,
            sequencer: Sequencer::new(),
            audio,
            audio_step: None,
            fired: FiredCues::new(),
            snapshots: SnapshotStore::new(Box::new(MemorySnapshotStorage::new()), settings.snapshot),
            snapshot_loop: None,
            wake_lock: WakeLockGuard::new(Box::new(NoopWakeLock), settings.wake_lock_enabled),
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_players(
        mut self,
        player_a: Box<dyn MediaPlayer>,
        player_b: Box<dyn MediaPlayer>,
    ) -> Self {
        self.audio = CrossfadeEngine::new(
            player_a,
            player_b,
            self.settings.crossfade,
            Arc::clone(&self.lookup),
        );
        self.audio_step = None;
        self
    }

    #[must_use]
    pub fn with_audio_cache(self, cache: Arc<AudioCache>) -> Self {
        self.with_players(
            Box::new(DecodedPlayer::new(Arc::clone(&cache))),
            Box::new(DecodedPlayer::new(cache)),
        )
    }

    #[must_use]
    pub fn with_snapshot_storage(mut self, storage: Box<dyn SnapshotStorage>) -> Self {
        self.snapshots = SnapshotStore::new(storage, self.settings.snapshot);
        self
    }

    #[must_use]
    pub fn with_wake_lock(mut self, provider: Box<dyn WakeLockProvider>) -> Self {
        self.wake_lock = WakeLockGuard::new(provider, self.wake_lock.is_enabled());
        self
    }

    #[must_use]
    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    #[must_use]
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    #[must_use]
    pub fn audio(&self) -> &CrossfadeEngine {
        &self.audio
    }

    #[must_use]
    pub fn wake_lock(&self) -> &WakeLockGuard {
        &self.wake_lock
    }

    #[must_use]
    pub fn fired_cues(&self) -> &FiredCues {
        &self.fired
    }

    #[must_use]
    pub fn is_snapshot_loop_running(&self) -> bool {
        self.snapshot_loop
            .as_ref()
            .is_some_and(SnapshotLoop::is_running)
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        self.sequencer.view()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.sequencer.status()
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        self.sequencer.steps()
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.sequencer.current_step()
    }

    #[must_use]
    pub fn safety_considerations(&self) -> Vec<String> {
        catalog::safety_considerations(self.sequencer.steps())
    }

    #[instrument(skip(self, steps), fields(step_count = steps.len()))]
    pub fn load_steps(&mut self, steps: Vec<Step>) -> Result<(), EngineError> {
        catalog::check_steps(&steps)?;
        self.sequencer.load(steps);
        self.route();
        Ok(())
    }

    #[instrument(skip(self, flow), fields(flow_id = %flow.id))]
    pub fn load_flow(&mut self, flow: &Flow) -> Result<(), EngineError> {
        let steps = catalog::resolve_flow(flow, self.lookup.as_ref())?;
        self.load_steps(steps)?;
        info!(total_sec = flow.total_duration_sec(), "flow loaded");
        Ok(())
    }

    #[instrument(skip(self), fields(content = %id))]
    pub fn load_content(&mut self, id: &ContentId) -> Result<(), EngineError> {
        let steps = catalog::steps_for_content(id, self.lookup.as_ref())?;
        self.load_steps(steps)
    }

    #[instrument(skip(self))]
    pub fn play(&mut self) {
        self.sequencer.play();
        self.route();
    }

    #[instrument(skip(self))]
    pub fn pause(&mut self) {
        self.sequencer.pause();
        self.route();
    }

    pub fn toggle(&mut self) {
        if self.sequencer.status() == SessionStatus::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    #[instrument(skip(self), fields(index = self.sequencer.current_index()))]
    pub fn next(&mut self) {
        self.sequencer.next();
        self.route();
    }

    #[instrument(skip(self), fields(index = self.sequencer.current_index()))]
    pub fn prev(&mut self) {
        self.sequencer.prev();
        self.route();
    }

    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.sequencer.reset();
        self.route();
    }

    #[instrument(skip(self))]
    pub fn seek(&mut self, position_sec: f64) {
        let index = self.sequencer.current_index();
        self.sequencer.seek(position_sec);
        self.route();
        if self.sequencer.current_index() == index && self.audio_step == Some(index) {
            self.audio.seek_to(self.sequencer.elapsed_sec());
        }
    }

    #[must_use]
    pub fn pending_snapshot(&self) -> Option<SessionSnapshot> {
        self.snapshots.get_snapshot(self.lookup.as_ref())
    }

    #[instrument(skip(self, snapshot), fields(step_index = snapshot.step_index))]
    pub fn resume_from_snapshot(&mut self, snapshot: &SessionSnapshot) -> Result<(), EngineError> {
        restore_from_snapshot(snapshot, self.lookup.as_ref(), &mut self.sequencer)?;
        self.route();
        Ok(())
    }

    pub fn discard_snapshot(&mut self) {
        self.snapshots.clear_snapshot();
    }

    pub fn save_snapshot(&self) -> bool {
        self.snapshots.save_snapshot(&self.sequencer)
    }

    pub fn set_wake_lock_enabled(&mut self, enabled: bool) {
        self.wake_lock.set_enabled(enabled);
    }

    pub fn set_visibility(&mut self, visible: bool) {
        self.wake_lock.on_visibility(visible);
    }

    pub fn frame(&mut self, dt_sec: f64) -> FrameOutcome {
        let dt_sec = if dt_sec.is_finite() && dt_sec > 0.0 {
            dt_sec
        } else {
            0.0
        };

        self.sequencer.tick(dt_sec);
        self.route();

        let cues = if self.sequencer.status() == SessionStatus::Playing {
            self.poll_cues()
        } else {
            Vec::new()
        };

        self.audio.advance(dt_sec);
        if let Some(snapshot_loop) = self.snapshot_loop.as_mut() {
            snapshot_loop.advance(dt_sec, &self.snapshots, &self.sequencer);
        }
        self.wake_lock.poll();

        FrameOutcome {
            cues,
            transitions: std::mem::take(&mut self.pending),
        }
    }

    pub fn render_audio(&mut self, out: &mut [f32], sample_rate: u32) {
        self.audio.render(out, sample_rate);
    }

    // Distinct audio files of the loaded session, in step order.
    #[must_use]
    pub fn media_sources(&self) -> Vec<MediaSource> {
        let mut sources: Vec<MediaSource> = Vec::new();
        for step in self.sequencer.steps() {
            let source = self.audio.source_for(step);
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        sources
    }

    // The persisted snapshot is kept.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) {
        self.audio.stop_all();
        self.audio_step = None;
        self.stop_snapshot_loop();
        self.wake_lock.shutdown();
        info!("engine shut down");
    }

    fn poll_cues(&mut self) -> Vec<CueEvent> {
        let step_index = self.sequencer.current_index();
        let elapsed_sec = self.sequencer.elapsed_sec();
        let Some(step) = self.sequencer.current_step() else {
            return Vec::new();
        };

        cues_to_fire(
            step_index,
            elapsed_sec,
            step.duration_sec,
            step.side,
            &mut self.fired,
        )
        .into_iter()
        .map(|cue| {
            debug!(%cue, step_index, elapsed_sec, "cue fired");
            CueEvent { cue, step_index }
        })
        .collect()
    }

    fn route(&mut self) {
        for transition in self.sequencer.drain_transitions() {
            self.apply(transition);
            self.pending.push(transition);
        }
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Loaded => {
                self.audio.stop_all();
                self.audio_step = None;
                self.fired.clear();
            }
            Transition::StatusChanged { from, to } => {
                self.on_status_changed(from, to);
                self.wake_lock.on_status(to);
            }
            Transition::StepChanged { from, to } => {
                self.fired.clear();
                self.on_step_changed(from, to);
            }
            Transition::StepRestarted { index } => {
                self.fired.clear();
                self.cut_to(index);
            }
        }
    }

    fn on_status_changed(&mut self, from: SessionStatus, to: SessionStatus) {
        debug!(%from, %to, "routing status change");
        match to {
            SessionStatus::Playing => {
                self.start_audio();
                if !self.is_snapshot_loop_running() {
                    self.snapshot_loop = Some(self.snapshots.start_loop());
                }
            }
            SessionStatus::Paused => self.audio.pause_audio(),
            SessionStatus::Idle | SessionStatus::Completed => {
                self.audio.stop_all();
                self.audio_step = None;
                self.fired.clear();
                self.stop_snapshot_loop();
                if to == SessionStatus::Completed {
                    self.snapshots.clear_snapshot();
                    info!("session completed, snapshot cleared");
                }
            }
        }
    }

    fn on_step_changed(&mut self, from: usize, to: usize) {
        let playing = self.sequencer.status() == SessionStatus::Playing;
        if !(to > from && playing) {
            self.cut_to(to);
            return;
        }

        let steps = self.sequencer.steps();
        let Some(next) = steps.get(to) else {
            warn!(to, "step change past end of session");
            return;
        };
        self.audio.crossfade_to(next, steps.get(to + 1));
        self.audio_step = Some(to);
    }

    // Audible when playing, staged otherwise.
    fn cut_to(&mut self, index: usize) {
        let playing = self.sequencer.status() == SessionStatus::Playing;
        let steps = self.sequencer.steps();
        let Some(step) = steps.get(index) else {
            return;
        };

        if playing {
            self.audio.play_step(step, steps.get(index + 1));
        } else {
            self.audio.prepare_step(step, steps.get(index + 1));
        }
        self.audio_step = Some(index);
    }

    fn start_audio(&mut self) {
        let index = self.sequencer.current_index();
        if self.audio_step == Some(index) {
            self.audio.resume_audio();
            return;
        }

        self.cut_to(index);
        let elapsed_sec = self.sequencer.elapsed_sec();
        if elapsed_sec > 0.0 {
            self.audio.seek_to(elapsed_sec);
        }
    }

    fn stop_snapshot_loop(&mut self) {
        if let Some(mut snapshot_loop) = self.snapshot_loop.take() {
            snapshot_loop.stop();
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .field("sequencer", &self.sequencer)
            .field("audio_step", &self.audio_step)
            .field("fired", &self.fired)
            .field("wake_lock", &self.wake_lock)
            .finish_non_exhaustive()
    }
}
