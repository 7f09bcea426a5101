use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{BufferSlot, MediaPlayer, MediaSource};
use crate::{catalog::ContentLookup, model::Step, time::IntervalTimer};

pub const DEFAULT_CROSSFADE_MS: u64 = 100;
pub const DEFAULT_CROSSFADE_STEPS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotId {
    A,
    B,
}

impl SlotId {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossfadeSettings {
    pub duration_ms: u64,
    pub steps: u32,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_CROSSFADE_MS,
            steps: DEFAULT_CROSSFADE_STEPS,
        }
    }
}

impl CrossfadeSettings {
    fn step_interval(self) -> Duration {
        Duration::from_millis(self.duration_ms) / self.steps.max(1)
    }
}

#[derive(Debug)]
struct Ramp {
    timer: IntervalTimer,
    step: u32,
    steps: u32,
    after_next: Option<MediaSource>,
}

/// Two buffer slots and the pointer naming the audible one.
///
/// Forward step changes overlap the outgoing and incoming slots for a short
/// linear ramp; everything else is a hard cut. At most one ramp is in flight
/// and a newer transition always wins over an older ramp.
pub struct CrossfadeEngine {
    slots: [BufferSlot; 2],
    active: SlotId,
    settings: CrossfadeSettings,
    ramp: Option<Ramp>,
    lookup: Arc<dyn ContentLookup>,
}

impl CrossfadeEngine {
    #[must_use]
    pub fn new(
        player_a: Box<dyn MediaPlayer>,
        player_b: Box<dyn MediaPlayer>,
        settings: CrossfadeSettings,
        lookup: Arc<dyn ContentLookup>,
    ) -> Self {
        Self {
            slots: [
                BufferSlot::new("a", player_a),
                BufferSlot::new("b", player_b),
            ],
            active: SlotId::A,
            settings,
            ramp: None,
            lookup,
        }
    }

    #[must_use]
    pub fn active_id(&self) -> SlotId {
        self.active
    }

    #[must_use]
    pub fn slot(&self, id: SlotId) -> &BufferSlot {
        &self.slots[id.index()]
    }

    #[must_use]
    pub fn active_slot(&self) -> &BufferSlot {
        self.slot(self.active)
    }

    #[must_use]
    pub fn inactive_slot(&self) -> &BufferSlot {
        self.slot(self.active.other())
    }

    #[must_use]
    pub fn is_crossfading(&self) -> bool {
        self.ramp.is_some()
    }

    #[must_use]
    pub fn settings(&self) -> CrossfadeSettings {
        self.settings
    }

    #[must_use]
    pub fn source_for(&self, step: &Step) -> MediaSource {
        MediaSource::new(
            self.lookup
                .media_path(&step.content, &step.content.media.audio),
        )
    }

    /// Hard cut: restarts `step` in the active slot and buffers `next`.
    #[instrument(skip_all, fields(content = %step.content_ref()))]
    pub fn play_step(&mut self, step: &Step, next: Option<&Step>) {
        self.cancel_ramp();
        self.load_active(step);
        self.active_mut().play();
        self.preload(next);
        debug!(slot = ?self.active, "step audio started");
    }

    #[instrument(skip_all, fields(content = %step.content_ref()))]
    pub fn prepare_step(&mut self, step: &Step, next: Option<&Step>) {
        self.cancel_ramp();
        self.active_mut().pause();
        self.load_active(step);
        self.preload(next);
        debug!(slot = ?self.active, "step audio staged");
    }

    /// Starts `next` silently in the inactive slot and ramps it in while the
    /// active slot ramps out. A ramp still in flight is completed first.
    #[instrument(skip_all, fields(content = %next.content_ref()))]
    pub fn crossfade_to(&mut self, next: &Step, after_next: Option<&Step>) {
        if self.ramp.is_some() {
            debug!("superseding in-flight crossfade");
            self.complete_ramp();
        }

        let source = self.source_for(next);
        let after_next = after_next.map(|step| self.source_for(step));
        let incoming = self.inactive_mut();
        incoming.load(&source);
        incoming.set_volume(0.0);
        incoming.seek(0.0);
        incoming.set_looping(true);
        incoming.play();

        let steps = self.settings.steps;
        self.ramp = Some(Ramp {
            timer: IntervalTimer::new(self.settings.step_interval()),
            step: 0,
            steps,
            after_next,
        });
        if steps == 0 || self.settings.duration_ms == 0 {
            self.complete_ramp();
        }
    }

    pub fn advance(&mut self, dt_sec: f64) {
        let Some(ramp) = self.ramp.as_mut() else {
            return;
        };

        let fires = ramp.timer.advance(dt_sec);
        if fires == 0 {
            return;
        }
        ramp.step = ramp.step.saturating_add(fires).min(ramp.steps);
        let (step, steps) = (ramp.step, ramp.steps);

        let t = step as f32 / steps as f32;
        self.active_mut().set_volume((1.0 - t).max(0.0));
        self.inactive_mut().set_volume(t.min(1.0));

        if step >= steps {
            self.complete_ramp();
        }
    }

    pub fn pause_audio(&mut self) {
        if self.ramp.is_some() {
            self.complete_ramp();
        }
        self.active_mut().pause();
    }

    pub fn resume_audio(&mut self) {
        let active = self.active_mut();
        if active.source().is_some() {
            active.play();
        }
    }

    #[instrument(skip(self))]
    pub fn stop_all(&mut self) {
        if let Some(mut ramp) = self.ramp.take() {
            ramp.timer.cancel();
        }
        for slot in &mut self.slots {
            slot.clear();
            slot.set_volume(1.0);
        }
        self.active = SlotId::A;
        info!("audio stopped");
    }

    pub fn seek_to(&mut self, position_sec: f64) {
        self.active_mut().seek(position_sec);
    }

    pub fn render(&mut self, out: &mut [f32], sample_rate: u32) {
        for slot in &mut self.slots {
            slot.render(out, sample_rate);
        }
    }

    fn load_active(&mut self, step: &Step) {
        let source = self.source_for(step);
        let active = self.active_mut();
        active.load(&source);
        active.set_volume(1.0);
        active.seek(0.0);
        active.set_looping(true);
    }

    fn preload(&mut self, next: Option<&Step>) {
        let Some(next) = next else {
            return;
        };
        let source = self.source_for(next);
        self.inactive_mut().load(&source);
    }

    /// Snaps the ramp to its end state: outgoing slot paused at full volume
    /// for reuse, pointer flipped, following source buffered.
    fn complete_ramp(&mut self) {
        let Some(mut ramp) = self.ramp.take() else {
            return;
        };
        ramp.timer.cancel();

        let outgoing = self.active_mut();
        outgoing.pause();
        outgoing.set_volume(1.0);
        self.active = self.active.other();
        self.active_mut().set_volume(1.0);

        if let Some(source) = ramp.after_next {
            self.inactive_mut().load(&source);
        }
        debug!(active = ?self.active, "crossfade complete");
    }

    fn cancel_ramp(&mut self) {
        let Some(mut ramp) = self.ramp.take() else {
            return;
        };
        ramp.timer.cancel();

        let incoming = self.inactive_mut();
        incoming.pause();
        incoming.set_volume(1.0);
        debug!("crossfade cancelled");
    }

    fn active_mut(&mut self) -> &mut BufferSlot {
        &mut self.slots[self.active.index()]
    }

    fn inactive_mut(&mut self) -> &mut BufferSlot {
        &mut self.slots[self.active.other().index()]
    }
}
