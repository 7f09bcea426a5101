use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    model::{SessionStatus, Step, total_duration_sec},
    time::remaining_seconds,
};

/// State change recorded by the sequencer, drained once per frame by the
/// engine so dependent components react in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Loaded,
    StatusChanged {
        from: SessionStatus,
        to: SessionStatus,
    },
    StepChanged {
        from: usize,
        to: usize,
    },
    StepRestarted {
        index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionView {
    pub status: SessionStatus,
    pub current_index: usize,
    pub step_count: usize,
    pub elapsed_sec: f64,
    pub remaining_sec: u64,
    pub session_elapsed_sec: f64,
    pub session_total_sec: f64,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    status: SessionStatus,
    steps: Vec<Step>,
    current_index: usize,
    elapsed_sec: f64,
    transitions: Vec<Transition>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            steps: Vec::new(),
            current_index: 0,
            elapsed_sec: 0.0,
            transitions: Vec::new(),
        }
    }
}

impl Sequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed_sec
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current_index)
    }

    #[must_use]
    pub fn next_step(&self) -> Option<&Step> {
        self.steps.get(self.current_index + 1)
    }

    #[must_use]
    pub fn step_after_next(&self) -> Option<&Step> {
        self.steps.get(self.current_index + 2)
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        let duration_sec = self.current_step().map_or(0.0, |step| step.duration_sec);
        let completed_sec: f64 = self
            .steps
            .iter()
            .take(self.current_index)
            .map(|step| step.duration_sec)
            .sum();

        SessionView {
            status: self.status,
            current_index: self.current_index,
            step_count: self.steps.len(),
            elapsed_sec: self.elapsed_sec,
            remaining_sec: remaining_seconds(duration_sec, self.elapsed_sec),
            session_elapsed_sec: completed_sec + self.elapsed_sec,
            session_total_sec: total_duration_sec(&self.steps),
        }
    }

    pub fn drain_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.transitions)
    }

    pub fn load(&mut self, steps: Vec<Step>) {
        self.steps = steps;
        self.current_index = 0;
        self.elapsed_sec = 0.0;
        self.transitions.push(Transition::Loaded);
        self.set_status(SessionStatus::Idle);
        info!(step_count = self.steps.len(), "session loaded");
    }

    /// Rehydrates a session in the paused state. Invalid positions leave the
    /// sequencer untouched; callers validate beforehand.
    pub fn resume(&mut self, steps: Vec<Step>, step_index: usize, elapsed_sec: f64) {
        if steps.is_empty() || step_index >= steps.len() {
            warn!(
                step_count = steps.len(),
                step_index, "ignored resume with invalid position"
            );
            return;
        }
        if !elapsed_sec.is_finite() || elapsed_sec < 0.0 {
            warn!(elapsed_sec, "ignored resume with invalid elapsed time");
            return;
        }

        self.steps = steps;
        self.current_index = step_index;
        self.elapsed_sec = elapsed_sec;
        self.transitions.push(Transition::Loaded);
        self.set_status(SessionStatus::Paused);
        info!(step_index, elapsed_sec, "session resumed");
    }

    pub fn play(&mut self) {
        if self.status == SessionStatus::Completed {
            debug!("play ignored, session completed");
            return;
        }
        if self.steps.is_empty() {
            debug!("play ignored, no steps loaded");
            return;
        }
        self.set_status(SessionStatus::Playing);
    }

    pub fn pause(&mut self) {
        if self.steps.is_empty() || self.status == SessionStatus::Completed {
            return;
        }
        self.set_status(SessionStatus::Paused);
    }

    /// Advances elapsed time while playing. An overrun moves to the next step
    /// and the excess beyond the step duration is dropped.
    pub fn tick(&mut self, dt_sec: f64) {
        if self.status != SessionStatus::Playing {
            return;
        }
        if !dt_sec.is_finite() || dt_sec < 0.0 {
            warn!(dt_sec, "ignored invalid tick delta");
            return;
        }
        let Some(duration_sec) = self.current_step().map(|step| step.duration_sec) else {
            return;
        };

        let new_elapsed = self.elapsed_sec + dt_sec;
        if new_elapsed >= duration_sec {
            self.advance();
        } else {
            self.elapsed_sec = new_elapsed;
        }
    }

    pub fn next(&mut self) {
        if !self.is_navigable() {
            return;
        }
        self.advance();
    }

    pub fn prev(&mut self) {
        if !self.is_navigable() {
            return;
        }

        self.elapsed_sec = 0.0;
        if self.current_index > 0 {
            let from = self.current_index;
            self.current_index -= 1;
            self.transitions.push(Transition::StepChanged {
                from,
                to: self.current_index,
            });
            info!(from, to = self.current_index, "stepped back");
        } else {
            self.transitions.push(Transition::StepRestarted { index: 0 });
            debug!("restarted first step");
        }
    }

    /// Moves within the current step. Positions at or past the end behave
    /// like an overrun.
    pub fn seek(&mut self, position_sec: f64) {
        if !self.is_navigable() {
            return;
        }
        if !position_sec.is_finite() {
            warn!(position_sec, "ignored invalid seek position");
            return;
        }
        let Some(duration_sec) = self.current_step().map(|step| step.duration_sec) else {
            return;
        };

        if position_sec >= duration_sec {
            self.advance();
        } else {
            self.elapsed_sec = position_sec.max(0.0);
            debug!(elapsed_sec = self.elapsed_sec, "seeked within step");
        }
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
        self.elapsed_sec = 0.0;
        self.set_status(SessionStatus::Idle);
        info!("session reset");
    }

    fn advance(&mut self) {
        if self.current_index + 1 < self.steps.len() {
            let from = self.current_index;
            self.current_index += 1;
            self.elapsed_sec = 0.0;
            self.transitions.push(Transition::StepChanged {
                from,
                to: self.current_index,
            });
            info!(from, to = self.current_index, "advanced to next step");
        } else {
            self.set_status(SessionStatus::Completed);
            info!("session completed");
        }
    }

    fn is_navigable(&self) -> bool {
        !self.steps.is_empty()
            && !matches!(
                self.status,
                SessionStatus::Idle | SessionStatus::Completed
            )
    }

    fn set_status(&mut self, status: SessionStatus) {
        if self.status == status {
            return;
        }
        let from = self.status;
        self.status = status;
        self.transitions
            .push(Transition::StatusChanged { from, to: status });
        debug!(%from, to = %status, "status changed");
    }
}
