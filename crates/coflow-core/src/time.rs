use std::time::Duration;

const TIMER_EPSILON_SEC: f64 = 1e-9;

/// Repeating timer advanced by frame deltas instead of a wall clock.
///
/// Owned by whichever component scheduled it; `cancel` is synchronous and
/// permanent, later `advance` calls report no fires.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTimer {
    period_sec: f64,
    accumulated_sec: f64,
    cancelled: bool,
}

impl IntervalTimer {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period_sec: period.as_secs_f64().max(TIMER_EPSILON_SEC),
            accumulated_sec: 0.0,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn period_sec(&self) -> f64 {
        self.period_sec
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn advance(&mut self, dt_sec: f64) -> u32 {
        if self.cancelled || !dt_sec.is_finite() || dt_sec <= 0.0 {
            return 0;
        }

        self.accumulated_sec += dt_sec;
        let mut fires = 0_u32;
        while self.accumulated_sec + TIMER_EPSILON_SEC >= self.period_sec {
            self.accumulated_sec -= self.period_sec;
            fires = fires.saturating_add(1);
        }
        self.accumulated_sec = self.accumulated_sec.max(0.0);
        fires
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.accumulated_sec = 0.0;
    }
}

#[must_use]
pub fn remaining_seconds(duration_sec: f64, elapsed_sec: f64) -> u64 {
    let remaining = (duration_sec - elapsed_sec).max(0.0).ceil();
    if remaining.is_finite() {
        remaining as u64
    } else {
        0
    }
}

#[must_use]
pub fn seconds_to_frames(seconds: f64, sample_rate: u32) -> usize {
    if seconds <= 0.0 || !seconds.is_finite() || sample_rate == 0 {
        return 0;
    }

    (seconds * f64::from(sample_rate)).round() as usize
}

#[must_use]
pub fn frames_to_seconds(frames: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }

    frames as f64 / f64::from(sample_rate)
}

/// `m:ss` clock label used by the console host.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
