use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::model::Side;

pub const START_THRESHOLD_SEC: f64 = 0.1;
pub const WARNING_LEAD_SEC: f64 = 10.0;
pub const WARNING_MIN_DURATION_SEC: f64 = 15.0;
pub const END_LEAD_SEC: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CueType {
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "halfway")]
    Halfway,
    #[serde(rename = "10s-left")]
    Warning,
    #[serde(rename = "switch-side")]
    SwitchSide,
    #[serde(rename = "end")]
    End,
}

impl CueType {
    pub const ALL: [Self; 5] = [
        Self::Start,
        Self::Halfway,
        Self::Warning,
        Self::SwitchSide,
        Self::End,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Halfway => "halfway",
            Self::Warning => "10s-left",
            Self::SwitchSide => "switch-side",
            Self::End => "end",
        }
    }

    fn is_due(self, elapsed_sec: f64, duration_sec: f64, side: Option<Side>) -> bool {
        match self {
            Self::Start => elapsed_sec >= START_THRESHOLD_SEC,
            Self::Halfway => elapsed_sec >= duration_sec / 2.0,
            Self::Warning => {
                duration_sec > WARNING_MIN_DURATION_SEC
                    && elapsed_sec >= duration_sec - WARNING_LEAD_SEC
            }
            Self::SwitchSide => {
                side.is_some_and(Side::is_sided) && elapsed_sec >= duration_sec / 2.0
            }
            Self::End => elapsed_sec >= duration_sec - END_LEAD_SEC,
        }
    }
}

impl fmt::Display for CueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueEvent {
    pub cue: CueType,
    pub step_index: usize,
}

/// Cues already fired for the current step, keyed by `(step_index, cue)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiredCues {
    keys: HashSet<(usize, CueType)>,
}

impl FiredCues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, step_index: usize, cue: CueType) -> bool {
        self.keys.contains(&(step_index, cue))
    }

    /// Returns `true` when the key was not present yet.
    pub fn insert(&mut self, step_index: usize, cue: CueType) -> bool {
        self.keys.insert((step_index, cue))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Returns the cues that became due and were not fired yet for this step,
/// recording each one in `fired`. Several cues may fire from one call.
pub fn cues_to_fire(
    step_index: usize,
    elapsed_sec: f64,
    duration_sec: f64,
    side: Option<Side>,
    fired: &mut FiredCues,
) -> Vec<CueType> {
    CueType::ALL
        .into_iter()
        .filter(|cue| cue.is_due(elapsed_sec, duration_sec, side))
        .filter(|cue| fired.insert(step_index, *cue))
        .collect()
}
