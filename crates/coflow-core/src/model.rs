use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    None,
}

impl Side {
    #[must_use]
    pub fn is_sided(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Playing,
    Paused,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationDefaults {
    pub min_sec: f64,
    pub default_sec: f64,
    pub max_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRefs {
    pub audio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: ContentId,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub body_areas: Vec<String>,
    pub duration_defaults: DurationDefaults,
    pub media: MediaRefs,
    pub intensity: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contraindications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
}

/// Immutable once loaded; the sequencer swaps the whole list on `load`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub content: Arc<ContentRecord>,
    pub duration_sec: f64,
    pub side: Option<Side>,
    pub notes: Option<String>,
    pub title: Option<String>,
}

impl Step {
    #[must_use]
    pub fn new(content: Arc<ContentRecord>, duration_sec: f64) -> Self {
        Self {
            content,
            duration_sec,
            side: None,
            notes: None,
            title: None,
        }
    }

    #[must_use]
    pub fn with_default_duration(content: Arc<ContentRecord>) -> Self {
        let duration_sec = content.duration_defaults.default_sec;
        Self::new(content, duration_sec)
    }

    #[must_use]
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content_ref(&self) -> &ContentId {
        &self.content.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.content.name)
    }

    #[must_use]
    pub fn is_sided(&self) -> bool {
        self.side.is_some_and(Side::is_sided)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    pub gesture_id: ContentId,
    pub duration_sec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub steps: Vec<FlowStep>,
}

impl Flow {
    #[must_use]
    pub fn total_duration_sec(&self) -> f64 {
        self.steps.iter().map(|step| step.duration_sec).sum()
    }
}

#[must_use]
pub fn total_duration_sec(steps: &[Step]) -> f64 {
    steps.iter().map(|step| step.duration_sec).sum()
}

#[must_use]
pub fn is_valid_duration(duration_sec: f64) -> bool {
    duration_sec.is_finite() && duration_sec > 0.0
}
