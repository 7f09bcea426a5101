use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    audio::{MediaPlayer, MediaSource, PlaybackError},
    catalog::{Catalog, resolve_flow},
    model::{
        ContentId, ContentRecord, DurationDefaults, Flow, FlowStep, MediaRefs, Side, Step,
    },
    wake_lock::{WakeLockError, WakeLockProvider},
};

pub const FIXTURE_CONTENT_ROOT: &str = "content";
pub const FIXTURE_FLOW_ID: &str = "quick-neck-relief";

fn gesture(
    id: &str,
    name: &str,
    default_sec: f64,
    intensity: u8,
    contraindications: &[&str],
) -> ContentRecord {
    ContentRecord {
        id: ContentId::new(id),
        name: name.to_string(),
        summary: format!("{name} guided gesture"),
        description: String::new(),
        tags: vec!["fixture".to_string()],
        body_areas: Vec::new(),
        duration_defaults: DurationDefaults {
            min_sec: 15.0,
            default_sec,
            max_sec: 180.0,
        },
        media: MediaRefs {
            audio: "audio.mp3".to_string(),
            video: None,
            poster: None,
            captions: None,
            transcript: None,
        },
        intensity,
        contraindications: contraindications
            .iter()
            .map(|item| (*item).to_string())
            .collect(),
        equipment: Vec::new(),
    }
}

#[must_use]
pub fn gesture_records() -> Vec<ContentRecord> {
    vec![
        gesture("upper-back-circles", "Upper Back Circles", 60.0, 2, &[]),
        gesture(
            "neck-glides",
            "Neck Glides",
            45.0,
            1,
            &["cervical injury", "recent neck surgery"],
        ),
        gesture("hand-massage", "Hand Massage", 60.0, 3, &[]),
    ]
}

#[must_use]
pub fn test_gestures() -> Vec<Arc<ContentRecord>> {
    gesture_records().into_iter().map(Arc::new).collect()
}

#[must_use]
pub fn test_flow() -> Flow {
    let step = |id: &str, duration_sec: f64, side: Option<Side>| FlowStep {
        gesture_id: ContentId::new(id),
        duration_sec,
        side,
        notes: None,
        title: None,
    };

    Flow {
        id: FIXTURE_FLOW_ID.to_string(),
        name: "Quick Neck Relief".to_string(),
        description: "Short release for the neck and upper back.".to_string(),
        tags: vec!["neck".to_string()],
        steps: vec![
            step("neck-glides", 45.0, Some(Side::Left)),
            step("neck-glides", 45.0, Some(Side::Right)),
            step("upper-back-circles", 60.0, None),
        ],
    }
}

#[must_use]
pub fn test_catalog() -> Catalog {
    Catalog::from_records(FIXTURE_CONTENT_ROOT, gesture_records(), [test_flow()])
}

/// Three distinct gestures at their default durations.
#[must_use]
pub fn test_steps() -> Vec<Step> {
    let gestures = test_gestures();
    vec![
        Step::with_default_duration(Arc::clone(&gestures[0])),
        Step::with_default_duration(Arc::clone(&gestures[1])).with_side(Side::Left),
        Step::with_default_duration(Arc::clone(&gestures[2])),
    ]
}

#[must_use]
pub fn test_flow_steps() -> Vec<Step> {
    resolve_flow(&test_flow(), &test_catalog()).expect("fixture flow should resolve")
}

/// One step per duration, cycling through the fixture gestures.
#[must_use]
pub fn steps_with_durations(durations: &[f64]) -> Vec<Step> {
    let gestures = test_gestures();
    durations
        .iter()
        .enumerate()
        .map(|(index, duration_sec)| {
            Step::new(Arc::clone(&gestures[index % gestures.len()]), *duration_sec)
        })
        .collect()
}

#[must_use]
pub fn steps_for_ids(catalog: &Catalog, ids: &[&str]) -> Vec<Step> {
    use crate::catalog::ContentLookup;

    ids.iter()
        .map(|id| {
            let content = catalog
                .lookup(&ContentId::new(*id))
                .expect("fixture gesture should exist");
            Step::with_default_duration(content)
        })
        .collect()
}

/// Backend-free player that accepts every call and remembers its position.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    fail: bool,
    loaded: bool,
    playing: bool,
    position_sec: f64,
}

impl ScriptedPlayer {
    /// Player whose loads and starts are always refused.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl MediaPlayer for ScriptedPlayer {
    fn load(&mut self, source: &MediaSource) -> Result<(), PlaybackError> {
        if self.fail {
            return Err(PlaybackError::Decode {
                path: source.path().to_path_buf(),
                reason: "scripted failure".to_string(),
            });
        }
        self.loaded = true;
        self.position_sec = 0.0;
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = false;
        self.playing = false;
        self.position_sec = 0.0;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.fail {
            return Err(PlaybackError::Refused("scripted autoplay block".to_string()));
        }
        if !self.loaded {
            return Err(PlaybackError::NotLoaded);
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn set_looping(&mut self, _looping: bool) {}

    fn seek(&mut self, position_sec: f64) -> Result<(), PlaybackError> {
        if !self.loaded {
            return Err(PlaybackError::NotLoaded);
        }
        self.position_sec = position_sec;
        Ok(())
    }

    fn position_sec(&self) -> f64 {
        self.position_sec
    }
}

#[derive(Debug, Default)]
struct FakeWakeLockState {
    held: bool,
    acquisitions: u32,
    releases: u32,
}

/// Wake-lock provider recording calls; clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeWakeLock {
    state: Arc<Mutex<FakeWakeLockState>>,
    deny: bool,
}

impl FakeWakeLock {
    #[must_use]
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.state.lock().held
    }

    #[must_use]
    pub fn acquisitions(&self) -> u32 {
        self.state.lock().acquisitions
    }

    #[must_use]
    pub fn releases(&self) -> u32 {
        self.state.lock().releases
    }

    /// Drops the lock without a `release` call, as a platform would.
    pub fn revoke(&self) {
        self.state.lock().held = false;
    }
}

impl WakeLockProvider for FakeWakeLock {
    fn is_supported(&self) -> bool {
        true
    }

    fn acquire(&mut self) -> Result<(), WakeLockError> {
        if self.deny {
            return Err(WakeLockError::Denied("permission denied".to_string()));
        }
        let mut state = self.state.lock();
        state.held = true;
        state.acquisitions += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        let mut state = self.state.lock();
        state.held = false;
        state.releases += 1;
        Ok(())
    }

    fn still_held(&mut self) -> bool {
        self.state.lock().held
    }
}
