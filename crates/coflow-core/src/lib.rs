pub mod audio;
pub mod catalog;
pub mod cues;
pub mod diagnostics;
pub mod engine;
pub mod fixtures;
pub mod model;
pub mod persistence;
pub mod render;
pub mod sequencer;
pub mod snapshot;
pub mod time;
pub mod wake_lock;

pub use audio::{
    AudioCache, BufferSlot, CrossfadeEngine, CrossfadeSettings, DecodedAudio, DecodedPlayer,
    MediaPlayer, MediaSource, PlaybackError, SlotId,
};
pub use catalog::{
    Catalog, CatalogError, ContentLookup, ValidationReport, check_steps, resolve_flow,
    safety_considerations, steps_for_content, validate_catalog, validate_flow,
};
pub use cues::{CueEvent, CueType, FiredCues, cues_to_fire};
pub use diagnostics::{TelemetryGuard, init_tracing, init_tracing_with_options};
pub use engine::{Engine, EngineError, EngineSettings, FrameOutcome};
pub use model::{
    ContentId, ContentRecord, DurationDefaults, Flow, FlowStep, MediaRefs, SessionStatus, Side,
    Step,
};
pub use render::{RenderOptions, RenderReport, render_session_samples, render_session_to_wav};
pub use sequencer::{Sequencer, SessionView, Transition};
pub use snapshot::{
    FileSnapshotStorage, MemorySnapshotStorage, SessionSnapshot, SnapshotError, SnapshotLoop,
    SnapshotSettings, SnapshotStorage, SnapshotStore, restore_from_snapshot,
};
pub use time::IntervalTimer;
pub use wake_lock::{NoopWakeLock, WakeLockError, WakeLockGuard, WakeLockProvider};
