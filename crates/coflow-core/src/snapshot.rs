use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    catalog::ContentLookup,
    model::{ContentId, SessionStatus, Step},
    persistence,
    sequencer::Sequencer,
    time::IntervalTimer,
};

pub const DEFAULT_SAVE_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_MAX_AGE_HOURS: i64 = 24;
pub const DEFAULT_MAX_SNAPSHOT_BYTES: usize = 64 * 1024;
const FALLBACK_SESSION_LABEL: &str = "Session";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("snapshot storage unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot record is not valid json: {0}")]
    Parse(String),
    #[error("snapshot record is malformed: {0}")]
    Malformed(String),
    #[error("snapshot saved at {saved_at} is older than {max_age_hours}h")]
    Expired {
        saved_at: DateTime<Utc>,
        max_age_hours: i64,
    },
    #[error("snapshot record is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("snapshot references unknown content: {0}")]
    UnknownContent(ContentId),
}

/// Unknown fields are rejected so an incompatible record reads as malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionSnapshot {
    pub session_label: String,
    pub content_refs: Vec<ContentId>,
    pub durations: Vec<f64>,
    pub step_index: usize,
    pub elapsed_sec: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(sequencer: &Sequencer, now: DateTime<Utc>) -> Option<Self> {
        let status = sequencer.status();
        let steps = sequencer.steps();
        if !matches!(status, SessionStatus::Playing | SessionStatus::Paused) || steps.is_empty() {
            return None;
        }

        Some(Self {
            session_label: steps
                .first()
                .map_or(FALLBACK_SESSION_LABEL, Step::display_name)
                .to_string(),
            content_refs: steps.iter().map(|step| step.content_ref().clone()).collect(),
            durations: steps.iter().map(|step| step.duration_sec).collect(),
            step_index: sequencer.current_index(),
            elapsed_sec: sequencer.elapsed_sec(),
            last_updated: now,
        })
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.content_refs.is_empty() {
            return Err(SnapshotError::Malformed("no steps".to_string()));
        }
        if self.content_refs.len() != self.durations.len() {
            return Err(SnapshotError::Malformed(format!(
                "{} content refs but {} durations",
                self.content_refs.len(),
                self.durations.len()
            )));
        }
        if self
            .durations
            .iter()
            .any(|duration| !duration.is_finite() || *duration <= 0.0)
        {
            return Err(SnapshotError::Malformed(
                "durations must be positive".to_string(),
            ));
        }
        if self.step_index >= self.content_refs.len() {
            return Err(SnapshotError::Malformed(format!(
                "step index {} out of range",
                self.step_index
            )));
        }
        if !self.elapsed_sec.is_finite() || self.elapsed_sec < 0.0 {
            return Err(SnapshotError::Malformed(
                "elapsed time must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: TimeDelta) -> bool {
        now.signed_duration_since(self.last_updated) > max_age
    }

    /// Coarse age for resume prompts: `just now`, `12m ago`, `3h ago`.
    #[must_use]
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let minutes = now.signed_duration_since(self.last_updated).num_minutes();
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{minutes}m ago")
        } else {
            format!("{}h ago", minutes / 60)
        }
    }
}

pub trait SnapshotStorage: Send + Sync {
    fn read(&self) -> Result<Option<Vec<u8>>, SnapshotError>;

    fn write(&self, bytes: &[u8]) -> Result<(), SnapshotError>;

    fn clear(&self) -> Result<(), SnapshotError>;
}

#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    path: PathBuf,
}

impl FileSnapshotStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStorage for FileSnapshotStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, SnapshotError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SnapshotError::Unavailable(error.to_string())),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<(), SnapshotError> {
        persistence::write_atomic(&self.path, bytes)
            .map_err(|error| SnapshotError::Unavailable(format!("{error:#}")))
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SnapshotError::Unavailable(error.to_string())),
        }
    }
}

/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStorage {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
    unavailable: bool,
}

impl MemorySnapshotStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            slot: Arc::default(),
            unavailable: true,
        }
    }

    #[must_use]
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.slot.lock().clone()
    }

    pub fn put_raw(&self, bytes: impl Into<Vec<u8>>) {
        *self.slot.lock() = Some(bytes.into());
    }

    fn check(&self) -> Result<(), SnapshotError> {
        if self.unavailable {
            Err(SnapshotError::Unavailable("storage disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SnapshotStorage for MemorySnapshotStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, SnapshotError> {
        self.check()?;
        Ok(self.slot.lock().clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), SnapshotError> {
        self.check()?;
        *self.slot.lock() = Some(bytes.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        self.check()?;
        *self.slot.lock() = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    pub save_interval_ms: u64,
    pub max_age_hours: i64,
    pub max_bytes: usize,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            save_interval_ms: DEFAULT_SAVE_INTERVAL_MS,
            max_age_hours: DEFAULT_MAX_AGE_HOURS,
            max_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
        }
    }
}

impl SnapshotSettings {
    #[must_use]
    pub fn max_age(&self) -> TimeDelta {
        TimeDelta::try_hours(self.max_age_hours).unwrap_or(TimeDelta::MAX)
    }

    #[must_use]
    pub fn save_interval(&self) -> Duration {
        Duration::from_millis(self.save_interval_ms)
    }
}

pub struct SnapshotStore {
    storage: Box<dyn SnapshotStorage>,
    settings: SnapshotSettings,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(storage: Box<dyn SnapshotStorage>, settings: SnapshotSettings) -> Self {
        Self { storage, settings }
    }

    #[must_use]
    pub fn settings(&self) -> SnapshotSettings {
        self.settings
    }

    pub fn save_snapshot(&self, sequencer: &Sequencer) -> bool {
        self.save_snapshot_at(sequencer, Utc::now())
    }

    pub fn save_snapshot_at(&self, sequencer: &Sequencer, now: DateTime<Utc>) -> bool {
        let Some(snapshot) = SessionSnapshot::capture(sequencer, now) else {
            return false;
        };

        let bytes = match serde_json::to_vec(&snapshot) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(?error, "failed to encode session snapshot");
                return false;
            }
        };
        if bytes.len() > self.settings.max_bytes {
            warn!(
                size = bytes.len(),
                limit = self.settings.max_bytes,
                "session snapshot over size limit, not saved"
            );
            return false;
        }

        match self.storage.write(&bytes) {
            Ok(()) => {
                debug!(
                    step_index = snapshot.step_index,
                    elapsed_sec = snapshot.elapsed_sec,
                    "session snapshot saved"
                );
                true
            }
            Err(error) => {
                debug!(%error, "session snapshot save skipped");
                false
            }
        }
    }

    #[must_use]
    pub fn get_snapshot(&self, lookup: &dyn ContentLookup) -> Option<SessionSnapshot> {
        self.get_snapshot_at(lookup, Utc::now())
    }

    /// Anything `decode` rejects is cleared and reported as absent.
    #[instrument(skip(self, lookup))]
    pub fn get_snapshot_at(
        &self,
        lookup: &dyn ContentLookup,
        now: DateTime<Utc>,
    ) -> Option<SessionSnapshot> {
        let bytes = match self.storage.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(error) => {
                debug!(%error, "session snapshot unreadable");
                return None;
            }
        };

        match self.decode(&bytes, lookup, now) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                info!(%error, "discarding session snapshot");
                self.clear_snapshot();
                None
            }
        }
    }

    pub fn clear_snapshot(&self) {
        if let Err(error) = self.storage.clear() {
            debug!(%error, "session snapshot clear skipped");
        }
    }

    #[must_use]
    pub fn start_loop(&self) -> SnapshotLoop {
        SnapshotLoop::start(self.settings.save_interval())
    }

    pub fn decode(
        &self,
        bytes: &[u8],
        lookup: &dyn ContentLookup,
        now: DateTime<Utc>,
    ) -> Result<SessionSnapshot, SnapshotError> {
        if bytes.len() > self.settings.max_bytes {
            return Err(SnapshotError::TooLarge {
                size: bytes.len(),
                limit: self.settings.max_bytes,
            });
        }

        let snapshot: SessionSnapshot = serde_json::from_slice(bytes)
            .map_err(|error| SnapshotError::Parse(error.to_string()))?;
        snapshot.validate()?;
        if snapshot.is_expired(now, self.settings.max_age()) {
            return Err(SnapshotError::Expired {
                saved_at: snapshot.last_updated,
                max_age_hours: self.settings.max_age_hours,
            });
        }
        if let Some(missing) = snapshot
            .content_refs
            .iter()
            .find(|id| lookup.lookup(id).is_none())
        {
            return Err(SnapshotError::UnknownContent(missing.clone()));
        }
        Ok(snapshot)
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Rebuilds the session from `snapshot` and resumes it paused. Nothing is
/// changed unless every content reference resolves.
#[instrument(skip_all, fields(step_index = snapshot.step_index))]
pub fn restore_from_snapshot(
    snapshot: &SessionSnapshot,
    lookup: &dyn ContentLookup,
    sequencer: &mut Sequencer,
) -> Result<(), SnapshotError> {
    snapshot.validate()?;

    let steps = snapshot
        .content_refs
        .iter()
        .zip(&snapshot.durations)
        .map(|(id, duration_sec)| {
            lookup
                .lookup(id)
                .map(|content| Step::new(content, *duration_sec))
                .ok_or_else(|| SnapshotError::UnknownContent(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    sequencer.resume(steps, snapshot.step_index, snapshot.elapsed_sec);
    info!(label = %snapshot.session_label, "session restored from snapshot");
    Ok(())
}

#[derive(Debug)]
pub struct SnapshotLoop {
    timer: IntervalTimer,
}

impl SnapshotLoop {
    #[must_use]
    pub fn start(interval: Duration) -> Self {
        debug!(interval_ms = interval.as_millis(), "snapshot loop started");
        Self {
            timer: IntervalTimer::new(interval),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.timer.is_cancelled()
    }

    pub fn advance(&mut self, dt_sec: f64, store: &SnapshotStore, sequencer: &Sequencer) -> bool {
        if self.timer.advance(dt_sec) == 0 {
            return false;
        }
        store.save_snapshot(sequencer)
    }

    pub fn stop(&mut self) {
        if self.is_running() {
            self.timer.cancel();
            debug!("snapshot loop stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{steps_for_ids, test_catalog};

    fn store_with(storage: &MemorySnapshotStorage) -> SnapshotStore {
        SnapshotStore::new(Box::new(storage.clone()), SnapshotSettings::default())
    }

    fn snapshot(ids: &[&str], durations: &[f64], step_index: usize, elapsed_sec: f64) -> SessionSnapshot {
        SessionSnapshot {
            session_label: "Test".to_string(),
            content_refs: ids.iter().copied().map(ContentId::from).collect(),
            durations: durations.to_vec(),
            step_index,
            elapsed_sec,
            last_updated: Utc::now(),
        }
    }

    fn sequencer_in(status: SessionStatus) -> Sequencer {
        let catalog = test_catalog();
        let mut sequencer = Sequencer::new();
        sequencer.load(steps_for_ids(&catalog, &["upper-back-circles", "neck-glides"]));
        match status {
            SessionStatus::Playing => sequencer.play(),
            SessionStatus::Paused => sequencer.pause(),
            SessionStatus::Completed => {
                sequencer.play();
                sequencer.next();
                sequencer.next();
            }
            SessionStatus::Idle => {}
        }
        sequencer
    }

    #[test]
    fn save_writes_record_while_playing() {
        let storage = MemorySnapshotStorage::new();
        let store = store_with(&storage);
        let mut sequencer = sequencer_in(SessionStatus::Playing);
        sequencer.next();
        sequencer.tick(10.0);

        assert!(store.save_snapshot(&sequencer));
        let raw = storage.raw().expect("record should be written");
        let saved: SessionSnapshot = serde_json::from_slice(&raw).expect("record should parse");
        assert_eq!(
            saved.content_refs,
            vec![ContentId::from("upper-back-circles"), ContentId::from("neck-glides")]
        );
        assert_eq!(saved.step_index, 1);
        assert_eq!(saved.elapsed_sec, 10.0);
        assert_eq!(saved.session_label, "Upper Back Circles");
    }

    #[test]
    fn save_writes_record_while_paused() {
        let storage = MemorySnapshotStorage::new();
        assert!(store_with(&storage).save_snapshot(&sequencer_in(SessionStatus::Paused)));
        assert!(storage.raw().is_some());
    }

    #[test]
    fn save_is_noop_when_idle_completed_or_empty() {
        let storage = MemorySnapshotStorage::new();
        let store = store_with(&storage);
        assert!(!store.save_snapshot(&sequencer_in(SessionStatus::Idle)));
        assert!(!store.save_snapshot(&sequencer_in(SessionStatus::Completed)));
        assert!(!store.save_snapshot(&Sequencer::new()));
        assert!(storage.raw().is_none());
    }

    #[test]
    fn save_swallows_unavailable_storage() {
        let store = SnapshotStore::new(
            Box::new(MemorySnapshotStorage::unavailable()),
            SnapshotSettings::default(),
        );
        assert!(!store.save_snapshot(&sequencer_in(SessionStatus::Playing)));
    }

    #[test]
    fn save_respects_size_limit() {
        let storage = MemorySnapshotStorage::new();
        let store = SnapshotStore::new(
            Box::new(storage.clone()),
            SnapshotSettings {
                max_bytes: 16,
                ..SnapshotSettings::default()
            },
        );
        assert!(!store.save_snapshot(&sequencer_in(SessionStatus::Playing)));
        assert!(storage.raw().is_none());
    }

    #[test]
    fn get_returns_valid_record() {
        let storage = MemorySnapshotStorage::new();
        let expected = snapshot(&["upper-back-circles", "neck-glides"], &[60.0, 45.0], 0, 5.0);
        storage.put_raw(serde_json::to_vec(&expected).expect("snapshot should encode"));

        let found = store_with(&storage).get_snapshot(&test_catalog());
        assert_eq!(found, Some(expected));
    }

    #[test]
    fn stale_record_is_cleared() {
        let storage = MemorySnapshotStorage::new();
        let mut stale = snapshot(&["upper-back-circles"], &[60.0], 0, 0.0);
        stale.last_updated = Utc::now() - TimeDelta::hours(25);
        storage.put_raw(serde_json::to_vec(&stale).expect("snapshot should encode"));

        assert!(store_with(&storage).get_snapshot(&test_catalog()).is_none());
        assert!(storage.raw().is_none());
    }

    #[test]
    fn unknown_content_record_is_cleared() {
        let storage = MemorySnapshotStorage::new();
        let orphan = snapshot(&["nonexistent-gesture"], &[60.0], 0, 0.0);
        storage.put_raw(serde_json::to_vec(&orphan).expect("snapshot should encode"));

        assert!(store_with(&storage).get_snapshot(&test_catalog()).is_none());
        assert!(storage.raw().is_none());
    }

    #[test]
    fn garbage_and_unknown_fields_read_as_absent() {
        let storage = MemorySnapshotStorage::new();
        let store = store_with(&storage);

        storage.put_raw("not json");
        assert!(store.get_snapshot(&test_catalog()).is_none());
        assert!(storage.raw().is_none());

        let mut value = serde_json::to_value(snapshot(&["neck-glides"], &[45.0], 0, 0.0))
            .expect("snapshot should encode");
        value["future"] = serde_json::json!(true);
        storage.put_raw(serde_json::to_vec(&value).expect("value should encode"));
        assert!(store.get_snapshot(&test_catalog()).is_none());

        let mut value = serde_json::to_value(snapshot(&["neck-glides"], &[45.0], 0, 0.0))
            .expect("snapshot should encode");
        value
            .as_object_mut()
            .expect("snapshot should be an object")
            .remove("durations");
        storage.put_raw(serde_json::to_vec(&value).expect("value should encode"));
        assert!(store.get_snapshot(&test_catalog()).is_none());
    }

    #[test]
    fn decode_reports_each_rejection() {
        let store = store_with(&MemorySnapshotStorage::new());
        let catalog = test_catalog();
        let now = Utc::now();
        let encode =
            |record: &SessionSnapshot| serde_json::to_vec(record).expect("snapshot should encode");

        assert!(matches!(
            store.decode(b"{ nope", &catalog, now),
            Err(SnapshotError::Parse(_))
        ));

        let empty = snapshot(&[], &[], 0, 0.0);
        assert!(matches!(
            store.decode(&encode(&empty), &catalog, now),
            Err(SnapshotError::Malformed(_))
        ));

        let mut stale = snapshot(&["neck-glides"], &[45.0], 0, 0.0);
        stale.last_updated = now - TimeDelta::hours(25);
        assert!(matches!(
            store.decode(&encode(&stale), &catalog, now),
            Err(SnapshotError::Expired {
                max_age_hours: DEFAULT_MAX_AGE_HOURS,
                ..
            })
        ));

        let orphan = snapshot(&["neck-glides", "retired"], &[45.0, 30.0], 0, 0.0);
        assert_eq!(
            store.decode(&encode(&orphan), &catalog, now),
            Err(SnapshotError::UnknownContent(ContentId::from("retired")))
        );

        let oversized = vec![b' '; DEFAULT_MAX_SNAPSHOT_BYTES + 1];
        assert_eq!(
            store.decode(&oversized, &catalog, now),
            Err(SnapshotError::TooLarge {
                size: DEFAULT_MAX_SNAPSHOT_BYTES + 1,
                limit: DEFAULT_MAX_SNAPSHOT_BYTES,
            })
        );
    }

    #[test]
    fn age_label_buckets_minutes_and_hours() {
        let record = snapshot(&["neck-glides"], &[45.0], 0, 0.0);
        let at = |minutes| record.last_updated + TimeDelta::minutes(minutes);
        assert_eq!(record.age_label(at(0)), "just now");
        assert_eq!(record.age_label(at(12)), "12m ago");
        assert_eq!(record.age_label(at(185)), "3h ago");
    }

    #[test]
    fn missing_record_reads_as_absent() {
        let storage = MemorySnapshotStorage::new();
        assert!(store_with(&storage).get_snapshot(&test_catalog()).is_none());
    }

    #[test]
    fn restore_resumes_paused_at_position() {
        let mut sequencer = Sequencer::new();
        let record = snapshot(&["upper-back-circles", "neck-glides"], &[60.0, 45.0], 1, 20.0);

        restore_from_snapshot(&record, &test_catalog(), &mut sequencer)
            .expect("restore should succeed");
        assert_eq!(sequencer.status(), SessionStatus::Paused);
        assert_eq!(sequencer.current_index(), 1);
        assert_eq!(sequencer.elapsed_sec(), 20.0);
        assert_eq!(sequencer.steps().len(), 2);
        assert_eq!(sequencer.steps()[0].content_ref().as_str(), "upper-back-circles");
        assert_eq!(sequencer.steps()[1].duration_sec, 45.0);
    }

    #[test]
    fn restore_with_unknown_content_leaves_state_untouched() {
        let mut sequencer = sequencer_in(SessionStatus::Playing);
        sequencer.tick(3.0);
        let record = snapshot(&["upper-back-circles", "nonexistent"], &[60.0, 45.0], 0, 0.0);

        let result = restore_from_snapshot(&record, &test_catalog(), &mut sequencer);
        assert_eq!(
            result,
            Err(SnapshotError::UnknownContent(ContentId::from("nonexistent")))
        );
        assert_eq!(sequencer.status(), SessionStatus::Playing);
        assert_eq!(sequencer.elapsed_sec(), 3.0);
    }

    #[test]
    fn loop_saves_on_interval() {
        let storage = MemorySnapshotStorage::new();
        let store = store_with(&storage);
        let sequencer = sequencer_in(SessionStatus::Playing);
        let mut snapshot_loop = store.start_loop();

        assert!(!snapshot_loop.advance(2.9, &store, &sequencer));
        assert!(storage.raw().is_none());
        assert!(snapshot_loop.advance(0.1, &store, &sequencer));
        assert!(storage.raw().is_some());
    }

    #[test]
    fn stopped_loop_does_not_save() {
        let storage = MemorySnapshotStorage::new();
        let store = store_with(&storage);
        let sequencer = sequencer_in(SessionStatus::Playing);
        let mut snapshot_loop = store.start_loop();
        snapshot_loop.stop();

        assert!(!snapshot_loop.is_running());
        assert!(!snapshot_loop.advance(10.0, &store, &sequencer));
        assert!(storage.raw().is_none());
    }

    #[test]
    fn file_storage_round_trips_and_clears() {
        let temp = tempfile::tempdir().expect("tempdir should be creatable");
        let storage = FileSnapshotStorage::new(temp.path().join("data/session-resume.json"));
        assert_eq!(storage.read(), Ok(None));

        storage.write(b"{}").expect("write should succeed");
        assert_eq!(storage.read(), Ok(Some(b"{}".to_vec())));

        storage.clear().expect("clear should succeed");
        storage.clear().expect("clearing twice should succeed");
        assert_eq!(storage.read(), Ok(None));
    }
}
