use std::{fs, path::Path, sync::Arc};

use chrono::{TimeDelta, Utc};
use coflow_core::{
    ContentId, Engine, EngineError, EngineSettings, FileSnapshotStorage, SessionSnapshot,
    SessionStatus, SnapshotError,
    fixtures::{ScriptedPlayer, test_catalog, test_flow},
};
use serde_json::json;
use tempfile::tempdir;

fn engine_at(path: &Path) -> Engine {
    Engine::new(Arc::new(test_catalog()), EngineSettings::default())
        .with_players(
            Box::new(ScriptedPlayer::default()),
            Box::new(ScriptedPlayer::default()),
        )
        .with_snapshot_storage(Box::new(FileSnapshotStorage::new(path)))
}

fn write_record(path: &Path, content_refs: &[&str], durations: &[f64], age: TimeDelta) {
    let record = json!({
        "sessionLabel": "Neck Glides",
        "contentRefs": content_refs,
        "durations": durations,
        "stepIndex": 1,
        "elapsedSec": 20.0,
        "lastUpdated": (Utc::now() - age).timestamp_millis(),
    });
    fs::write(
        path,
        serde_json::to_vec(&record).expect("record should serialize"),
    )
    .expect("record should be written");
}

#[test]
fn session_survives_engine_restart() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("data").join("session-resume.json");

    let mut first = engine_at(&path);
    first
        .load_flow(&test_flow())
        .expect("fixture flow should load");
    first.play();
    first.frame(10.0);
    first.shutdown();
    drop(first);
    assert!(path.exists());

    let mut second = engine_at(&path);
    let snapshot = second
        .pending_snapshot()
        .expect("saved session should be resumable");
    assert_eq!(snapshot.session_label, "Neck Glides");
    assert_eq!(snapshot.step_index, 0);
    assert_eq!(snapshot.elapsed_sec, 10.0);
    assert_eq!(snapshot.durations, vec![45.0, 45.0, 60.0]);

    second
        .resume_from_snapshot(&snapshot)
        .expect("snapshot should restore");
    assert_eq!(second.status(), SessionStatus::Paused);
    assert_eq!(second.view().elapsed_sec, 10.0);
    assert_eq!(second.steps().len(), 3);
}

#[test]
fn resumed_session_seeks_audio_on_play() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("session-resume.json");
    write_record(
        &path,
        &["neck-glides", "upper-back-circles"],
        &[45.0, 60.0],
        TimeDelta::minutes(5),
    );

    let mut engine = engine_at(&path);
    let snapshot = engine
        .pending_snapshot()
        .expect("fresh record should be resumable");
    assert_eq!(snapshot.age_label(Utc::now()), "5m ago");

    engine
        .resume_from_snapshot(&snapshot)
        .expect("snapshot should restore");
    assert!(!engine.audio().active_slot().is_playing());

    engine.play();
    let view = engine.view();
    assert_eq!(view.status, SessionStatus::Playing);
    assert_eq!(view.current_index, 1);
    assert_eq!(view.elapsed_sec, 20.0);
    assert_eq!(engine.audio().active_slot().position_sec(), 20.0);
    assert_eq!(
        engine.current_step().map(|step| step.content_ref().as_str()),
        Some("upper-back-circles")
    );
}

#[test]
fn expired_record_is_removed() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("session-resume.json");
    write_record(
        &path,
        &["neck-glides", "upper-back-circles"],
        &[45.0, 60.0],
        TimeDelta::hours(25),
    );

    let engine = engine_at(&path);
    assert!(engine.pending_snapshot().is_none());
    assert!(!path.exists());
}

#[test]
fn record_with_unknown_content_is_removed() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("session-resume.json");
    write_record(
        &path,
        &["neck-glides", "retired-gesture"],
        &[45.0, 60.0],
        TimeDelta::minutes(1),
    );

    let engine = engine_at(&path);
    assert!(engine.pending_snapshot().is_none());
    assert!(!path.exists());
}

#[test]
fn garbage_record_is_removed() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("session-resume.json");
    fs::write(&path, b"{\"sessionLabel\": 4").expect("record should be written");

    let engine = engine_at(&path);
    assert!(engine.pending_snapshot().is_none());
    assert!(!path.exists());
}

#[test]
fn failed_restore_keeps_current_session() {
    let dir = tempdir().expect("tempdir should be created");
    let mut engine = engine_at(&dir.path().join("session-resume.json"));
    engine
        .load_flow(&test_flow())
        .expect("fixture flow should load");
    engine.play();
    engine.frame(4.0);

    let snapshot = SessionSnapshot {
        session_label: "Gone".to_string(),
        content_refs: vec![ContentId::new("neck-glides"), ContentId::new("missing")],
        durations: vec![45.0, 30.0],
        step_index: 1,
        elapsed_sec: 3.0,
        last_updated: Utc::now(),
    };
    let result = engine.resume_from_snapshot(&snapshot);

    assert!(matches!(
        result,
        Err(EngineError::Snapshot(SnapshotError::UnknownContent(ref id))) if id.as_str() == "missing"
    ));
    assert_eq!(engine.status(), SessionStatus::Playing);
    assert_eq!(engine.view().current_index, 0);
    assert_eq!(engine.view().elapsed_sec, 4.0);
    assert!(engine.audio().active_slot().is_playing());
}

#[test]
fn discard_removes_record_and_idle_sessions_are_not_saved() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("session-resume.json");
    write_record(
        &path,
        &["neck-glides", "upper-back-circles"],
        &[45.0, 60.0],
        TimeDelta::minutes(1),
    );

    let mut engine = engine_at(&path);
    engine.discard_snapshot();
    assert!(!path.exists());

    engine
        .load_flow(&test_flow())
        .expect("fixture flow should load");
    assert!(!engine.save_snapshot());
    assert!(!path.exists());
}

#[test]
fn finishing_a_resumed_session_removes_the_record() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("session-resume.json");
    write_record(
        &path,
        &["neck-glides", "upper-back-circles"],
        &[45.0, 60.0],
        TimeDelta::minutes(2),
    );

    let mut engine = engine_at(&path);
    let snapshot = engine
        .pending_snapshot()
        .expect("fresh record should be resumable");
    engine
        .resume_from_snapshot(&snapshot)
        .expect("snapshot should restore");
    assert!(!engine.is_snapshot_loop_running());

    engine.next();
    assert_eq!(engine.status(), SessionStatus::Completed);
    assert!(!path.exists());
    assert!(engine.pending_snapshot().is_none());
}
