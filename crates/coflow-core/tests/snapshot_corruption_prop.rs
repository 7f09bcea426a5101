use coflow_core::{
    MemorySnapshotStorage, Sequencer, SessionSnapshot, SnapshotSettings, SnapshotStore,
    fixtures::{test_catalog, test_flow_steps},
};
use proptest::prelude::*;

fn saved_payload() -> Vec<u8> {
    let storage = MemorySnapshotStorage::new();
    let store = SnapshotStore::new(Box::new(storage.clone()), SnapshotSettings::default());

    let mut sequencer = Sequencer::new();
    sequencer.load(test_flow_steps());
    sequencer.play();
    sequencer.tick(50.0);
    sequencer.tick(12.5);
    assert!(store.save_snapshot(&sequencer));

    storage.raw().expect("saved snapshot should be present")
}

/// Reads `payload` back through the store. Returns `None` on panic, otherwise
/// whether the outcome was consistent: a returned record validates, a
/// rejected one is cleared.
fn read_back(payload: Vec<u8>) -> Option<bool> {
    std::panic::catch_unwind(move || {
        let storage = MemorySnapshotStorage::new();
        storage.put_raw(payload);
        let store = SnapshotStore::new(Box::new(storage.clone()), SnapshotSettings::default());

        match store.get_snapshot(&test_catalog()) {
            Some(snapshot) => snapshot.validate().is_ok() && storage.raw().is_some(),
            None => storage.raw().is_none(),
        }
    })
    .ok()
}

#[test]
fn saved_payload_reads_back_intact() {
    let payload = saved_payload();
    let storage = MemorySnapshotStorage::new();
    storage.put_raw(payload);
    let store = SnapshotStore::new(Box::new(storage), SnapshotSettings::default());

    let snapshot: SessionSnapshot = store
        .get_snapshot(&test_catalog())
        .expect("fresh snapshot should be readable");
    assert_eq!(snapshot.step_index, 1);
    assert_eq!(snapshot.elapsed_sec, 12.5);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn random_snapshot_bytes_do_not_panic(raw in prop::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(read_back(raw), Some(true));
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn truncated_snapshot_payloads_do_not_panic(prefix_len in 0usize..1024usize) {
        let mut payload = saved_payload();
        let truncated_len = prefix_len.min(payload.len());
        payload.truncate(truncated_len);

        prop_assert_eq!(read_back(payload), Some(true));
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn mutated_snapshot_payloads_do_not_panic(index in 0usize..1024usize, delta in any::<u8>()) {
        let mut payload = saved_payload();
        if !payload.is_empty() {
            let target = index % payload.len();
            payload[target] ^= delta.max(1);
        }

        prop_assert_eq!(read_back(payload), Some(true));
    }
}
