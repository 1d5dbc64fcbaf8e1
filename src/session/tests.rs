use super::*;
use crate::test_support::track;

fn snapshot(volume: f32) -> SessionSnapshot {
    SessionSnapshot {
        track: track("a").with_preview_url("https://preview.test/a.mp3"),
        resolved_stream_url: "https://cdn.test/a.mp3".to_string(),
        quality_tag: Some("160kbps".to_string()),
        volume,
    }
}

#[test]
fn empty_dir_restores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    assert!(store.load().is_none());
    assert!(store.load_volume().is_none());
}

#[test]
fn snapshot_survives_a_new_store() {
    let dir = tempfile::tempdir().unwrap();
    SessionStore::new(dir.path()).save(&snapshot(0.3)).unwrap();

    let restored = SessionStore::new(dir.path()).load().unwrap();
    assert_eq!(restored, snapshot(0.3));
    assert_eq!(SessionStore::new(dir.path()).load_volume(), Some(0.3));
}

#[test]
fn record_layout_nests_stream_url_in_track() {
    let dir = tempfile::tempdir().unwrap();
    SessionStore::new(dir.path()).save(&snapshot(0.5)).unwrap();

    let raw = std::fs::read_to_string(dir.path().join(SESSION_FILE)).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["volume"], 0.5);
    assert_eq!(v["track"]["id"], "a");
    assert_eq!(v["track"]["name"], "Song a");
    assert_eq!(v["track"]["resolved_stream_url"], "https://cdn.test/a.mp3");
    assert!(!dir.path().join("current_track.tmp").exists());
}

#[test]
fn scalar_volume_is_used_without_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    store.save_volume(0.25).unwrap();

    assert!(store.load().is_none());
    assert_eq!(store.load_volume(), Some(0.25));
}

#[test]
fn volume_change_updates_existing_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    store.save(&snapshot(0.7)).unwrap();
    store.save_volume(0.3).unwrap();

    let restored = SessionStore::new(dir.path()).load().unwrap();
    assert_eq!(restored, snapshot(0.3));
    assert_eq!(SessionStore::new(dir.path()).load_volume(), Some(0.3));
    let scalar = std::fs::read_to_string(dir.path().join(VOLUME_FILE)).unwrap();
    assert_eq!(scalar.trim(), "0.3");
}

#[test]
fn malformed_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(SESSION_FILE), "{ not json").unwrap();
    std::fs::write(dir.path().join(VOLUME_FILE), "loud").unwrap();

    let store = SessionStore::new(dir.path());
    assert!(store.load().is_none());
    assert!(store.load_volume().is_none());
}

#[test]
fn out_of_range_volume_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(VOLUME_FILE), "1.8\n").unwrap();
    assert_eq!(SessionStore::new(dir.path()).load_volume(), Some(1.0));
}

#[test]
fn writes_create_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("deeper").join("legato");
    let store = SessionStore::new(&nested);

    store.save_volume(0.9).unwrap();
    assert_eq!(store.load_volume(), Some(0.9));
}

#[test]
fn disabled_store_remembers_nothing() {
    let store = SessionStore::disabled();
    store.save(&snapshot(0.3)).unwrap();
    store.save_volume(0.3).unwrap();
    assert!(store.load().is_none());
    assert!(store.load_volume().is_none());
    assert!(store.dir().is_none());
}
