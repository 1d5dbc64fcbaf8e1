use std::sync::{Arc, Mutex};

use super::*;
use crate::test_support::FakeAudio;

fn recording_engine(audio: &FakeAudio) -> (AudioEngine, Arc<Mutex<Vec<EngineEvent>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener: Listener = Arc::new(move |ev: EngineEvent| sink.lock().unwrap().push(ev));
    (AudioEngine::new(audio.backend(), 0.7, listener), seen)
}

#[test]
fn load_replaces_and_releases_previous_resource() {
    let audio = FakeAudio::new();
    let (mut engine, _) = recording_engine(&audio);

    let first = engine.load("https://cdn.test/a.mp3", 0.7).unwrap();
    let second = engine.load("https://cdn.test/b.mp3", 0.7).unwrap();

    assert_ne!(first, second);
    assert_eq!(audio.opened(), 2);
    assert_eq!(audio.live(), 1);
    assert!(audio.resource(0).released);
    assert_eq!(engine.active_resource(), Some(second));
    assert_eq!(engine.stream_url(), Some("https://cdn.test/b.mp3"));
}

#[test]
fn replaced_resource_can_no_longer_reach_listener() {
    let audio = FakeAudio::new();
    let (mut engine, seen) = recording_engine(&audio);

    engine.load("https://cdn.test/a.mp3", 0.7).unwrap();
    assert!(audio.emit(0, EngineEventKind::Progress { current_ms: 10, duration_ms: None }));

    engine.load("https://cdn.test/b.mp3", 0.7).unwrap();
    assert!(!audio.emit(0, EngineEventKind::Ended));
    assert!(audio.emit(1, EngineEventKind::Ended));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].kind, EngineEventKind::Ended);
    assert!(engine.accept(&seen[1]));
    assert!(!engine.accept(&seen[0]));
}

#[test]
fn unload_detaches_and_empties_engine() {
    let audio = FakeAudio::new();
    let (mut engine, seen) = recording_engine(&audio);

    engine.load("https://cdn.test/a.mp3", 0.7).unwrap();
    engine.unload();

    assert!(!engine.is_loaded());
    assert_eq!(audio.live(), 0);
    assert!(!audio.emit(0, EngineEventKind::Ended));
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn detach_silences_resource_but_keeps_it_loaded() {
    let audio = FakeAudio::new();
    let (mut engine, seen) = recording_engine(&audio);

    engine.load("https://cdn.test/a.mp3", 0.7).unwrap();
    engine.play().unwrap();
    assert!(audio.emit(0, EngineEventKind::Progress { current_ms: 10, duration_ms: None }));

    engine.detach();
    assert!(engine.is_loaded());
    assert!(!audio.resource(0).playing);
    assert!(!audio.resource(0).released);
    assert!(!audio.emit(0, EngineEventKind::Error("late".to_string())));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(!engine.accept(&seen[0]));
}

#[test]
fn volume_is_recorded_without_a_resource_and_applied_on_load() {
    let audio = FakeAudio::new();
    let (mut engine, _) = recording_engine(&audio);

    engine.set_volume(0.3);
    assert_eq!(engine.volume(), 0.3);

    engine.load("https://cdn.test/a.mp3", engine.volume()).unwrap();
    assert_eq!(audio.last().volume, 0.3);

    engine.set_volume(2.0);
    assert_eq!(engine.volume(), 1.0);
    assert_eq!(audio.last().volume, 1.0);
}

#[test]
fn transport_without_resource() {
    let audio = FakeAudio::new();
    let (mut engine, _) = recording_engine(&audio);

    assert_eq!(engine.play(), Err(AudioError::NotLoaded));
    engine.pause();
    engine.seek(1_000);
    assert_eq!(engine.position_ms(), 0);
    assert_eq!(engine.duration_ms(), None);
}

#[test]
fn transport_reaches_loaded_resource() {
    let audio = FakeAudio::new();
    let (mut engine, _) = recording_engine(&audio);

    engine.load("https://cdn.test/a.mp3", 0.7).unwrap();
    assert!(!audio.last().playing);

    engine.play().unwrap();
    assert!(audio.last().playing);

    engine.seek(42_000);
    assert_eq!(engine.position_ms(), 42_000);

    engine.pause();
    assert!(!audio.last().playing);
}

#[test]
fn failed_open_leaves_nothing_loaded() {
    let audio = FakeAudio::new();
    let (mut engine, _) = recording_engine(&audio);

    engine.load("https://cdn.test/a.mp3", 0.7).unwrap();
    audio.fail_open(true);
    assert!(engine.load("https://cdn.test/b.mp3", 0.7).is_err());

    assert!(!engine.is_loaded());
    assert_eq!(audio.live(), 0);
}

#[test]
fn clamp_volume_handles_nan_and_range() {
    assert_eq!(clamp_volume(f32::NAN), 0.0);
    assert_eq!(clamp_volume(-1.0), 0.0);
    assert_eq!(clamp_volume(0.25), 0.25);
    assert_eq!(clamp_volume(3.0), 1.0);
}

#[test]
fn dropped_subscription_detaches() {
    let seen = Arc::new(Mutex::new(0usize));
    let counter = seen.clone();
    let listener: Listener = Arc::new(move |_: EngineEvent| *counter.lock().unwrap() += 1);

    let (sub, emitter) = subscribe(ResourceId::next(), listener);
    assert!(emitter.emit(EngineEventKind::Ended));
    drop(sub);
    assert!(!emitter.emit(EngineEventKind::Ended));
    assert_eq!(*seen.lock().unwrap(), 1);
}
