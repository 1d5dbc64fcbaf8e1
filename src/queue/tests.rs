use super::*;
use crate::track::TrackDescriptor;

fn t(id: &str) -> TrackDescriptor {
    TrackDescriptor::new(id, id.to_uppercase())
}

fn abc() -> Queue {
    let mut q = Queue::new();
    q.set_queue(vec![t("a"), t("b"), t("c")]);
    q
}

fn step_next(q: &mut Queue) -> String {
    let id = q.next_from_current().unwrap().id.clone();
    q.set_current(id.clone());
    id
}

#[test]
fn empty_queue_navigation_yields_nothing() {
    let mut q = Queue::new();
    assert!(q.next_from_current().is_none());
    assert!(q.previous_from_current().is_none());

    q.set_current("elsewhere");
    assert!(q.next_from_current().is_none());
}

#[test]
fn next_without_current_starts_at_first() {
    let q = abc();
    assert_eq!(q.next_from_current().unwrap().id, "a");
}

#[test]
fn next_walks_forward_and_wraps() {
    let mut q = abc();
    q.set_current("a");
    assert_eq!(step_next(&mut q), "b");
    assert_eq!(step_next(&mut q), "c");
    assert_eq!(step_next(&mut q), "a");
}

#[test]
fn next_n_times_returns_to_start() {
    for n in 1..=5 {
        let mut q = Queue::new();
        q.set_queue((0..n).map(|i| t(&format!("t{i}"))).collect());
        q.set_current("t0");
        for _ in 0..n {
            step_next(&mut q);
        }
        assert_eq!(q.current_track_id(), Some("t0"), "queue of {n}");
    }
}

#[test]
fn previous_walks_backward_and_wraps_to_last() {
    let mut q = abc();
    q.set_current("b");
    assert_eq!(q.previous_from_current().unwrap().id, "a");

    q.set_current("a");
    assert_eq!(q.previous_from_current().unwrap().id, "c");
}

#[test]
fn unknown_current_wraps_in_both_directions() {
    let mut q = abc();
    q.set_current("from-search");
    assert_eq!(q.next_from_current().unwrap().id, "a");
    assert_eq!(q.previous_from_current().unwrap().id, "c");
}

#[test]
fn previous_without_current_starts_at_last() {
    let q = abc();
    assert_eq!(q.previous_from_current().unwrap().id, "c");
}

#[test]
fn set_queue_keeps_current_and_relocates_by_id() {
    let mut q = abc();
    q.set_current("b");

    // Refreshed page: same track, different position.
    q.set_queue(vec![t("x"), t("b"), t("y"), t("z")]);
    assert_eq!(q.current_track_id(), Some("b"));
    assert_eq!(q.next_from_current().unwrap().id, "y");
}

#[test]
fn add_to_queue_appends() {
    let mut q = abc();
    q.add_to_queue(t("d"));
    q.set_current("c");
    assert_eq!(q.next_from_current().unwrap().id, "d");
    assert_eq!(q.len(), 4);
}
