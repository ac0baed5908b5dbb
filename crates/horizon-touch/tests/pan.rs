//! Pan recognition driven through a window.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use horizon_touch::input::PointerAction;
use horizon_touch::prelude::*;
use horizon_touch::recognizer_cast;

fn pan_window(pan: PanGestureRecognizer) -> (FakeTree, Window, RecognizerId) {
    init_tracing();
    let tree = FakeTree::new(400.0, 400.0);
    let mut window = window();
    let id = window.add_gesture_recognizer(tree.root, pan);
    (tree, window, id)
}

/// Record `(state, translation)` on every notification.
fn record_translations(window: &mut Window, id: RecognizerId) -> Rc<RefCell<Vec<(GestureState, Vector)>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    window
        .add_gesture_handler(id, move |r| {
            if let Some(pan) = recognizer_cast::<PanGestureRecognizer>(r) {
                sink.borrow_mut().push((pan.state(), pan.translation()));
            }
        })
        .unwrap();
    log
}

#[test]
fn test_translation_starts_from_the_last_sample_before_the_threshold() {
    let (mut tree, mut window, id) = pan_window(PanGestureRecognizer::new());
    let log = record_translations(&mut window, id);

    feed(
        &mut window,
        &mut tree,
        &[down(1, 0, 20.0, 50.0), moved(1, 16, 29.0, 50.0), moved(1, 32, 32.0, 50.0)],
    );

    assert_eq!(*log.borrow(), vec![(GestureState::Began, Vector::new(3.0, 0.0))]);
}

#[test]
fn test_continued_movement_reports_changes_then_ends() {
    let (mut tree, mut window, id) = pan_window(PanGestureRecognizer::new());
    let log = record_translations(&mut window, id);

    feed(
        &mut window,
        &mut tree,
        &[
            down(1, 0, 20.0, 50.0),
            moved(1, 16, 29.0, 50.0),
            moved(1, 32, 32.0, 50.0),
            moved(1, 48, 52.0, 60.0),
        ],
    );

    let pan = window.gesture_recognizer_as::<PanGestureRecognizer>(id).unwrap();
    assert_eq!(pan.state(), GestureState::Changed);
    assert_eq!(pan.translation(), Vector::new(23.0, 10.0));
    assert_eq!(pan.location(), Point::new(52.0, 60.0));
    let velocity = pan.velocity();
    assert!((velocity.dx - 32.0 / 0.048).abs() < 1.0, "velocity {velocity:?}");
    assert!((velocity.dy - 10.0 / 0.048).abs() < 1.0, "velocity {velocity:?}");

    feed(&mut window, &mut tree, &[up(1, 64, 52.0, 60.0)]);
    let states: Vec<GestureState> = log.borrow().iter().map(|(s, _)| *s).collect();
    assert_eq!(
        states,
        vec![GestureState::Began, GestureState::Changed, GestureState::Ended]
    );
    assert_eq!(
        window.gesture_recognizer(id).map(|r| r.state()),
        Some(GestureState::Possible)
    );
}

#[test]
fn test_lifting_before_the_threshold_fails() {
    let (mut tree, mut window, id) = pan_window(PanGestureRecognizer::new());
    let log = record_translations(&mut window, id);

    feed(
        &mut window,
        &mut tree,
        &[down(1, 0, 20.0, 50.0), moved(1, 16, 25.0, 52.0), up(1, 32, 25.0, 52.0)],
    );

    assert!(log.borrow().is_empty());
    assert_eq!(
        window.gesture_recognizer(id).and_then(|r| r.core().last_outcome()),
        Some(GestureState::Failed)
    );
}

#[test]
fn test_set_translation_rebases_the_reference_point() {
    let (mut tree, mut window, id) = pan_window(PanGestureRecognizer::new());

    feed(
        &mut window,
        &mut tree,
        &[down(1, 0, 20.0, 50.0), moved(1, 16, 29.0, 50.0), moved(1, 32, 40.0, 50.0)],
    );
    window
        .gesture_recognizer_as_mut::<PanGestureRecognizer>(id)
        .unwrap()
        .set_translation(Vector::ZERO);

    feed(&mut window, &mut tree, &[moved(1, 48, 45.0, 47.0)]);
    let pan = window.gesture_recognizer_as::<PanGestureRecognizer>(id).unwrap();
    assert_eq!(pan.translation(), Vector::new(5.0, -3.0));
}

#[test]
fn test_too_few_fingers_never_begin() {
    let (mut tree, mut window, id) = pan_window(PanGestureRecognizer::new().with_minimum_touches(2));

    feed(
        &mut window,
        &mut tree,
        &[down(1, 0, 20.0, 50.0), moved(1, 16, 60.0, 50.0), up(1, 32, 60.0, 50.0)],
    );
    assert_eq!(
        window.gesture_recognizer(id).and_then(|r| r.core().last_outcome()),
        Some(GestureState::Failed)
    );
}

#[test]
fn test_two_finger_pan_follows_the_centroid() {
    let (mut tree, mut window, id) = pan_window(PanGestureRecognizer::new().with_minimum_touches(2));

    feed(&mut window, &mut tree, &[down(1, 0, 100.0, 100.0), down(2, 0, 200.0, 100.0)]);
    let drag = |ms, dx: f32| sample(PointerAction::Move, 2, ms, &[(1, 100.0 + dx, 100.0), (2, 200.0 + dx, 100.0)]);
    feed(&mut window, &mut tree, &[drag(16, 8.0), drag(32, 20.0)]);

    let pan = window.gesture_recognizer_as::<PanGestureRecognizer>(id).unwrap();
    assert_eq!(pan.state(), GestureState::Began);
    assert_eq!(pan.location(), Point::new(170.0, 100.0));
    assert_eq!(pan.translation(), Vector::new(12.0, 0.0));
}

#[test]
fn test_cancelling_an_active_pan_reports_cancelled() {
    let (mut tree, mut window, id) = pan_window(PanGestureRecognizer::new());
    let log = record_translations(&mut window, id);

    feed(&mut window, &mut tree, &[down(1, 0, 20.0, 50.0), moved(1, 16, 50.0, 50.0)]);
    feed(&mut window, &mut tree, &[cancel(1, 32, 50.0, 50.0)]);

    let states: Vec<GestureState> = log.borrow().iter().map(|(s, _)| *s).collect();
    assert_eq!(states, vec![GestureState::Began, GestureState::Cancelled]);
}
