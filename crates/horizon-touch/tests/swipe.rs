//! Swipe recognition driven through a window.

mod common;

use common::*;
use horizon_touch::prelude::*;

fn swipe_window(swipe: SwipeGestureRecognizer) -> (FakeTree, Window, RecognizerId) {
    init_tracing();
    let tree = FakeTree::new(400.0, 400.0);
    let mut window = window();
    let id = window.add_gesture_recognizer(tree.root, swipe);
    (tree, window, id)
}

fn outcome(window: &Window, id: RecognizerId) -> Option<GestureState> {
    window.gesture_recognizer(id).and_then(|r| r.core().last_outcome())
}

/// Sixty units right with five units of drift, in forty milliseconds.
fn quick_stroke(window: &mut Window, tree: &mut FakeTree) {
    feed(
        window,
        tree,
        &[
            down(1, 0, 10.0, 100.0),
            moved(1, 20, 40.0, 102.0),
            moved(1, 40, 70.0, 105.0),
            up(1, 50, 70.0, 105.0),
        ],
    );
}

#[test]
fn test_fast_stroke_right_is_recognized() {
    let (mut tree, mut window, id) = swipe_window(SwipeGestureRecognizer::new());
    let states = record_states(&mut window, id);

    quick_stroke(&mut window, &mut tree);

    assert_eq!(*states.borrow(), vec![GestureState::Ended]);
    let swipe = window.gesture_recognizer_as::<SwipeGestureRecognizer>(id).unwrap();
    assert_eq!(swipe.direction(), Some(SwipeDirection::RIGHT));
}

#[test]
fn test_disallowed_direction_fails_silently() {
    let (mut tree, mut window, id) = swipe_window(SwipeGestureRecognizer::with_directions(SwipeDirection::LEFT));
    let states = record_states(&mut window, id);

    quick_stroke(&mut window, &mut tree);

    assert!(states.borrow().is_empty());
    assert_eq!(outcome(&window, id), Some(GestureState::Failed));
}

#[test]
fn test_any_allowed_direction_matches() {
    let directions = SwipeDirection::LEFT | SwipeDirection::RIGHT;
    let (mut tree, mut window, id) = swipe_window(SwipeGestureRecognizer::with_directions(directions));

    quick_stroke(&mut window, &mut tree);
    assert_eq!(outcome(&window, id), Some(GestureState::Ended));
}

#[test]
fn test_slow_stroke_is_not_a_swipe() {
    let (mut tree, mut window, id) = swipe_window(SwipeGestureRecognizer::new());

    feed(
        &mut window,
        &mut tree,
        &[down(1, 0, 10.0, 100.0), moved(1, 400, 70.0, 100.0), up(1, 420, 70.0, 100.0)],
    );
    assert_eq!(outcome(&window, id), Some(GestureState::Failed));
}

#[test]
fn test_wandering_across_the_axis_fails() {
    let (mut tree, mut window, id) = swipe_window(SwipeGestureRecognizer::new());

    feed(
        &mut window,
        &mut tree,
        &[down(1, 0, 10.0, 100.0), moved(1, 20, 40.0, 120.0), moved(1, 40, 70.0, 140.0)],
    );
    assert_eq!(outcome(&window, id), Some(GestureState::Failed));
}

#[test]
fn test_short_stroke_fails_on_lift() {
    let (mut tree, mut window, id) = swipe_window(SwipeGestureRecognizer::new());

    feed(&mut window, &mut tree, &[down(1, 0, 10.0, 100.0), moved(1, 20, 40.0, 100.0)]);
    assert_eq!(window.gesture_recognizer(id).map(|r| r.state()), Some(GestureState::Possible));

    feed(&mut window, &mut tree, &[up(1, 30, 40.0, 100.0)]);
    assert_eq!(outcome(&window, id), Some(GestureState::Failed));
}

#[test]
fn test_vertical_swipe_reports_down() {
    let (mut tree, mut window, id) = swipe_window(SwipeGestureRecognizer::with_directions(SwipeDirection::ALL));

    feed(
        &mut window,
        &mut tree,
        &[down(1, 0, 100.0, 10.0), moved(1, 20, 102.0, 40.0), moved(1, 40, 103.0, 80.0)],
    );
    let swipe = window.gesture_recognizer_as::<SwipeGestureRecognizer>(id).unwrap();
    assert_eq!(swipe.direction(), Some(SwipeDirection::DOWN));
}

#[test]
fn test_second_finger_fails_the_swipe() {
    let (mut tree, mut window, id) = swipe_window(SwipeGestureRecognizer::new());

    feed(&mut window, &mut tree, &[down(1, 0, 10.0, 100.0), down(2, 10, 10.0, 200.0)]);
    assert_eq!(window.gesture_recognizer(id).map(|r| r.state()), Some(GestureState::Failed));
}
