//! Recognizers competing for the same touches.

mod common;

use common::*;
use horizon_touch::{Rect, set_state};
use horizon_touch::prelude::*;

struct AlongsideEveryone;

impl GestureDelegate for AlongsideEveryone {
    fn should_recognize_simultaneously(&self, _: &dyn GestureRecognizer, _: &dyn GestureRecognizer) -> bool {
        true
    }
}

struct RefuseTouches;

impl GestureDelegate for RefuseTouches {
    fn should_receive_touch(&self, _: &dyn GestureRecognizer, _: &Touch) -> bool {
        false
    }
}

struct NeverBegin;

impl GestureDelegate for NeverBegin {
    fn should_begin(&self, _: &dyn GestureRecognizer) -> bool {
        false
    }
}

fn exclusive_window() -> Window {
    Window::new(
        TouchConfig::default()
            .with_arbitration(ArbitrationPolicy::Exclusive)
            .with_panic_on_fault(false),
    )
}

fn outcome(window: &Window, id: RecognizerId) -> Option<GestureState> {
    window.gesture_recognizer(id).and_then(|r| r.core().last_outcome())
}

/// Press, drag twenty units, lift: a pan, and within tap tolerance.
fn short_drag(window: &mut Window, tree: &mut FakeTree) {
    feed(
        window,
        tree,
        &[down(1, 0, 50.0, 50.0), moved(1, 40, 70.0, 50.0), up(1, 80, 70.0, 50.0)],
    );
}

#[test]
fn test_exclusive_pan_fails_a_pending_tap() {
    init_tracing();
    let mut tree = FakeTree::new(200.0, 200.0);
    let mut window = exclusive_window();
    let tap = window.add_gesture_recognizer(tree.root, TapGestureRecognizer::new());
    let pan = window.add_gesture_recognizer(tree.root, PanGestureRecognizer::new());

    short_drag(&mut window, &mut tree);

    assert_eq!(outcome(&window, tap), Some(GestureState::Failed));
    assert_eq!(outcome(&window, pan), Some(GestureState::Ended));
}

#[test]
fn test_simultaneous_policy_lets_both_recognize() {
    let mut tree = FakeTree::new(200.0, 200.0);
    let mut window = window();
    let tap = window.add_gesture_recognizer(tree.root, TapGestureRecognizer::new());
    let pan = window.add_gesture_recognizer(tree.root, PanGestureRecognizer::new());

    short_drag(&mut window, &mut tree);

    assert_eq!(outcome(&window, tap), Some(GestureState::Ended));
    assert_eq!(outcome(&window, pan), Some(GestureState::Ended));
}

#[test]
fn test_delegate_can_allow_simultaneous_recognition() {
    let mut tree = FakeTree::new(200.0, 200.0);
    let mut window = exclusive_window();
    let tap = window.add_gesture_recognizer(tree.root, TapGestureRecognizer::new());
    let mut pan = PanGestureRecognizer::new();
    pan.core_mut().set_delegate(AlongsideEveryone);
    let pan = window.add_gesture_recognizer(tree.root, pan);

    short_drag(&mut window, &mut tree);

    assert_eq!(outcome(&window, tap), Some(GestureState::Ended));
    assert_eq!(outcome(&window, pan), Some(GestureState::Ended));
}

#[test]
fn test_more_taps_outrank_fewer() {
    let single = TapGestureRecognizer::new();
    let double = TapGestureRecognizer::new().with_taps_required(2);
    let pan = PanGestureRecognizer::new();

    assert!(double.can_prevent(&single));
    assert!(!single.can_prevent(&double));
    assert!(single.can_be_prevented_by(&double));
    assert!(!double.can_be_prevented_by(&single));
    assert!(pan.can_be_prevented_by(&single));
    assert!(single.can_be_prevented_by(&pan));
}

#[test]
fn test_exclusive_double_tap_fails_the_pending_single_tap() {
    let mut tree = FakeTree::new(200.0, 200.0);
    let mut window = exclusive_window();
    let double = window.add_gesture_recognizer(tree.root, TapGestureRecognizer::new().with_taps_required(2));
    let single = window.add_gesture_recognizer(tree.root, TapGestureRecognizer::new());
    let single_states = record_states(&mut window, single);
    let double_states = record_states(&mut window, double);

    feed(&mut window, &mut tree, &[down(1, 0, 50.0, 50.0), up(1, 60, 50.0, 50.0)]);
    assert_eq!(*single_states.borrow(), vec![GestureState::Ended]);
    assert_eq!(outcome(&window, double), Some(GestureState::Failed));

    feed(&mut window, &mut tree, &[down(1, 180, 50.0, 50.0), up(1, 240, 50.0, 50.0)]);
    assert_eq!(*double_states.borrow(), vec![GestureState::Ended]);
    assert_eq!(single_states.borrow().len(), 1);
    assert_eq!(outcome(&window, single), Some(GestureState::Failed));
}

#[test]
fn test_refused_touch_never_reaches_the_recognizer() {
    let mut tree = FakeTree::new(200.0, 200.0);
    let mut window = window();
    let mut tap = TapGestureRecognizer::new();
    tap.core_mut().set_delegate(RefuseTouches);
    let tap = window.add_gesture_recognizer(tree.root, tap);

    feed(&mut window, &mut tree, &[down(1, 0, 50.0, 50.0)]);
    let touch = window.event().touch_for_pointer(PointerId(1)).unwrap();
    assert!(!touch.gesture_recognizers().contains(&tap));

    feed(&mut window, &mut tree, &[up(1, 40, 50.0, 50.0)]);
    assert_eq!(outcome(&window, tap), None);
    assert_eq!(tree.calls(tree.root).len(), 2);
}

#[test]
fn test_refused_start_fails_instead() {
    let mut tree = FakeTree::new(200.0, 200.0);
    let mut window = window();
    let mut tap = TapGestureRecognizer::new();
    tap.core_mut().set_delegate(NeverBegin);
    let tap = window.add_gesture_recognizer(tree.root, tap);
    let states = record_states(&mut window, tap);

    feed(&mut window, &mut tree, &[down(1, 0, 50.0, 50.0), up(1, 40, 50.0, 50.0)]);
    assert!(states.borrow().is_empty());
    assert_eq!(outcome(&window, tap), Some(GestureState::Failed));
}

#[test]
fn test_disabling_mid_pan_cancels_it() {
    let mut tree = FakeTree::new(200.0, 200.0);
    let mut window = window();
    let pan = window.add_gesture_recognizer(tree.root, PanGestureRecognizer::new());
    let states = record_states(&mut window, pan);

    feed(
        &mut window,
        &mut tree,
        &[down(1, 0, 50.0, 50.0), moved(1, 16, 70.0, 50.0), moved(1, 32, 90.0, 50.0)],
    );
    window.set_recognizer_enabled(pan, false).unwrap();

    assert_eq!(
        *states.borrow(),
        vec![GestureState::Began, GestureState::Changed, GestureState::Cancelled]
    );
    let core = window.gesture_recognizer(pan).unwrap().core();
    assert!(!core.is_enabled());
    assert_eq!(core.state(), GestureState::Possible);

    feed(&mut window, &mut tree, &[moved(1, 48, 120.0, 50.0), up(1, 64, 120.0, 50.0)]);
    assert_eq!(states.borrow().len(), 3);
}

#[test]
fn test_ancestor_recognizers_see_descendant_touches() {
    let mut tree = FakeTree::new(200.0, 200.0);
    let child = tree.add_view(tree.root, Rect::new(0.0, 0.0, 100.0, 100.0));
    let mut window = window();
    let outer = window.add_gesture_recognizer(tree.root, TapGestureRecognizer::new());
    let inner = window.add_gesture_recognizer(child, TapGestureRecognizer::new());

    assert_eq!(window.gesture_recognizers_for(&tree, child), vec![inner, outer]);

    feed(&mut window, &mut tree, &[down(1, 0, 20.0, 20.0), up(1, 40, 20.0, 20.0)]);
    assert_eq!(outcome(&window, inner), Some(GestureState::Ended));
    assert_eq!(outcome(&window, outer), Some(GestureState::Ended));

    feed(&mut window, &mut tree, &[down(1, 1000, 150.0, 150.0), up(1, 1040, 150.0, 150.0)]);
    assert_eq!(window.gesture_recognizer(inner).map(|r| r.core().generation()), Some(1));
    assert_eq!(window.gesture_recognizer(outer).map(|r| r.core().generation()), Some(2));
}

#[test]
fn test_illegal_transition_is_reported_and_ignored() {
    let mut window = window();
    let tree = FakeTree::new(200.0, 200.0);
    let pan = window.add_gesture_recognizer(tree.root, PanGestureRecognizer::new());

    let recognizer = window.gesture_recognizer_mut(pan).unwrap();
    let result = set_state(recognizer, GestureState::Changed);
    assert_eq!(
        result,
        Err(TouchError::IllegalTransition {
            from: GestureState::Possible,
            to: GestureState::Changed,
        })
    );
    assert!(result.unwrap_err().is_state_fault());
    assert_eq!(recognizer.state(), GestureState::Possible);
}
