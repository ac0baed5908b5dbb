//! Shared fixtures for the integration tests: a slotmap-backed view tree
//! whose responders record every callback, and sample builders.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use slotmap::SlotMap;

use horizon_touch::input::{PointerAction, RawSample};
use horizon_touch::prelude::*;
use horizon_touch::{ControllerId, Rect};

/// One recorded responder callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub phase: TouchPhase,
    pub touches: Vec<TouchId>,
}

#[derive(Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
    pub stops: bool,
    pub accepts_focus: bool,
    pub focus_events: Vec<&'static str>,
}

impl Recorder {
    fn record(&mut self, phase: TouchPhase, touches: &[&Touch]) -> Propagation {
        self.calls.push(Call {
            phase,
            touches: touches.iter().map(|t| t.id()).collect(),
        });
        if self.stops {
            Propagation::Stop
        } else {
            Propagation::Forward
        }
    }
}

impl Responder for Recorder {
    fn touches_began(&mut self, touches: &[&Touch], _event: &Event) -> Propagation {
        self.record(TouchPhase::Began, touches)
    }

    fn touches_moved(&mut self, touches: &[&Touch], _event: &Event) -> Propagation {
        self.record(TouchPhase::Moved, touches)
    }

    fn touches_ended(&mut self, touches: &[&Touch], _event: &Event) -> Propagation {
        self.record(TouchPhase::Ended, touches)
    }

    fn touches_cancelled(&mut self, touches: &[&Touch], _event: &Event) -> Propagation {
        self.record(TouchPhase::Cancelled, touches)
    }

    fn can_become_first_responder(&self) -> bool {
        self.accepts_focus
    }

    fn did_become_first_responder(&mut self) {
        self.focus_events.push("became");
    }

    fn did_resign_first_responder(&mut self) {
        self.focus_events.push("resigned");
    }
}

pub struct Node {
    /// Frame in window coordinates.
    pub frame: Rect,
    pub parent: Option<ViewId>,
    pub children: Vec<ViewId>,
    pub responder: Recorder,
}

pub struct Controller {
    pub view: ViewId,
    pub responder: Recorder,
}

pub struct FakeTree {
    pub views: SlotMap<ViewId, Node>,
    pub controllers: SlotMap<ControllerId, Controller>,
    pub controller_of: HashMap<ViewId, ControllerId>,
    pub root: ViewId,
    pub scale: f32,
    pub surface_origin: Point,
}

impl FakeTree {
    /// A tree with a single root view covering `width` x `height`.
    pub fn new(width: f32, height: f32) -> Self {
        let mut views = SlotMap::with_key();
        let root = views.insert(Node {
            frame: Rect::new(0.0, 0.0, width, height),
            parent: None,
            children: Vec::new(),
            responder: Recorder::default(),
        });
        Self {
            views,
            controllers: SlotMap::with_key(),
            controller_of: HashMap::new(),
            root,
            scale: 1.0,
            surface_origin: Point::ZERO,
        }
    }

    /// Add a view with a frame in window coordinates.
    pub fn add_view(&mut self, parent: ViewId, frame: Rect) -> ViewId {
        let id = self.views.insert(Node {
            frame,
            parent: Some(parent),
            children: Vec::new(),
            responder: Recorder::default(),
        });
        self.views[parent].children.push(id);
        id
    }

    pub fn add_controller(&mut self, view: ViewId) -> ControllerId {
        let id = self.controllers.insert(Controller {
            view,
            responder: Recorder::default(),
        });
        self.controller_of.insert(view, id);
        id
    }

    pub fn remove_view(&mut self, view: ViewId) {
        if let Some(node) = self.views.remove(view)
            && let Some(parent) = node.parent
            && let Some(parent) = self.views.get_mut(parent)
        {
            parent.children.retain(|&c| c != view);
        }
    }

    pub fn recorder(&self, id: ResponderId) -> &Recorder {
        match id {
            ResponderId::View(view) => &self.views[view].responder,
            ResponderId::Controller(controller) => &self.controllers[controller].responder,
        }
    }

    pub fn recorder_mut(&mut self, id: ResponderId) -> &mut Recorder {
        match id {
            ResponderId::View(view) => &mut self.views[view].responder,
            ResponderId::Controller(controller) => &mut self.controllers[controller].responder,
        }
    }

    pub fn calls(&self, view: ViewId) -> &[Call] {
        &self.views[view].responder.calls
    }

    fn hit(&self, view: ViewId, point: Point) -> Option<ViewId> {
        let node = self.views.get(view)?;
        if !node.frame.contains(point) {
            return None;
        }
        node.children
            .iter()
            .rev()
            .find_map(|&child| self.hit(child, point))
            .or(Some(view))
    }
}

impl ResponderAccess for FakeTree {
    fn responder(&self, id: ResponderId) -> Option<&dyn Responder> {
        match id {
            ResponderId::View(view) => self.views.get(view).map(|n| &n.responder as &dyn Responder),
            ResponderId::Controller(c) => self.controllers.get(c).map(|c| &c.responder as &dyn Responder),
        }
    }

    fn responder_mut(&mut self, id: ResponderId) -> Option<&mut dyn Responder> {
        match id {
            ResponderId::View(view) => self
                .views
                .get_mut(view)
                .map(|n| &mut n.responder as &mut dyn Responder),
            ResponderId::Controller(c) => self
                .controllers
                .get_mut(c)
                .map(|c| &mut c.responder as &mut dyn Responder),
        }
    }
}

impl ViewHierarchy for FakeTree {
    fn hit_test(&self, point: Point) -> Option<ViewId> {
        self.hit(self.root, point)
    }

    fn superview(&self, view: ViewId) -> Option<ViewId> {
        self.views.get(view).and_then(|n| n.parent)
    }

    fn contains_view(&self, view: ViewId) -> bool {
        self.views.contains_key(view)
    }

    fn view_controller(&self, view: ViewId) -> Option<ControllerId> {
        self.controller_of.get(&view).copied()
    }

    fn controller_view(&self, controller: ControllerId) -> Option<ViewId> {
        self.controllers.get(controller).map(|c| c.view)
    }

    fn scale_factor(&self) -> f32 {
        self.scale
    }

    fn surface_origin(&self) -> Point {
        self.surface_origin
    }

    fn convert_from_window(&self, view: ViewId, point: Point) -> Point {
        match self.views.get(view) {
            Some(node) => Point::new(point.x - node.frame.origin.x, point.y - node.frame.origin.y),
            None => point,
        }
    }
}

/// Build a sample with the given pointer positions.
pub fn sample(action: PointerAction, pointer: u64, ms: u64, pointers: &[(u64, f32, f32)]) -> RawSample {
    pointers.iter().fold(
        RawSample::new(action, PointerId(pointer), Timestamp::from_millis(ms)),
        |s, &(id, x, y)| s.with_pointer(PointerId(id), x, y),
    )
}

pub fn down(pointer: u64, ms: u64, x: f32, y: f32) -> RawSample {
    sample(PointerAction::Down, pointer, ms, &[(pointer, x, y)])
}

pub fn moved(pointer: u64, ms: u64, x: f32, y: f32) -> RawSample {
    sample(PointerAction::Move, pointer, ms, &[(pointer, x, y)])
}

pub fn up(pointer: u64, ms: u64, x: f32, y: f32) -> RawSample {
    sample(PointerAction::Up, pointer, ms, &[(pointer, x, y)])
}

pub fn cancel(pointer: u64, ms: u64, x: f32, y: f32) -> RawSample {
    sample(PointerAction::Cancel, pointer, ms, &[(pointer, x, y)])
}

/// A window whose faults return errors instead of panicking.
pub fn window() -> Window {
    Window::new(TouchConfig::default().with_panic_on_fault(false))
}

/// Record every notified state of a recognizer.
pub fn record_states(window: &mut Window, id: RecognizerId) -> Rc<RefCell<Vec<GestureState>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    window
        .add_gesture_handler(id, move |r| sink.borrow_mut().push(r.state()))
        .expect("recognizer exists");
    log
}

/// Feed samples one cycle each, failing the test on any fault.
pub fn feed(window: &mut Window, tree: &mut FakeTree, samples: &[RawSample]) {
    for sample in samples {
        window.handle_sample(tree, sample).expect("dispatch succeeds");
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
