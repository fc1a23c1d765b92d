//! Drag and resize controllers.
//!
//! Each controller is a two-state machine (idle ↔ active) holding at most
//! one session. A session is bound to the pointer that opened it; events
//! from any other pointer are ignored. Controllers translate pointer events
//! into `EditorMutation`s and never touch the document themselves.

use crate::document::EditorMutation;
use crate::input::{InputEvent, PointerId};
use kurbo::{Point, Vec2};
use pb_core::ElementId;
use pb_core::model::{CanvasElement, Height};
use pb_render::layout::rendered_height;

/// Resize floors.
pub const MIN_WIDTH: f64 = 40.0;
pub const MIN_HEIGHT: f64 = 20.0;

/// Trait for gesture controllers that turn input into mutations.
pub trait Gesture {
    fn is_active(&self) -> bool;

    /// Pointer the open session is bound to.
    fn pointer_id(&self) -> Option<PointerId>;

    /// Handle a move/up/cancel event, returning zero or more mutations.
    /// Up and cancel from the session's pointer close the session.
    fn handle(&mut self, event: &InputEvent) -> Vec<EditorMutation>;

    /// Drop the session without emitting anything.
    fn cancel(&mut self);
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub id: ElementId,
    pub pointer_id: PointerId,
    /// Pointer position at pointer-down.
    pub start: Point,
    /// Element top-left at pointer-down.
    pub origin: Point,
}

impl DragSession {
    /// Target position for a pointer at `at`: origin plus the cumulative
    /// delta, each coordinate clamped at 0.
    pub fn target(&self, at: Point) -> Point {
        let moved = self.origin + (at - self.start);
        Point::new(moved.x.max(0.0), moved.y.max(0.0))
    }
}

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Open a session on `element`. Returns `false` if one is already open.
    pub fn begin(&mut self, element: &CanvasElement, pointer_id: PointerId, at: Point) -> bool {
        if self.session.is_some() {
            return false;
        }
        log::debug!("drag start {} pointer {pointer_id}", element.id);
        self.session = Some(DragSession {
            id: element.id,
            pointer_id,
            start: at,
            origin: element.position,
        });
        true
    }
}

impl Gesture for DragController {
    fn is_active(&self) -> bool {
        self.session.is_some()
    }

    fn pointer_id(&self) -> Option<PointerId> {
        self.session.map(|s| s.pointer_id)
    }

    fn handle(&mut self, event: &InputEvent) -> Vec<EditorMutation> {
        let Some(session) = self.session else {
            return vec![];
        };
        if event.pointer_id() != session.pointer_id {
            return vec![];
        }
        match event {
            InputEvent::PointerMove { at, .. } => {
                let position = session.target(*at);
                log::trace!("drag {} → {position:?}", session.id);
                vec![EditorMutation::MoveTo {
                    id: session.id,
                    position,
                }]
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel { .. } => {
                log::debug!("drag end {}", session.id);
                self.session = None;
                vec![]
            }
            InputEvent::PointerDown { .. } => vec![],
        }
    }

    fn cancel(&mut self) {
        self.session = None;
    }
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub id: ElementId,
    pub pointer_id: PointerId,
    pub start: Point,
    /// Size at pointer-down. An `auto` height starts from the rendered
    /// height.
    pub origin_width: f64,
    pub origin_height: f64,
}

impl ResizeSession {
    /// Target size for a pointer at `at`, floored at the minimums.
    pub fn target(&self, at: Point) -> (f64, f64) {
        let delta: Vec2 = at - self.start;
        (
            (self.origin_width + delta.x).max(MIN_WIDTH),
            (self.origin_height + delta.y).max(MIN_HEIGHT),
        )
    }
}

#[derive(Debug, Default)]
pub struct ResizeController {
    session: Option<ResizeSession>,
}

impl ResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&ResizeSession> {
        self.session.as_ref()
    }

    /// Open a session on `element`. Returns `false` if one is already open.
    pub fn begin(&mut self, element: &CanvasElement, pointer_id: PointerId, at: Point) -> bool {
        if self.session.is_some() {
            return false;
        }
        log::debug!("resize start {} pointer {pointer_id}", element.id);
        self.session = Some(ResizeSession {
            id: element.id,
            pointer_id,
            start: at,
            origin_width: element.width,
            origin_height: rendered_height(element),
        });
        true
    }
}

impl Gesture for ResizeController {
    fn is_active(&self) -> bool {
        self.session.is_some()
    }

    fn pointer_id(&self) -> Option<PointerId> {
        self.session.map(|s| s.pointer_id)
    }

    fn handle(&mut self, event: &InputEvent) -> Vec<EditorMutation> {
        let Some(session) = self.session else {
            return vec![];
        };
        if event.pointer_id() != session.pointer_id {
            return vec![];
        }
        match event {
            InputEvent::PointerMove { at, .. } => {
                let (width, height) = session.target(*at);
                log::trace!("resize {} → {width}×{height}", session.id);
                vec![EditorMutation::ResizeTo {
                    id: session.id,
                    width,
                    height: Height::Px(height),
                }]
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel { .. } => {
                log::debug!("resize end {}", session.id);
                self.session = None;
                vec![]
            }
            InputEvent::PointerDown { .. } => vec![],
        }
    }

    fn cancel(&mut self) {
        self.session = None;
    }
}
