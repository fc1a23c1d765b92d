//! Input abstraction layer.
//!
//! Normalizes browser pointer events into an `InputEvent` enum consumed by
//! the gesture controllers. Coordinates are canvas-relative pixels.

use kurbo::Point;

/// `PointerEvent.pointerId`.
pub type PointerId = i32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown { pointer_id: PointerId, at: Point },

    PointerMove { pointer_id: PointerId, at: Point },

    /// Pointer released.
    PointerUp { pointer_id: PointerId, at: Point },

    /// The platform took the pointer away (`pointercancel`).
    PointerCancel { pointer_id: PointerId },
}

impl InputEvent {
    pub fn from_pointer_down(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self::PointerDown {
            pointer_id,
            at: Point::new(x, y),
        }
    }

    pub fn from_pointer_move(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self::PointerMove {
            pointer_id,
            at: Point::new(x, y),
        }
    }

    pub fn from_pointer_up(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self::PointerUp {
            pointer_id,
            at: Point::new(x, y),
        }
    }

    pub fn pointer_id(&self) -> PointerId {
        match self {
            Self::PointerDown { pointer_id, .. }
            | Self::PointerMove { pointer_id, .. }
            | Self::PointerUp { pointer_id, .. }
            | Self::PointerCancel { pointer_id } => *pointer_id,
        }
    }

    /// Extract position if this event carries one.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { at, .. }
            | Self::PointerMove { at, .. }
            | Self::PointerUp { at, .. } => Some(*at),
            Self::PointerCancel { .. } => None,
        }
    }
}
