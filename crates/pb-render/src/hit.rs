//! Hit testing: canvas point → element and part.
//!
//! Walks elements in reverse paint order (front-to-back) and reports the
//! first one whose bounds contain the point. The resize handle sits on top
//! of its element, so it is checked before the body.

use kurbo::{Point, Rect};
use pb_core::ElementId;
use pb_core::model::{Canvas, CanvasElement};
use crate::layout::rendered_height;

/// Side of the square resize handle at an element's bottom-right corner.
pub const HANDLE_SIZE: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: ElementId,
    pub part: HitPart,
}

/// Rendered bounds of an element in canvas coordinates.
pub fn element_bounds(element: &CanvasElement) -> Rect {
    Rect::from_origin_size(
        element.position,
        (element.width, rendered_height(element)),
    )
}

/// Bounds of an element's resize handle.
pub fn handle_bounds(element: &CanvasElement) -> Rect {
    let b = element_bounds(element);
    Rect::new(b.x1 - HANDLE_SIZE, b.y1 - HANDLE_SIZE, b.x1, b.y1)
}

/// Edges are inclusive, matching how the pointer lands on a border pixel.
fn contains(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// Find the topmost element at `point`. Returns `None` on empty canvas.
pub fn hit_test(canvas: &Canvas, point: Point) -> Option<Hit> {
    for element in canvas.paint_order().into_iter().rev() {
        if contains(handle_bounds(element), point) {
            return Some(Hit {
                id: element.id,
                part: HitPart::ResizeHandle,
            });
        }
        if contains(element_bounds(element), point) {
            return Some(Hit {
                id: element.id,
                part: HitPart::Body,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::model::Height;
    use pb_core::prefab::ElementFactory;

    fn canvas_with_overlap() -> (Canvas, ElementId, ElementId) {
        let mut factory = ElementFactory::new();
        let mut canvas = Canvas::default();
        let mut back = factory.create("card");
        back.position = Point::new(0.0, 0.0);
        back.width = 200.0;
        back.height = Height::Px(200.0);
        back.z_index = 5;
        let mut front = factory.create("button");
        front.position = Point::new(100.0, 100.0);
        front.width = 200.0;
        front.height = Height::Px(100.0);
        front.z_index = 1;
        let (b, f) = (back.id, front.id);
        canvas.insert(back);
        canvas.insert(front);
        (canvas, b, f)
    }

    #[test]
    fn higher_z_wins_over_document_order() {
        let (canvas, back, _) = canvas_with_overlap();
        let hit = hit_test(&canvas, Point::new(150.0, 150.0)).unwrap();
        assert_eq!(hit.id, back);
        assert_eq!(hit.part, HitPart::Body);
    }

    #[test]
    fn handle_hit_at_bottom_right() {
        let (canvas, _, front) = canvas_with_overlap();
        let hit = hit_test(&canvas, Point::new(295.0, 195.0)).unwrap();
        assert_eq!(
            hit,
            Hit {
                id: front,
                part: HitPart::ResizeHandle
            }
        );
    }

    #[test]
    fn background_misses() {
        let (canvas, _, _) = canvas_with_overlap();
        assert_eq!(hit_test(&canvas, Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn auto_height_uses_laid_out_size() {
        let mut factory = ElementFactory::new();
        let nav = factory.create("nav");
        let b = element_bounds(&nav);
        assert_eq!(b.height(), 59.0);
        assert_eq!(b.width(), 320.0);
    }
}
