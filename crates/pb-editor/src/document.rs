//! The editable document and the mutations it accepts.
//!
//! Every change to the record set goes through `apply_mutation`, so the
//! command stack can compute inverses and the session can re-sync the
//! panel after any edit, whatever its source (gesture, panel, keyboard,
//! undo).

use kurbo::Point;
use pb_core::model::{Canvas, CanvasConfig, CanvasElement, Height, StyleOverrides};
use pb_core::prefab::ElementFactory;
use pb_core::snapshot::CanvasSnapshot;
use pb_core::{ElementId, Result};

/// A single change to the record set.
#[derive(Debug, Clone)]
pub enum EditorMutation {
    /// Insert an element, at the end of document order unless `index` is
    /// given.
    Insert {
        element: Box<CanvasElement>,
        index: Option<usize>,
    },
    Remove {
        id: ElementId,
    },
    MoveTo {
        id: ElementId,
        position: Point,
    },
    ResizeTo {
        id: ElementId,
        width: f64,
        height: Height,
    },
    SetZIndex {
        id: ElementId,
        z_index: i32,
    },
    SetOverrides {
        id: ElementId,
        overrides: StyleOverrides,
    },
    /// Replace the text of the element's editable text node.
    SetText {
        id: ElementId,
        text: String,
    },
    /// Replace every element at once (clear, bulk load).
    ReplaceAll {
        elements: Vec<CanvasElement>,
    },
}

/// Canvas records plus the factory that issues their IDs.
#[derive(Debug, Clone, Default)]
pub struct CanvasDocument {
    pub canvas: Canvas,
    pub factory: ElementFactory,
}

impl CanvasDocument {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            canvas: Canvas::new(config),
            factory: ElementFactory::new(),
        }
    }

    pub fn from_snapshot(snapshot: CanvasSnapshot) -> Self {
        let factory = ElementFactory::resume_from(snapshot.safe_next_id());
        Self {
            canvas: snapshot.into_canvas(),
            factory,
        }
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot::capture(&self.canvas, self.factory.next_id())
    }

    /// Compact binary form for history entries.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.snapshot().to_bytes()
    }

    /// Restore records from `encode` output. The ID counter only ever moves
    /// forward, so IDs issued after the snapshot are not reissued.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<()> {
        let snapshot = CanvasSnapshot::from_bytes(bytes)?;
        self.factory.reserve(snapshot.safe_next_id());
        self.canvas = snapshot.into_canvas();
        Ok(())
    }

    /// Apply a mutation. Returns `true` if the record set changed.
    pub fn apply_mutation(&mut self, mutation: EditorMutation) -> bool {
        match mutation {
            EditorMutation::Insert { element, index } => {
                if self.canvas.contains(element.id) {
                    log::warn!("insert of existing element {}", element.id);
                    return false;
                }
                match index {
                    Some(i) => self.canvas.insert_at(i, *element),
                    None => self.canvas.insert(*element),
                }
                true
            }
            EditorMutation::Remove { id } => self.canvas.remove(id).is_some(),
            EditorMutation::MoveTo { id, position } => {
                let Some(el) = self.canvas.get_mut(id) else {
                    return false;
                };
                let position = Point::new(position.x.max(0.0), position.y.max(0.0));
                if el.position == position {
                    return false;
                }
                el.position = position;
                true
            }
            EditorMutation::ResizeTo { id, width, height } => {
                let Some(el) = self.canvas.get_mut(id) else {
                    return false;
                };
                if el.width == width && el.height == height {
                    return false;
                }
                el.width = width;
                el.height = height;
                true
            }
            EditorMutation::SetZIndex { id, z_index } => {
                let Some(el) = self.canvas.get_mut(id) else {
                    return false;
                };
                if el.z_index == z_index {
                    return false;
                }
                el.z_index = z_index;
                true
            }
            EditorMutation::SetOverrides { id, overrides } => {
                let Some(el) = self.canvas.get_mut(id) else {
                    return false;
                };
                if el.overrides == overrides {
                    return false;
                }
                el.overrides = overrides;
                true
            }
            EditorMutation::SetText { id, text } => {
                let Some(el) = self.canvas.get_mut(id) else {
                    return false;
                };
                let target = el.content.text_target();
                el.content.set_text(target, &text)
            }
            EditorMutation::ReplaceAll { elements } => {
                let config = self.canvas.config;
                let was_empty = self.canvas.is_empty();
                self.canvas = Canvas::from_elements(config, elements);
                !(was_empty && self.canvas.is_empty())
            }
        }
    }

    /// Current text of an element's editable node.
    pub fn text_of(&self, id: ElementId) -> Option<String> {
        let el = self.canvas.get(id)?;
        Some(el.content.text_content(el.content.text_target()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_clamps_at_origin() {
        let mut doc = CanvasDocument::default();
        let el = doc.factory.create("card");
        let id = el.id;
        doc.apply_mutation(EditorMutation::Insert {
            element: Box::new(el),
            index: None,
        });
        assert!(doc.apply_mutation(EditorMutation::MoveTo {
            id,
            position: Point::new(-5.0, 30.0),
        }));
        assert_eq!(doc.canvas.get(id).unwrap().position, Point::new(0.0, 30.0));
        // Same target again is a no-op.
        assert!(!doc.apply_mutation(EditorMutation::MoveTo {
            id,
            position: Point::new(0.0, 30.0),
        }));
    }

    #[test]
    fn restore_never_rewinds_counter() {
        let mut doc = CanvasDocument::default();
        let first = doc.factory.create("nav");
        doc.canvas.insert(first);
        let bytes = doc.encode().unwrap();
        for _ in 0..3 {
            let el = doc.factory.create("button");
            doc.canvas.insert(el);
        }
        doc.restore(&bytes).unwrap();
        assert_eq!(doc.canvas.len(), 1);
        assert_eq!(doc.factory.next_id(), 5);
    }

    #[test]
    fn mutations_on_missing_ids_are_noops() {
        let mut doc = CanvasDocument::default();
        let ghost = ElementId::intern("el_999");
        assert!(!doc.apply_mutation(EditorMutation::Remove { id: ghost }));
        assert!(!doc.apply_mutation(EditorMutation::SetZIndex { id: ghost, z_index: 3 }));
    }
}
