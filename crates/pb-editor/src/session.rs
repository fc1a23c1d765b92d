//! Editor session: the context every handler runs against.
//!
//! Owns the document, the current selection, the panel values for that
//! selection, both gesture controllers and the history. Hosts own one
//! session and pass events in; nothing here is global.
//!
//! Handlers return `true` when the live view needs re-rendering.

use crate::commands::CommandStack;
use crate::document::{CanvasDocument, EditorMutation};
use crate::gesture::{DragController, Gesture, ResizeController};
use crate::input::{InputEvent, PointerId};
use crate::panel::{self, PanelField, PanelValues};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use kurbo::Point;
use pb_core::ElementId;
use pb_core::model::{Canvas, CanvasConfig, CanvasElement};
use pb_core::snapshot::CanvasSnapshot;
use pb_render::export::{ExportOptions, export_document};
use pb_render::hit::{HitPart, hit_test};

#[derive(Debug, Default)]
pub struct EditorSession {
    pub doc: CanvasDocument,
    selection: Option<ElementId>,
    /// Values shown by the property panel; `None` hides it.
    panel: Option<PanelValues>,
    drag: DragController,
    resize: ResizeController,
    history: CommandStack,
    pub export_options: ExportOptions,
}

impl EditorSession {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            doc: CanvasDocument::new(config),
            ..Default::default()
        }
    }

    pub fn from_snapshot(snapshot: CanvasSnapshot) -> Self {
        Self {
            doc: CanvasDocument::from_snapshot(snapshot),
            ..Default::default()
        }
    }

    /// Replace the document with a snapshot. History and selection are
    /// reset; the ID counter keeps moving forward.
    pub fn load_snapshot(&mut self, snapshot: CanvasSnapshot) {
        self.cancel_gestures();
        let issued = self.doc.factory.next_id();
        self.doc = CanvasDocument::from_snapshot(snapshot);
        self.doc.factory.reserve(issued);
        self.history.clear();
        self.selection = None;
        self.panel = None;
        log::info!("loaded snapshot with {} element(s)", self.doc.canvas.len());
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        self.doc.snapshot()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.doc.canvas
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    pub fn selected_element(&self) -> Option<&CanvasElement> {
        self.selection.and_then(|id| self.doc.canvas.get(id))
    }

    pub fn panel(&self) -> Option<&PanelValues> {
        self.panel.as_ref()
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    pub fn is_gesturing(&self) -> bool {
        self.drag.is_active() || self.resize.is_active()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn resize(&self) -> &ResizeController {
        &self.resize
    }

    // ─── Palette ─────────────────────────────────────────────────────────

    /// Click placement: create at the default position and select.
    pub fn place(&mut self, kind: &str) -> ElementId {
        let element = self.doc.factory.create(kind);
        self.insert_new(element)
    }

    /// Drop placement: create at the drop point and select.
    pub fn place_at(&mut self, kind: &str, at: Point) -> ElementId {
        let element = self.doc.factory.create_at(kind, at);
        self.insert_new(element)
    }

    fn insert_new(&mut self, element: CanvasElement) -> ElementId {
        let id = element.id;
        let description = format!("Place {}", element.kind);
        self.history.execute(
            &mut self.doc,
            EditorMutation::Insert {
                element: Box::new(element),
                index: None,
            },
            &description,
        );
        self.select(Some(id));
        id
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select an element, or clear the selection with `None`. IDs not on
    /// the canvas count as `None`. Re-selecting only re-syncs the panel.
    /// Returns `true` if the selection changed.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        let id = id.filter(|id| self.doc.canvas.contains(*id));
        let changed = self.selection != id;
        self.selection = id;
        self.sync_panel();
        if changed {
            log::debug!("selection → {id:?}");
        }
        changed
    }

    /// Select by the `data-id` string hosts see in the live view.
    pub fn select_by_id(&mut self, id: &str) -> bool {
        let found = self
            .doc
            .canvas
            .iter()
            .find(|el| el.id.as_str() == id)
            .map(|el| el.id);
        self.select(found)
    }

    fn sync_panel(&mut self) {
        self.panel = self.selected_element().map(panel::read_element);
    }

    /// Drop a selection that no longer exists (after undo, delete, load).
    fn revalidate(&mut self) {
        if let Some(id) = self.selection
            && !self.doc.canvas.contains(id)
        {
            self.selection = None;
        }
        self.sync_panel();
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { pointer_id, at } => self.pointer_down(pointer_id, at),
            InputEvent::PointerMove { pointer_id, at } => self.pointer_move(pointer_id, at),
            InputEvent::PointerUp { pointer_id, at } => self.pointer_up(pointer_id, at),
            InputEvent::PointerCancel { pointer_id } => self.pointer_cancel(pointer_id),
        }
    }

    /// Select what is under the pointer and open a drag (body) or resize
    /// (handle) session on it. Empty canvas clears the selection. While a
    /// gesture is open, further presses are ignored so a second pointer
    /// cannot move the selection out from under it.
    pub fn pointer_down(&mut self, pointer_id: PointerId, at: Point) -> bool {
        if self.is_gesturing() {
            log::debug!("pointer {pointer_id} pressed during an open gesture, ignored");
            return false;
        }
        let Some(hit) = hit_test(&self.doc.canvas, at) else {
            return self.select(None);
        };
        let changed = self.select(Some(hit.id));
        let Some(element) = self.doc.canvas.get(hit.id) else {
            return changed;
        };
        let started = match hit.part {
            HitPart::Body => self.drag.begin(element, pointer_id, at),
            HitPart::ResizeHandle => self.resize.begin(element, pointer_id, at),
        };
        if started {
            self.history.begin_batch(&self.doc);
        }
        changed
    }

    pub fn pointer_move(&mut self, pointer_id: PointerId, at: Point) -> bool {
        let event = InputEvent::PointerMove { pointer_id, at };
        let mut mutations = self.drag.handle(&event);
        mutations.extend(self.resize.handle(&event));
        let mut changed = false;
        for mutation in mutations {
            changed |= self.history.execute(&mut self.doc, mutation, "gesture");
        }
        if changed {
            self.sync_panel();
        }
        changed
    }

    /// Close whichever session this pointer opened. The whole gesture
    /// becomes one undo step.
    pub fn pointer_up(&mut self, pointer_id: PointerId, at: Point) -> bool {
        let event = InputEvent::PointerUp { pointer_id, at };
        let mut ended = false;
        if self.drag.pointer_id() == Some(pointer_id) {
            self.drag.handle(&event);
            self.history.end_batch(&self.doc, "Move element");
            ended = true;
        }
        if self.resize.pointer_id() == Some(pointer_id) {
            self.resize.handle(&event);
            self.history.end_batch(&self.doc, "Resize element");
            ended = true;
        }
        ended
    }

    /// `pointercancel` for a pointer that owns a session rolls back every
    /// open gesture.
    pub fn pointer_cancel(&mut self, pointer_id: PointerId) -> bool {
        if self.drag.pointer_id() == Some(pointer_id) || self.resize.pointer_id() == Some(pointer_id)
        {
            return self.cancel_gestures();
        }
        false
    }

    /// Drop any open drag or resize session and restore the pre-gesture
    /// state without recording history. Hosts call this on blur.
    pub fn cancel_gestures(&mut self) -> bool {
        if !self.is_gesturing() {
            return false;
        }
        log::debug!("cancelling open gestures");
        self.drag.cancel();
        self.resize.cancel();
        self.history.cancel_batch(&mut self.doc);
        self.revalidate();
        true
    }

    // ─── Panel ───────────────────────────────────────────────────────────

    /// Write one panel field to the selected element. Without a selection
    /// this is a silent no-op.
    pub fn apply_field(&mut self, field: PanelField, value: &str) -> bool {
        let Some(element) = self.selected_element() else {
            return false;
        };
        let Some(mutation) = panel::write_field(element, field, value) else {
            return false;
        };
        let changed = self
            .history
            .execute(&mut self.doc, mutation, &format!("Edit {}", field.name()));
        self.sync_panel();
        changed
    }

    /// `apply_field` by input name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        match PanelField::from_name(name) {
            Some(field) => self.apply_field(field, value),
            None => {
                log::debug!("unknown panel field {name:?}");
                false
            }
        }
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Remove the selected element and clear the selection.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection else {
            return false;
        };
        self.cancel_gestures();
        let changed = self
            .history
            .execute(&mut self.doc, EditorMutation::Remove { id }, "Delete element");
        self.select(None);
        changed
    }

    /// Remove every element.
    pub fn clear(&mut self) -> bool {
        self.cancel_gestures();
        let count = self.doc.canvas.len();
        let changed = self.history.execute(
            &mut self.doc,
            EditorMutation::ReplaceAll { elements: vec![] },
            "Clear canvas",
        );
        if changed {
            log::info!("cleared {count} element(s)");
        }
        self.select(None);
        changed
    }

    fn set_z(&mut self, z_index: impl FnOnce(&Canvas, &CanvasElement) -> i32, description: &str) -> bool {
        let Some(element) = self.selected_element() else {
            return false;
        };
        let id = element.id;
        let z_index = z_index(&self.doc.canvas, element);
        let changed = self
            .history
            .execute(&mut self.doc, EditorMutation::SetZIndex { id, z_index }, description);
        self.sync_panel();
        changed
    }

    pub fn bring_forward(&mut self) -> bool {
        self.set_z(|_, el| el.z_index.saturating_add(1), "Bring forward")
    }

    /// z-index never goes below 0, so elements stay above the canvas
    /// background.
    pub fn send_backward(&mut self) -> bool {
        self.set_z(|_, el| (el.z_index - 1).max(0), "Send backward")
    }

    pub fn bring_to_front(&mut self) -> bool {
        self.set_z(
            |canvas, el| {
                let top = canvas
                    .iter()
                    .filter(|other| other.id != el.id)
                    .map(|other| other.z_index)
                    .max();
                match top {
                    Some(top) if top >= el.z_index => top.saturating_add(1),
                    _ => el.z_index,
                }
            },
            "Bring to front",
        )
    }

    /// Paint below every other element. When the others already sit on the
    /// z-index floor they are lifted instead, all in one undo step.
    pub fn send_to_back(&mut self) -> bool {
        let Some(element) = self.selected_element() else {
            return false;
        };
        let id = element.id;
        if self.doc.canvas.paint_order().first().map(|e| e.id) == Some(id) {
            return false;
        }
        let Some(bottom) = self
            .doc
            .canvas
            .iter()
            .filter(|other| other.id != id)
            .map(|other| other.z_index)
            .min()
        else {
            return false;
        };
        if bottom > 0 {
            return self.set_z(|_, _| bottom - 1, "Send to back");
        }

        let lift = 1 - bottom;
        let lifted: Vec<(ElementId, i32)> = self
            .doc
            .canvas
            .iter()
            .filter(|other| other.id != id)
            .map(|other| (other.id, other.z_index.saturating_add(lift)))
            .collect();
        self.history.begin_batch(&self.doc);
        let mut changed = self.history.execute(
            &mut self.doc,
            EditorMutation::SetZIndex { id, z_index: 0 },
            "Send to back",
        );
        for (other, z_index) in lifted {
            changed |= self.history.execute(
                &mut self.doc,
                EditorMutation::SetZIndex { id: other, z_index },
                "Send to back",
            );
        }
        self.history.end_batch(&self.doc, "Send to back");
        self.sync_panel();
        changed
    }

    pub fn undo(&mut self) -> bool {
        let Some(desc) = self.history.undo(&mut self.doc) else {
            return false;
        };
        log::debug!("undo: {desc}");
        self.revalidate();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(desc) = self.history.redo(&mut self.doc) else {
            return false;
        };
        log::debug!("redo: {desc}");
        self.revalidate();
        true
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Route a key event. While focus is in an editable text field every
    /// shortcut is left to the field.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        editing_text: bool,
    ) -> bool {
        if editing_text {
            return false;
        }
        match ShortcutMap::resolve(key, ctrl, shift, alt, meta) {
            Some(action) => self.dispatch(action),
            None => false,
        }
    }

    pub fn dispatch(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::ClearAll => self.clear(),
            ShortcutAction::SendBackward => self.send_backward(),
            ShortcutAction::BringForward => self.bring_forward(),
            ShortcutAction::SendToBack => self.send_to_back(),
            ShortcutAction::BringToFront => self.bring_to_front(),
            ShortcutAction::Deselect => self.select(None),
        }
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Live editor markup with selection and handles.
    pub fn render_live(&self) -> String {
        pb_render::render_live(&self.doc.canvas, self.selection)
    }

    /// Standalone export document.
    pub fn export_html(&self) -> String {
        export_document(&self.doc.canvas, &self.export_options)
    }
}
