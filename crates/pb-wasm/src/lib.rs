//! WASM bridge for Prefab Builder: exposes the editor session to the
//! browser host.
//!
//! Compiled via `wasm-pack build --target web`. The host page owns one
//! `PrefabCanvas`, forwards pointer, keyboard and panel events to it and
//! re-renders the live view whenever a call returns `true`.

use pb_core::model::{CanvasConfig, PrefabKind};
use pb_core::snapshot::CanvasSnapshot;
use pb_core::{ElementId, Point};
use pb_editor::{EditorSession, ShortcutAction, ShortcutMap};
use wasm_bindgen::prelude::*;

/// The main WASM-facing canvas controller.
///
/// Wraps one `EditorSession`. All interaction from the page goes through
/// this struct; nothing is kept in JS-side globals.
#[wasm_bindgen]
pub struct PrefabCanvas {
    session: EditorSession,
}

#[wasm_bindgen]
impl PrefabCanvas {
    /// Create an empty canvas of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();

        let config = CanvasConfig {
            width,
            height,
            ..CanvasConfig::default()
        };
        Self {
            session: EditorSession::new(config),
        }
    }

    // ─── Palette ─────────────────────────────────────────────────────────

    /// Click placement at the default position. Returns the new element id.
    pub fn place(&mut self, kind: &str) -> String {
        self.session.place(kind).as_str().to_string()
    }

    /// Drop placement at canvas coordinates. Returns the new element id.
    pub fn place_at(&mut self, kind: &str, x: f64, y: f64) -> String {
        self.session.place_at(kind, Point::new(x, y)).as_str().to_string()
    }

    // ─── Pointer API ─────────────────────────────────────────────────────

    /// Pointer down in canvas coordinates. Returns true if the view changed.
    pub fn handle_pointer_down(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.session.pointer_down(pointer_id, Point::new(x, y))
    }

    pub fn handle_pointer_move(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.session.pointer_move(pointer_id, Point::new(x, y))
    }

    pub fn handle_pointer_up(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.session.pointer_up(pointer_id, Point::new(x, y))
    }

    pub fn handle_pointer_cancel(&mut self, pointer_id: i32) -> bool {
        self.session.pointer_cancel(pointer_id)
    }

    /// Drop any open drag or resize without recording history. Hosts call
    /// this on window blur.
    pub fn cancel_gestures(&mut self) -> bool {
        self.session.cancel_gestures()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select by id; an empty string clears the selection.
    pub fn select_by_id(&mut self, element_id: &str) -> bool {
        if element_id.is_empty() {
            return self.session.select(None);
        }
        self.session.select_by_id(element_id)
    }

    /// Id of the selected element, or an empty string.
    pub fn get_selected_id(&self) -> String {
        self.session
            .selection()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    // ─── Properties Panel API ────────────────────────────────────────────

    /// Panel values for the selection as JSON, or `null` when the panel
    /// should be hidden.
    pub fn panel_json(&self) -> String {
        match self.session.panel() {
            Some(values) => serde_json::to_string(values).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }

    /// Write one panel field by its input name (`width`, `textColor`, ...).
    /// Returns true if the element changed.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        self.session.set_field(name, value)
    }

    // ─── Commands ────────────────────────────────────────────────────────

    pub fn delete_selected(&mut self) -> bool {
        self.session.delete_selected()
    }

    pub fn clear(&mut self) -> bool {
        self.session.clear()
    }

    pub fn bring_forward(&mut self) -> bool {
        self.session.bring_forward()
    }

    pub fn send_backward(&mut self) -> bool {
        self.session.send_backward()
    }

    pub fn bring_to_front(&mut self) -> bool {
        self.session.bring_to_front()
    }

    pub fn send_to_back(&mut self) -> bool {
        self.session.send_to_back()
    }

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.session.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.history().can_redo()
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool, "action":"<action_name>"}`
    ///
    /// `editing_text` is true while focus sits in an editable text node or
    /// a panel input; every shortcut is then left to the field.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        editing_text: bool,
    ) -> String {
        let action = match ShortcutMap::resolve(key, ctrl, shift, alt, meta) {
            Some(a) if !editing_text => a,
            _ => return r#"{"changed":false,"action":"none"}"#.to_string(),
        };
        let changed = self.session.dispatch(action);
        let action_name = action_to_name(action);
        let c = if changed { "true" } else { "false" };
        format!(r#"{{"changed":{c},"action":"{action_name}"}}"#)
    }

    // ─── Views ───────────────────────────────────────────────────────────

    /// Live editor markup: styles plus the canvas container with selection
    /// outline and resize handles.
    pub fn render_html(&self) -> String {
        self.session.render_live()
    }

    /// Standalone export document.
    pub fn export_html(&self) -> String {
        self.session.export_html()
    }

    /// Open the export in a new browsing context via a blob URL.
    pub fn open_export(&self) -> Result<bool, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let parts = js_sys::Array::of1(&JsValue::from_str(&self.export_html()));
        let bag = web_sys::BlobPropertyBag::new();
        bag.set_type("text/html");
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &bag)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;
        Ok(window.open_with_url_and_target(&url, "_blank")?.is_some())
    }

    // ─── State ───────────────────────────────────────────────────────────

    /// The document as snapshot JSON, or an empty string on failure.
    pub fn state_json(&self) -> String {
        match self.session.snapshot().to_json() {
            Ok(json) => json,
            Err(e) => {
                log::warn!("snapshot encode failed: {e}");
                String::new()
            }
        }
    }

    /// Replace the document with snapshot JSON. Returns JSON:
    /// `{"ok":true}` or `{"ok":false,"error":"..."}`. On error the current
    /// document is untouched.
    pub fn load_state_json(&mut self, json: &str) -> String {
        match CanvasSnapshot::from_json(json) {
            Ok(snapshot) => {
                self.session.load_snapshot(snapshot);
                r#"{"ok":true}"#.to_string()
            }
            Err(e) => error_json(&e.to_string()),
        }
    }

    /// Number of placed elements.
    pub fn element_count(&self) -> usize {
        self.session.canvas().len()
    }

    /// Bounds of an element as JSON `{"x","y","width","height"}`, or an
    /// empty string if the id is unknown.
    pub fn get_element_bounds(&self, element_id: &str) -> String {
        let Some(rect) = self
            .session
            .canvas()
            .get(ElementId::intern(element_id))
            .map(pb_render::hit::element_bounds)
        else {
            return String::new();
        };
        serde_json::json!({
            "x": rect.x0,
            "y": rect.y0,
            "width": rect.width(),
            "height": rect.height(),
        })
        .to_string()
    }
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::ClearAll => "clearAll",
        ShortcutAction::SendBackward => "sendBackward",
        ShortcutAction::BringForward => "bringForward",
        ShortcutAction::SendToBack => "sendToBack",
        ShortcutAction::BringToFront => "bringToFront",
        ShortcutAction::Deselect => "deselect",
    }
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Prefab Builder WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// The palette as JSON: `[{"id":"hero"}, ...]` in display order.
#[wasm_bindgen]
pub fn palette_json() -> String {
    let entries: Vec<serde_json::Value> = PrefabKind::PALETTE
        .iter()
        .map(|kind| serde_json::json!({ "id": kind.as_str() }))
        .collect();
    serde_json::Value::Array(entries).to_string()
}

/// Export snapshot JSON straight to an HTML document. Returns JSON
/// `{"ok":true,"html":"..."}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn export_snapshot(json: &str) -> String {
    match CanvasSnapshot::from_json(json) {
        Ok(snapshot) => {
            let session = EditorSession::from_snapshot(snapshot);
            serde_json::json!({ "ok": true, "html": session.export_html() }).to_string()
        }
        Err(e) => error_json(&e.to_string()),
    }
}
