use pb_core::model::Height;
use pb_core::snapshot::CanvasSnapshot;
use pb_core::{ElementId, Point};
use pb_editor::{EditorSession, PanelField};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn position(session: &EditorSession, id: ElementId) -> Point {
    session.canvas().get(id).unwrap().position
}

fn fixture() -> CanvasSnapshot {
    let json = include_str!("fixtures/landing.json");
    CanvasSnapshot::from_json(json).unwrap()
}

// ─── Factory ─────────────────────────────────────────────────────────────

#[test]
fn every_placement_gets_a_fresh_id() {
    let mut session = EditorSession::default();
    let mut seen = HashSet::new();
    for kind in ["hero", "nav", "card", "button", "image", "carousel", "card"] {
        assert!(seen.insert(session.place(kind)));
    }
    assert_eq!(session.canvas().len(), 7);
}

#[test]
fn undone_placement_does_not_free_its_id() {
    let mut session = EditorSession::default();
    let first = session.place("card");
    assert!(session.undo());
    assert!(session.canvas().is_empty());
    let second = session.place("card");
    assert_ne!(first, second);
    assert_eq!(second.as_str(), "el_2");
}

#[test]
fn drop_placement_uses_drop_point() {
    let mut session = EditorSession::default();
    let id = session.place_at("button", p(300.0, 180.0));
    assert_eq!(position(&session, id), p(300.0, 180.0));
    assert_eq!(session.selection(), Some(id));
}

// ─── Selection ───────────────────────────────────────────────────────────

#[test]
fn only_the_latest_selection_is_marked() {
    let mut session = EditorSession::default();
    let a = session.place("card");
    let b = session.place_at("nav", p(400.0, 20.0));
    assert!(session.select(Some(a)));
    assert!(session.select(Some(b)));
    let html = session.render_live();
    assert_eq!(html.matches("pf-el selected").count(), 1);
    assert!(html.contains("class=\"pf-el selected pf pf-nav\" data-id=\"el_2\""));

    // Re-selecting is only a re-sync.
    assert!(!session.select(Some(b)));
    assert_eq!(session.panel().unwrap().id, "el_2");
}

#[test]
fn clicking_empty_canvas_clears_selection() {
    let mut session = EditorSession::default();
    session.place("card");
    assert!(session.pointer_down(1, p(900.0, 600.0)));
    assert_eq!(session.selection(), None);
    assert!(session.panel().is_none());
}

#[test]
fn delete_clears_selection_and_panel() {
    let mut session = EditorSession::default();
    let id = session.place("hero");
    assert!(session.delete_selected());
    assert!(!session.canvas().contains(id));
    assert_eq!(session.selection(), None);
    assert!(session.panel().is_none());
    // Nothing selected: deleting again is a no-op.
    assert!(!session.delete_selected());
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[test]
fn drag_moves_by_pointer_delta_and_syncs_panel() {
    let mut session = EditorSession::default();
    let id = session.place("card");
    session.pointer_down(1, p(100.0, 100.0));
    assert!(session.drag().session().is_some());
    assert!(session.pointer_move(1, p(150.0, 130.0)));
    assert_eq!(position(&session, id), p(70.0, 50.0));
    let panel = session.panel().unwrap();
    assert_eq!((panel.x, panel.y), (70, 50));
    assert!(session.pointer_up(1, p(150.0, 130.0)));
    assert!(!session.is_gesturing());
}

#[test]
fn drag_clamps_at_canvas_origin() {
    let mut session = EditorSession::default();
    let id = session.place("card");
    session.pointer_down(1, p(100.0, 100.0));
    session.pointer_move(1, p(10.0, 150.0));
    assert_eq!(position(&session, id), p(0.0, 70.0));
    session.pointer_move(1, p(-400.0, -400.0));
    assert_eq!(position(&session, id), p(0.0, 0.0));
}

#[test]
fn foreign_pointer_events_are_ignored() {
    let mut session = EditorSession::default();
    let id = session.place("card");
    session.pointer_down(1, p(100.0, 100.0));
    assert!(!session.pointer_move(2, p(300.0, 300.0)));
    assert!(!session.pointer_up(2, p(300.0, 300.0)));
    assert_eq!(position(&session, id), p(20.0, 20.0));
    assert!(session.is_gesturing());
}

#[test]
fn second_pointer_cannot_steal_the_selection() {
    let mut session = EditorSession::default();
    let a = session.place("card");
    let b = session.place_at("card", p(400.0, 20.0));
    assert!(session.pointer_down(1, p(100.0, 100.0)));
    assert_eq!(session.selection(), Some(a));

    assert!(!session.pointer_down(2, p(450.0, 60.0)));
    assert_eq!(session.selection(), Some(a));
    assert_eq!(session.panel().unwrap().id, a.as_str());
    assert!(!session.pointer_move(2, p(500.0, 80.0)));
    assert_eq!(position(&session, b), p(400.0, 20.0));

    assert!(session.pointer_move(1, p(110.0, 100.0)));
    assert_eq!(position(&session, a), p(30.0, 20.0));
}

#[test]
fn undo_after_drag_is_one_step() {
    let mut session = EditorSession::default();
    let id = session.place("card");
    session.pointer_down(1, p(100.0, 100.0));
    for step in 1..=10 {
        session.pointer_move(1, p(100.0 + step as f64 * 5.0, 100.0));
    }
    session.pointer_up(1, p(150.0, 100.0));
    assert_eq!(position(&session, id), p(70.0, 20.0));

    assert!(session.undo());
    assert_eq!(position(&session, id), p(20.0, 20.0));
    assert!(session.redo());
    assert_eq!(position(&session, id), p(70.0, 20.0));
}

#[test]
fn cancelled_gesture_leaves_no_trace() {
    let mut session = EditorSession::default();
    let id = session.place("card");
    session.pointer_down(1, p(100.0, 100.0));
    session.pointer_move(1, p(300.0, 300.0));
    assert!(session.cancel_gestures());
    assert_eq!(position(&session, id), p(20.0, 20.0));
    // The only history entry left is the placement.
    assert!(session.undo());
    assert!(session.canvas().is_empty());
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[test]
fn resize_from_handle_with_floors() {
    let mut session = EditorSession::default();
    let id = session.place("card");
    // Card renders at 320 × 96 from (20, 20); handle is the bottom-right 12px.
    session.pointer_down(4, p(335.0, 111.0));
    assert!(session.resize().session().is_some());
    assert!(session.drag().session().is_none());

    session.pointer_move(4, p(135.0, 75.0));
    let el = session.canvas().get(id).unwrap();
    assert_eq!((el.width, el.height), (120.0, Height::Px(60.0)));

    session.pointer_move(4, p(-500.0, -500.0));
    let el = session.canvas().get(id).unwrap();
    assert_eq!((el.width, el.height), (40.0, Height::Px(20.0)));
    assert_eq!(el.position, p(20.0, 20.0));

    session.pointer_up(4, p(-500.0, -500.0));
    let panel = session.panel().unwrap();
    assert_eq!((panel.width, panel.height), (40, 20));
}

#[test]
fn clicks_follow_the_rendered_card_height() {
    let mut session = EditorSession::default();
    let id = session.place("card");
    // The card's content lays out to 96px, so y = 150 is empty canvas.
    assert_eq!(session.panel().unwrap().height, 96);
    assert!(session.pointer_down(1, p(100.0, 150.0)));
    assert_eq!(session.selection(), None);
    assert!(!session.is_gesturing());

    // The drawn handle at the bottom-right corner starts a resize.
    assert!(session.pointer_down(2, p(335.0, 112.0)));
    assert_eq!(session.selection(), Some(id));
    assert!(session.resize().session().is_some());
    assert!(session.drag().session().is_none());
}

// ─── Z-order ─────────────────────────────────────────────────────────────

#[test]
fn send_to_back_from_a_floor_tie_paints_first() {
    let mut session = EditorSession::default();
    let a = session.place("card");
    assert!(session.set_field("zIndex", "-5"));
    let b = session.place_at("card", p(60.0, 60.0));
    assert!(session.set_field("zIndex", "0"));
    assert_eq!(session.panel().unwrap().z_index, 0);
    assert_eq!(session.canvas().get(a).unwrap().z_index, 0);

    // Tied at 0, b paints over a by document order.
    assert!(session.send_to_back());
    let order: Vec<ElementId> = session.canvas().paint_order().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![b, a]);
    assert_eq!(session.canvas().get(b).unwrap().z_index, 0);
    assert_eq!(session.canvas().get(a).unwrap().z_index, 1);
    assert!(!session.send_to_back());

    // One undo step restores the tie.
    assert!(session.undo());
    let order: Vec<ElementId> = session.canvas().paint_order().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![a, b]);
}

// ─── Panel ───────────────────────────────────────────────────────────────

#[test]
fn panel_writes_without_selection_are_silent() {
    let mut session = EditorSession::default();
    session.place("card");
    session.select(None);
    assert!(!session.apply_field(PanelField::Width, "500"));
    assert!(!session.set_field("background", "#ff0000"));
}

#[test]
fn text_color_cascades_to_text_nodes() {
    let mut session = EditorSession::default();
    let id = session.place("hero");
    assert!(session.set_field("textColor", "#ff0000"));
    assert_eq!(session.panel().unwrap().text_color, "#ff0000");

    let el = session.canvas().get(id).unwrap();
    let styles = pb_render::style::compute_element(el);
    for idx in std::iter::once(el.content.root).chain(el.content.descendants(el.content.root)) {
        if let Some(data) = el.content.element(idx) {
            assert_eq!(
                styles[&idx].get("color").as_deref(),
                Some("rgb(255, 0, 0)"),
                "<{}> missed the cascade",
                data.tag
            );
        }
    }
}

#[test]
fn text_field_edits_editable_node() {
    let mut session = EditorSession::default();
    let id = session.place("nav");
    assert!(session.apply_field(PanelField::Text, "Acme"));
    assert_eq!(session.doc.text_of(id).as_deref(), Some("Acme"));
    assert!(session.render_live().contains(">Acme</span>"));
}

#[test]
fn unparseable_input_changes_nothing() {
    let mut session = EditorSession::default();
    session.place("card");
    let before = session.panel().cloned();
    assert!(!session.set_field("fontSize", "huge"));
    assert!(!session.set_field("nonsense", "1"));
    assert_eq!(session.panel().cloned(), before);
}

// ─── Keyboard & history ──────────────────────────────────────────────────

#[test]
fn keyboard_delete_and_undo() {
    let mut session = EditorSession::default();
    let id = session.place("image");
    assert!(session.handle_key("Backspace", false, false, false, false, false));
    assert!(!session.canvas().contains(id));
    assert!(session.handle_key("z", true, false, false, false, false));
    assert!(session.canvas().contains(id));
    // Undo does not restore the selection it removed.
    assert_eq!(session.selection(), None);
}

#[test]
fn clear_is_undoable() {
    let mut session = EditorSession::default();
    session.place("hero");
    session.place("card");
    assert!(session.handle_key("Delete", false, false, false, true, false));
    assert!(session.canvas().is_empty());
    assert!(session.undo());
    assert_eq!(session.canvas().len(), 2);
}

// ─── Snapshots & export ──────────────────────────────────────────────────

#[test]
fn fixture_loads_and_continues_numbering() {
    let mut session = EditorSession::from_snapshot(fixture());
    assert_eq!(session.canvas().len(), 3);
    assert_eq!(session.canvas().config.width, 1200.0);
    let id = session.place("button");
    assert_eq!(id.as_str(), "el_4");
}

#[test]
fn fixture_export_keeps_order_and_offsets() {
    let session = EditorSession::from_snapshot(fixture());
    let html = session.export_html();
    let nav = html.find("<nav").unwrap();
    let hero = html.find("<section").unwrap();
    let card = html.find("<div class=\"pf pf-card\"").unwrap();
    assert!(nav < hero && hero < card);
    assert!(html.contains("left: 40px; top: 96px"));
    assert!(html.contains("left: 720px; top: 96px"));
    assert!(html.contains("color: rgb(255, 255, 255)"));
    assert!(html.contains("padding: 48px"));
    assert!(!html.contains("pf-handle"));
    assert!(!html.contains("contenteditable"));
}

#[test]
fn snapshot_json_reloads_identically() {
    let mut session = EditorSession::default();
    session.place("hero");
    session.set_field("padding", "24");
    let json = session.snapshot().to_json().unwrap();
    let reloaded = EditorSession::from_snapshot(CanvasSnapshot::from_json(&json).unwrap());
    assert_eq!(reloaded.export_html(), session.export_html());
}
