use pb_core::model::{Canvas, Color, Height};
use pb_core::prefab::ElementFactory;
use pb_core::Point;
use pb_render::export::{ExportOptions, export_document, export_tree};
use pb_render::html::HtmlElement;
use pretty_assertions::assert_eq;

fn sample_canvas() -> Canvas {
    let mut factory = ElementFactory::new();
    let mut canvas = Canvas::default();
    for (kind, x, y) in [("hero", 10.0, 30.0), ("button", 400.0, 12.5), ("image", 0.0, 300.0)] {
        canvas.insert(factory.create_at(kind, Point::new(x, y)));
    }
    canvas
}

fn collect<'a>(el: &'a HtmlElement, out: &mut Vec<&'a HtmlElement>) {
    out.push(el);
    for child in el.element_children() {
        collect(child, out);
    }
}

#[test]
fn one_top_level_node_per_element_in_order() {
    let canvas = sample_canvas();
    let tree = export_tree(&canvas);
    let container = tree.as_element().unwrap();
    let tops: Vec<&str> = container.element_children().map(|e| e.tag.as_str()).collect();
    assert_eq!(tops, vec!["section", "a", "figure"]);

    for (el, record) in container.element_children().zip(canvas.iter()) {
        let style = el.attr("style").unwrap();
        assert!(style.starts_with("position: absolute; "), "{style}");
        assert!(style.contains(&format!("left: {}", pb_core::css::format_px(record.position.x))));
        assert!(style.contains(&format!("top: {}", pb_core::css::format_px(record.position.y))));
    }
}

#[test]
fn no_editor_artifacts_survive() {
    let canvas = sample_canvas();
    let html = export_document(&canvas, &ExportOptions::default());
    for marker in ["pf-handle", "contenteditable", "data-editable", "data-id", "pf-el", "selected"] {
        assert!(!html.contains(marker), "found {marker} in export");
    }
    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains("<meta charset=\"utf-8\">"));
    assert!(html.contains("<title>Prefab Export</title>"));
}

const HEADINGS_AND_TEXT: &[&str] = &["a", "p", "h1", "h2", "h3", "h4", "h5", "h6"];

#[test]
fn text_color_reaches_every_text_node() {
    let mut factory = ElementFactory::new();
    let mut canvas = Canvas::default();
    for kind in ["hero", "nav", "card", "button"] {
        let mut el = factory.create(kind);
        el.overrides.text_color = Color::from_hex("ff0000");
        canvas.insert(el);
    }

    let tree = export_tree(&canvas);
    let mut all = Vec::new();
    for root in tree.as_element().unwrap().element_children() {
        assert!(root.attr("style").unwrap().contains("color: rgb(255, 0, 0)"));
        collect(root, &mut all);
    }
    // Links and headings get their own colors from the browser, so the
    // inherited value has to be written on each of them.
    let mut checked = 0;
    for el in all.iter().filter(|e| HEADINGS_AND_TEXT.contains(&e.tag.as_str())) {
        let style = el.attr("style").unwrap_or_default();
        assert!(
            style.contains("color: rgb(255, 0, 0)"),
            "<{}> lost the text color: {style}",
            el.tag
        );
        checked += 1;
    }
    // hero h1, p, a; nav 3 links; card h3, p; the button itself
    assert_eq!(checked, 9);
}

#[test]
fn font_size_reaches_headings() {
    let mut factory = ElementFactory::new();
    let mut canvas = Canvas::default();
    let mut card = factory.create("card");
    card.overrides.font_size = Some(22.0);
    canvas.insert(card);

    let tree = export_tree(&canvas);
    let root = tree.as_element().unwrap().element_children().next().unwrap();
    let mut all = Vec::new();
    collect(root, &mut all);
    let h3 = all.iter().find(|e| e.tag == "h3").unwrap();
    assert!(h3.attr("style").unwrap().contains("font-size: 22px"));
    let p = all.iter().find(|e| e.tag == "p").unwrap();
    assert!(p.attr("style").unwrap().contains("font-size: 22px"));
}

#[test]
fn browser_defaults_are_cancelled_explicitly() {
    let mut factory = ElementFactory::new();
    let mut canvas = Canvas::default();
    canvas.insert(factory.create("card"));

    let tree = export_tree(&canvas);
    let root = tree.as_element().unwrap().element_children().next().unwrap();
    let mut all = Vec::new();
    collect(root, &mut all);
    // The template zeroes the paragraph's 1em margins; the export must say
    // so or the browser puts them back.
    let p = all.iter().find(|e| e.tag == "p").unwrap();
    assert!(p.attr("style").unwrap().contains("margin: 0px"));
    let h3 = all.iter().find(|e| e.tag == "h3").unwrap();
    assert!(h3.attr("style").unwrap().contains("margin: 0px 0px 8px"));
}

#[test]
fn transparent_and_default_values_are_skipped() {
    let mut factory = ElementFactory::new();
    let mut canvas = Canvas::default();
    let mut card = factory.create("card");
    card.overrides.background = Some(Color::TRANSPARENT);
    card.height = Height::Px(200.0);
    canvas.insert(card);

    let tree = export_tree(&canvas);
    let root = tree.as_element().unwrap().element_children().next().unwrap();
    let style = root.attr("style").unwrap();
    assert!(!style.contains("background-color"), "{style}");
    assert!(style.contains("height: 200px"));
    assert!(style.contains("border-top: 1px solid rgb(229, 231, 235)"));
}

#[test]
fn empty_canvas_exports_container_only() {
    let canvas = Canvas::default();
    let tree = export_tree(&canvas);
    let container = tree.as_element().unwrap();
    assert_eq!(container.children.len(), 0);
    assert!(container.attr("style").unwrap().contains("width: 960px"));
}
