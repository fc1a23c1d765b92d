//! Live projection: element records → the editor's HTML view.
//!
//! The view is derived, never authoritative. Each render rebuilds the
//! markup from `Canvas`, so there is no DOM state to keep in sync and
//! nothing to look up by position.

use crate::html::{HtmlElement, HtmlNode};
use crate::style::{effective_inline, prefab_stylesheet};
use pb_core::content::ContentNode;
use pb_core::css::format_px;
use pb_core::model::{Canvas, CanvasElement};
use pb_core::{ElementId, NodeIndex};

/// Class on every placed element's root in the live view.
pub const ELEMENT_CLASS: &str = "pf-el";
/// Class marking the selected element.
pub const SELECTED_CLASS: &str = "selected";
/// Class of the bottom-right resize handle.
pub const HANDLE_CLASS: &str = "pf-handle";
/// Class of the canvas container.
pub const CANVAS_CLASS: &str = "pb-canvas";

pub const ID_ATTR: &str = "data-id";
pub const EDITABLE_ATTR: &str = "data-editable";
pub const CONTENTEDITABLE_ATTR: &str = "contenteditable";

/// Chrome the editor draws around elements. Not part of exports.
pub const EDITOR_CSS: &str = "\
.pb-canvas{position:relative;overflow:hidden}
.pf-el{position:absolute;cursor:move;user-select:none}
.pf-el.selected{outline:2px solid #2b6ef6;outline-offset:2px}
.pf-el [contenteditable]{cursor:text;user-select:text}
.pf-handle{position:absolute;right:0;bottom:0;width:12px;height:12px;background:#2b6ef6;opacity:.35;cursor:nwse-resize}
.pf-el.selected .pf-handle{opacity:1}
";

/// Project one element into its live view subtree.
pub fn project_element(element: &CanvasElement, selected: bool) -> HtmlNode {
    let tree = &element.content;
    let mut root = match project_node(element, tree.root) {
        HtmlNode::Element(e) => e,
        text => return text,
    };

    let mut classes = vec![ELEMENT_CLASS.to_string()];
    if selected {
        classes.push(SELECTED_CLASS.to_string());
    }
    classes.extend(root.classes().into_iter().map(str::to_string));
    root.remove_attr("class");
    root.attrs.insert(0, ("class".to_string(), classes.join(" ")));
    root.attrs.insert(1, (ID_ATTR.to_string(), element.id.as_str().to_string()));

    let mut style = vec![
        "position: absolute".to_string(),
        format!("left: {}", format_px(element.position.x)),
        format!("top: {}", format_px(element.position.y)),
    ];
    if let Some(inline) = root.remove_attr("style") {
        style.push(inline);
    }
    root.set_attr("style", style.join("; "));

    let mut handle = HtmlElement::new("div");
    handle.set_attr("class", HANDLE_CLASS);
    handle.set_attr("data-handle", "se");
    root.children.push(handle.into());

    HtmlNode::Element(root)
}

fn project_node(element: &CanvasElement, idx: NodeIndex) -> HtmlNode {
    let tree = &element.content;
    let data = match tree.node(idx) {
        Some(ContentNode::Element(data)) => data,
        Some(ContentNode::Text(t)) => return HtmlNode::text(t),
        None => return HtmlNode::text(""),
    };

    let mut out = HtmlElement::new(&data.tag);
    out.source = Some(idx);
    if !data.classes.is_empty() {
        out.set_attr("class", data.classes.join(" "));
    }
    for (name, value) in &data.attrs {
        out.set_attr(name, value.as_str());
    }
    if data.editable {
        out.set_attr(EDITABLE_ATTR, "true");
        out.set_attr(CONTENTEDITABLE_ATTR, "true");
    }
    let inline = effective_inline(element, idx);
    if !inline.is_empty() {
        out.set_attr("style", inline.to_inline());
    }
    for child in tree.children(idx) {
        out.children.push(project_node(element, child));
    }
    HtmlNode::Element(out)
}

/// The canvas container with every element in document order.
pub fn project_canvas(canvas: &Canvas, selection: Option<ElementId>) -> HtmlNode {
    let mut container = HtmlElement::new("div");
    container.set_attr("class", CANVAS_CLASS);
    container.set_attr(
        "style",
        format!(
            "width: {}; height: {}; background-color: {}",
            format_px(canvas.config.width),
            format_px(canvas.config.height),
            canvas.config.background.to_css()
        ),
    );
    for element in canvas.iter() {
        container
            .children
            .push(project_element(element, selection == Some(element.id)));
    }
    HtmlNode::Element(container)
}

/// Live view markup: editor and prefab styles followed by the canvas.
pub fn render_live(canvas: &Canvas, selection: Option<ElementId>) -> String {
    let mut out = String::from("<style>");
    out.push_str(EDITOR_CSS);
    out.push_str(&prefab_stylesheet());
    out.push_str("</style>");
    out.push_str(&project_canvas(canvas, selection).to_html());
    out
}
