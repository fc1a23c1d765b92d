//! Static export: the canvas as a standalone HTML document.
//!
//! Starts from the live projection, strips editor-only markup, then replaces
//! every node's inline style with its allow-listed computed properties so
//! the document renders the same without the editor stylesheet.

use crate::html::{HtmlElement, HtmlNode};
use crate::project::{
    CONTENTEDITABLE_ATTR, EDITABLE_ATTR, ELEMENT_CLASS, HANDLE_CLASS, ID_ATTR, SELECTED_CLASS,
    project_element,
};
use crate::style::{ComputedStyle, INHERITED, compute_element, user_agent_style};
use pb_core::NodeIndex;
use pb_core::content::{Declarations, is_text_tag};
use pb_core::css::format_px;
use pb_core::model::{Canvas, CanvasElement};
use std::collections::HashMap;

/// Computed properties copied into the exported markup, in output order.
pub const EXPORT_PROPERTIES: &[&str] = &[
    "background-color",
    "color",
    "font-size",
    "font-family",
    "font-weight",
    "line-height",
    "text-align",
    "border-top",
    "border-right",
    "border-bottom",
    "border-left",
    "border-radius",
    "box-shadow",
    "padding",
    "margin",
    "width",
    "height",
    "z-index",
];

/// Values that are never worth inlining, whatever the property.
pub const SENTINELS: &[&str] = &[
    "0px",
    "none",
    "normal",
    "auto",
    "rgba(0, 0, 0, 0)",
    "0px none rgb(0, 0, 0)",
];

/// Per-property initial values that are equally uninteresting.
pub const PROPERTY_SENTINELS: &[(&str, &str)] = &[("font-weight", "400"), ("text-align", "start")];

/// Written on every text-bearing node, even when the browser would arrive
/// at the same value, so the block restyle survives host stylesheets.
pub const TEXT_PROPERTIES: &[&str] = &["color", "font-size", "font-weight"];

/// Whether `value` is a default that export leaves out.
pub fn is_sentinel(property: &str, value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || SENTINELS.contains(&value)
        || PROPERTY_SENTINELS.contains(&(property, value))
        // Invisible border sides, whatever their color.
        || (property.starts_with("border-") && value.starts_with("0px none"))
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub title: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "Prefab Export".into(),
        }
    }
}

/// Remove handles, selection and element markers, editing attributes and
/// editor IDs from a projected subtree.
pub fn strip_editor_artifacts(element: &mut HtmlElement) {
    element.children.retain(|child| {
        !child
            .as_element()
            .is_some_and(|e| e.has_class(HANDLE_CLASS))
    });
    element.remove_class(SELECTED_CLASS);
    element.remove_class(ELEMENT_CLASS);
    element.remove_attr(CONTENTEDITABLE_ATTR);
    element.remove_attr(EDITABLE_ATTR);
    element.remove_attr(ID_ATTR);
    for child in &mut element.children {
        if let Some(e) = child.as_element_mut() {
            strip_editor_artifacts(e);
        }
    }
}

/// Export one element: projected, stripped, positioned and style-inlined.
pub fn export_element(element: &CanvasElement) -> HtmlNode {
    let mut node = project_element(element, false);
    if let Some(root) = node.as_element_mut() {
        strip_editor_artifacts(root);
        let computed = compute_element(element);
        let mut position = Declarations::new();
        position.set("position", "absolute");
        position.set("left", format_px(element.position.x));
        position.set("top", format_px(element.position.y));
        inline_computed(root, &computed, &ComputedStyle::initial(), position);
    }
    node
}

fn inline_computed(
    node: &mut HtmlElement,
    computed: &HashMap<NodeIndex, ComputedStyle>,
    parent: &ComputedStyle,
    mut decls: Declarations,
) {
    let style = node.source.and_then(|idx| computed.get(&idx));
    if let Some(style) = style {
        let baseline = user_agent_style(&node.tag, parent);
        let text_node = is_text_tag(&node.tag);
        for &property in EXPORT_PROPERTIES {
            let Some(value) = style.get(property) else {
                continue;
            };
            let forced = text_node && TEXT_PROPERTIES.contains(&property);
            if !forced && !worth_inlining(property, &value, baseline.get(property).as_deref()) {
                continue;
            }
            decls.set(property, value);
        }
    }
    if decls.is_empty() {
        node.remove_attr("style");
    } else {
        node.set_attr("style", decls.to_inline());
    }

    let next_parent = style.unwrap_or(parent);
    for child in &mut node.children {
        if let Some(e) = child.as_element_mut() {
            inline_computed(e, computed, next_parent, Declarations::new());
        }
    }
}

/// Whether a computed value has to be written out for the exported node to
/// render it. `baseline` is what the browser computes for the bare tag
/// under the same parent: anything equal to it is free. Sentinels are
/// skipped only where the browser default is itself a sentinel, so a
/// `margin: 0px` that cancels a paragraph's default margin is kept.
fn worth_inlining(property: &str, value: &str, baseline: Option<&str>) -> bool {
    if baseline == Some(value) {
        return false;
    }
    if INHERITED.contains(&property) {
        return true;
    }
    !(is_sentinel(property, value) && baseline.is_none_or(|b| is_sentinel(property, b)))
}

/// The export container: the canvas box with every element in document
/// order.
pub fn export_tree(canvas: &Canvas) -> HtmlNode {
    let mut container = HtmlElement::new("div");
    container.set_attr(
        "style",
        format!(
            "position: relative; width: {}; height: {}; background-color: {}; overflow: hidden",
            format_px(canvas.config.width),
            format_px(canvas.config.height),
            canvas.config.background.to_css()
        ),
    );
    for element in canvas.iter() {
        container.children.push(export_element(element));
    }
    HtmlNode::Element(container)
}

/// Produce the standalone document. Never fails; an empty canvas exports an
/// empty container.
pub fn export_document(canvas: &Canvas, options: &ExportOptions) -> String {
    log::info!("exporting {} element(s)", canvas.len());
    let body = export_tree(canvas).to_html();
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>body{{margin:0}}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        crate::html::escape_text(&options.title),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sentinel_table() {
        assert!(is_sentinel("margin", "0px"));
        assert!(is_sentinel("background-color", "rgba(0, 0, 0, 0)"));
        assert!(is_sentinel("border-top", "0px none rgb(31, 41, 55)"));
        assert!(is_sentinel("font-weight", "400"));
        assert!(!is_sentinel("font-weight", "700"));
        assert!(!is_sentinel("padding", "12px"));
        assert!(!is_sentinel("border-top", "1px solid rgb(0, 0, 0)"));
    }

    #[test]
    fn strip_removes_editor_markup() {
        let mut root = HtmlElement::new("div");
        root.set_attr("class", "pf-el selected pf pf-card");
        root.set_attr(ID_ATTR, "el_1");
        let mut h3 = HtmlElement::new("h3");
        h3.set_attr(CONTENTEDITABLE_ATTR, "true");
        h3.set_attr(EDITABLE_ATTR, "true");
        root.children.push(h3.into());
        let mut handle = HtmlElement::new("div");
        handle.set_attr("class", HANDLE_CLASS);
        root.children.push(handle.into());

        strip_editor_artifacts(&mut root);
        assert_eq!(
            HtmlNode::Element(root).to_html(),
            "<div class=\"pf pf-card\"><h3></h3></div>"
        );
    }
}
