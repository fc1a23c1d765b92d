//! Auto-height layout: how tall an element renders when its height is
//! `auto`.
//!
//! A small block and flex flow over the computed cascade, so hit testing,
//! the resize handle and the panel agree with what the live view draws.
//! Text is measured with an average glyph advance rather than real font
//! metrics.

use crate::style::{ComputedStyle, compute_element};
use pb_core::NodeIndex;
use pb_core::content::{ContentNode, ContentTree, ElementData};
use pb_core::css::parse_length;
use pb_core::model::CanvasElement;
use std::collections::HashMap;

/// Average advance of one glyph, in em.
pub const AVG_GLYPH_EM: f64 = 0.45;

/// Height the element occupies on the canvas: its fixed height, or the
/// laid-out height of its content.
pub fn rendered_height(element: &CanvasElement) -> f64 {
    element.height.px().unwrap_or_else(|| auto_height(element))
}

/// Border-box height of the element's content at its current width.
pub fn auto_height(element: &CanvasElement) -> f64 {
    let styles = compute_element(element);
    let flow = Flow {
        tree: &element.content,
        styles: &styles,
    };
    flow.border_box(element.content.root, element.width)
}

// ─── Box metrics ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Edges {
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
}

impl Edges {
    /// Computed box shorthand; anything that is not a length counts as 0.
    fn parse(value: Option<String>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        let parts: Vec<f64> = value
            .split_whitespace()
            .map(|t| parse_length(t).unwrap_or(0.0).max(0.0))
            .collect();
        let [top, right, bottom, left] = match parts.as_slice() {
            [a] => [*a; 4],
            [a, b] => [*a, *b, *a, *b],
            [a, b, c] => [*a, *b, *c, *b],
            [a, b, c, d] => [*a, *b, *c, *d],
            _ => return Self::default(),
        };
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    fn borders(style: &ComputedStyle) -> Self {
        let width = |side: usize| {
            style
                .border(side)
                .filter(|b| !matches!(b.style.as_str(), "none" | "hidden"))
                .map_or(0.0, |b| b.width)
        };
        Self {
            top: width(0),
            right: width(1),
            bottom: width(2),
            left: width(3),
        }
    }

    fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

fn display(style: &ComputedStyle) -> String {
    style.get("display").unwrap_or_else(|| "inline".into())
}

fn px(style: &ComputedStyle, property: &str) -> Option<f64> {
    style
        .get(property)
        .and_then(|v| v.trim().strip_suffix("px").and_then(|n| n.trim().parse().ok()))
}

fn is_block_level(display: &str) -> bool {
    matches!(display, "block" | "flex" | "list-item" | "table")
}

// ─── Flow ────────────────────────────────────────────────────────────────

/// Stacked in a block formatting context.
enum Item {
    Block {
        margin_top: f64,
        margin_bottom: f64,
        height: f64,
    },
    Line(f64),
}

/// Inline content collected until the next block-level sibling.
#[derive(Debug, Default)]
struct LineRun {
    text_width: f64,
    line_height: f64,
    has_text: bool,
    tallest_box: f64,
}

impl LineRun {
    fn add_text(&mut self, text: &str, style: &ComputedStyle) {
        let chars = text.split_whitespace().collect::<Vec<_>>().join(" ").chars().count();
        if chars == 0 {
            return;
        }
        self.text_width += chars as f64 * AVG_GLYPH_EM * style.font_size();
        self.line_height = self.line_height.max(style.line_height());
        self.has_text = true;
    }

    fn add_box(&mut self, outer_height: f64) {
        self.tallest_box = self.tallest_box.max(outer_height);
    }

    /// Close the run as one anonymous line box. `None` when nothing was
    /// collected.
    fn finish(&mut self, container: &ComputedStyle, width: f64) -> Option<f64> {
        let run = std::mem::take(self);
        if !run.has_text && run.tallest_box == 0.0 {
            return None;
        }
        let lines = if run.has_text {
            (run.text_width / width.max(1.0)).ceil().max(1.0)
        } else {
            0.0
        };
        let line_height = run.line_height.max(container.line_height());
        Some((lines * line_height).max(run.tallest_box))
    }
}

struct Flow<'a> {
    tree: &'a ContentTree,
    styles: &'a HashMap<NodeIndex, ComputedStyle>,
}

impl Flow<'_> {
    /// Border-box height of a node laid out at border-box `width`.
    fn border_box(&self, idx: NodeIndex, width: f64) -> f64 {
        let Some(style) = self.styles.get(&idx) else {
            return 0.0;
        };
        let padding = Edges::parse(style.get("padding"));
        let border = Edges::borders(style);
        let chrome = padding.vertical() + border.vertical();
        if let Some(height) = px(style, "height") {
            return height + chrome;
        }
        let inner = (width - padding.horizontal() - border.horizontal()).max(0.0);
        let content = if display(style) == "flex" {
            self.flex_height(idx, style, inner)
        } else {
            self.flow_height(idx, style, inner)
        };
        content + chrome
    }

    /// Margins and border-box height of a child given the containing
    /// block's content width.
    fn outer(&self, idx: NodeIndex, available: f64) -> (Edges, f64) {
        let (Some(style), Some(data)) = (self.styles.get(&idx), self.tree.element(idx)) else {
            return (Edges::default(), 0.0);
        };
        let margin = Edges::parse(style.get("margin"));
        let available = (available - margin.horizontal()).max(0.0);
        if data.tag == "img" {
            return (margin, replaced_height(data, style, available));
        }
        let width = match px(style, "width") {
            Some(w) => {
                w + Edges::parse(style.get("padding")).horizontal()
                    + Edges::borders(style).horizontal()
            }
            None => available,
        };
        (margin, self.border_box(idx, width))
    }

    /// Single-line flex row: the tallest item's margin box.
    fn flex_height(&self, idx: NodeIndex, style: &ComputedStyle, inner: f64) -> f64 {
        let mut tallest: f64 = 0.0;
        for child in self.tree.children(idx) {
            match self.tree.node(child) {
                Some(ContentNode::Element(_)) => {
                    let (margin, height) = self.outer(child, inner);
                    tallest = tallest.max(margin.vertical() + height);
                }
                Some(ContentNode::Text(text)) if !text.trim().is_empty() => {
                    tallest = tallest.max(style.line_height());
                }
                _ => {}
            }
        }
        tallest
    }

    fn flow_height(&self, idx: NodeIndex, style: &ComputedStyle, inner: f64) -> f64 {
        let mut items = Vec::new();
        let mut run = LineRun::default();
        for child in self.tree.children(idx) {
            match self.tree.node(child) {
                Some(ContentNode::Text(text)) => run.add_text(text, style),
                Some(ContentNode::Element(data)) => {
                    let Some(child_style) = self.styles.get(&child) else {
                        continue;
                    };
                    let child_display = display(child_style);
                    if child_display == "none" {
                        continue;
                    }
                    if is_block_level(&child_display) {
                        if let Some(line) = run.finish(style, inner) {
                            items.push(Item::Line(line));
                        }
                        let (margin, height) = self.outer(child, inner);
                        items.push(Item::Block {
                            margin_top: margin.top,
                            margin_bottom: margin.bottom,
                            height,
                        });
                    } else {
                        self.place_inline(child, data, child_style, inner, &mut run);
                    }
                }
                None => {}
            }
        }
        if let Some(line) = run.finish(style, inner) {
            items.push(Item::Line(line));
        }
        stack(&items)
    }

    /// Add an inline-level node to the current line run. Inline boxes
    /// contribute their text; atomic boxes their margin box.
    fn place_inline(
        &self,
        idx: NodeIndex,
        data: &ElementData,
        style: &ComputedStyle,
        available: f64,
        run: &mut LineRun,
    ) {
        if data.tag == "img" || display(style) != "inline" {
            let (margin, height) = self.outer(idx, available);
            run.add_box(margin.vertical() + height);
            return;
        }
        for child in self.tree.children(idx) {
            match self.tree.node(child) {
                Some(ContentNode::Text(text)) => run.add_text(text, style),
                Some(ContentNode::Element(child_data)) => {
                    if let Some(child_style) = self.styles.get(&child) {
                        self.place_inline(child, child_data, child_style, available, run);
                    }
                }
                None => {}
            }
        }
    }
}

/// Sum stacked items, collapsing adjoining vertical margins between block
/// siblings. The first top and last bottom margin stay inside the parent.
fn stack(items: &[Item]) -> f64 {
    let mut height = 0.0;
    let mut pending_margin: f64 = 0.0;
    for item in items {
        match item {
            Item::Block {
                margin_top,
                margin_bottom,
                height: h,
            } => {
                height += pending_margin.max(*margin_top) + h;
                pending_margin = *margin_bottom;
            }
            Item::Line(h) => {
                height += pending_margin + h;
                pending_margin = 0.0;
            }
        }
    }
    height + pending_margin
}

/// Images keep their intrinsic aspect ratio from the `width`/`height`
/// attributes.
fn replaced_height(data: &ElementData, style: &ComputedStyle, available: f64) -> f64 {
    let attr = |name: &str| {
        data.get_attr(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|n| *n >= 0.0)
    };
    let chrome =
        Edges::parse(style.get("padding")).vertical() + Edges::borders(style).vertical();
    if let Some(height) = px(style, "height") {
        return height + chrome;
    }
    let css_width = style.get("width").unwrap_or_default();
    let width = match css_width.trim().strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().map_or(available, |p| available * p / 100.0),
        None => px(style, "width").or_else(|| attr("width")).unwrap_or(0.0),
    };
    let height = match (attr("width"), attr("height")) {
        (Some(w), Some(h)) if w > 0.0 => width * h / w,
        (_, Some(h)) => h,
        _ => 0.0,
    };
    height + chrome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::model::Height;
    use pb_core::prefab::ElementFactory;
    use pretty_assertions::assert_eq;

    fn height_of(kind: &str) -> f64 {
        let el = ElementFactory::new().create(kind);
        (auto_height(&el) * 100.0).round() / 100.0
    }

    #[test]
    fn template_heights_follow_the_cascade() {
        // card: 16px padding, 1px border, 30px title, 8px gap, 24px copy
        assert_eq!(height_of("card"), 96.0);
        // nav: 14px padding, 1px bottom border, 30px brand line
        assert_eq!(height_of("nav"), 59.0);
        assert_eq!(height_of("button"), 44.0);
        // image: 320x180 scaled to the figure width, then a 37px caption
        assert_eq!(height_of("image"), 217.0);
        assert_eq!(height_of("mystery"), 50.0);
    }

    #[test]
    fn long_text_wraps_into_more_lines() {
        let mut el = ElementFactory::new().create("card");
        let short = auto_height(&el);
        let target = el.content.text_target();
        el.content.set_text(target, &"word ".repeat(40));
        assert!(auto_height(&el) > short + 29.0);

        el.width = 2000.0;
        assert_eq!(auto_height(&el), short);
    }

    #[test]
    fn overrides_change_the_auto_height() {
        let mut el = ElementFactory::new().create("button");
        el.overrides.padding = Some(20.0);
        assert_eq!(auto_height(&el), 64.0);
        el.overrides.font_size = Some(20.0);
        assert_eq!(auto_height(&el), 70.0);
    }

    #[test]
    fn fixed_height_wins() {
        let mut el = ElementFactory::new().create("hero");
        assert_eq!(rendered_height(&el), auto_height(&el));
        el.height = Height::Px(300.0);
        assert_eq!(rendered_height(&el), 300.0);
    }

    #[test]
    fn image_scales_with_width() {
        let mut el = ElementFactory::new().create("image");
        el.width = 640.0;
        assert_eq!(auto_height(&el), 360.0 + 37.0);
    }

    #[test]
    fn sibling_margins_collapse() {
        let items = [
            Item::Block {
                margin_top: 10.0,
                margin_bottom: 20.0,
                height: 5.0,
            },
            Item::Block {
                margin_top: 12.0,
                margin_bottom: 4.0,
                height: 5.0,
            },
        ];
        assert_eq!(stack(&items), 10.0 + 5.0 + 20.0 + 5.0 + 4.0);
    }
}
