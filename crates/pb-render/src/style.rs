//! Computed styles without a browser.
//!
//! A small cascade over the tracked properties: inherit from the parent,
//! apply matching prefab stylesheet rules in order, then the node's
//! effective inline declarations (template inline style plus the element's
//! geometry and panel overrides). Values are normalized to the serialized
//! form `getComputedStyle` would report (`rgb(…)` colors, `Npx` lengths),
//! which is what the property panel and the exporter read back.

use pb_core::content::{ContentNode, Declarations, ElementData, is_text_tag};
use pb_core::css::{format_px, parse_color, parse_em, parse_length};
use pb_core::model::{CanvasElement, Color, Height};
use pb_core::NodeIndex;
use std::collections::HashMap;

// ─── Stylesheet ──────────────────────────────────────────────────────────

/// A simple selector: optional ancestor class scope, then tag and/or class
/// on the node itself.
#[derive(Debug, Clone, Copy)]
pub struct Selector {
    pub scope: Option<&'static str>,
    pub tag: Option<&'static str>,
    pub class: Option<&'static str>,
}

impl Selector {
    pub const fn class(class: &'static str) -> Self {
        Self {
            scope: None,
            tag: None,
            class: Some(class),
        }
    }

    pub const fn tag(tag: &'static str) -> Self {
        Self {
            scope: None,
            tag: Some(tag),
            class: None,
        }
    }

    pub const fn scoped_tag(scope: &'static str, tag: &'static str) -> Self {
        Self {
            scope: Some(scope),
            tag: Some(tag),
            class: None,
        }
    }

    pub const fn scoped_class(scope: &'static str, class: &'static str) -> Self {
        Self {
            scope: Some(scope),
            tag: None,
            class: Some(class),
        }
    }

    /// Whether this selector matches `node`, given the classes of all of its
    /// ancestors within the element.
    pub fn matches(&self, node: &ElementData, ancestor_classes: &[&str]) -> bool {
        self.tag.is_none_or(|t| node.tag == t)
            && self.class.is_none_or(|c| node.has_class(c))
            && self.scope.is_none_or(|s| ancestor_classes.contains(&s))
    }

    /// CSS selector text, e.g. `.pf-hero h1`.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        if let Some(scope) = self.scope {
            out.push('.');
            out.push_str(scope);
            out.push(' ');
        }
        if let Some(tag) = self.tag {
            out.push_str(tag);
        }
        if let Some(class) = self.class {
            out.push('.');
            out.push_str(class);
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub selector: Selector,
    pub declarations: &'static [(&'static str, &'static str)],
}

/// Stylesheet for the prefab templates, in cascade order.
pub const PREFAB_RULES: &[Rule] = &[
    Rule {
        selector: Selector::class("pf"),
        declarations: &[
            ("box-sizing", "border-box"),
            ("font-family", "Inter, system-ui, sans-serif"),
            ("color", "#1f2937"),
            ("line-height", "1.5"),
        ],
    },
    Rule {
        selector: Selector::class("pf-hero"),
        declarations: &[
            ("background-color", "#eef2ff"),
            ("padding", "36px"),
            ("border-radius", "12px"),
        ],
    },
    Rule {
        selector: Selector::scoped_tag("pf-hero", "h1"),
        declarations: &[
            ("font-size", "32px"),
            ("font-weight", "700"),
            ("line-height", "1.2"),
            ("margin", "0px 0px 12px"),
        ],
    },
    Rule {
        selector: Selector::scoped_tag("pf-hero", "p"),
        declarations: &[("color", "#4b5563"), ("margin", "0px 0px 18px")],
    },
    Rule {
        selector: Selector::class("pf-btn"),
        declarations: &[
            ("display", "inline-block"),
            ("background-color", "#2b6ef6"),
            ("color", "#ffffff"),
            ("padding", "10px 16px"),
            ("border-radius", "8px"),
            ("text-decoration", "none"),
        ],
    },
    Rule {
        selector: Selector::class("pf-nav"),
        declarations: &[
            ("display", "flex"),
            ("align-items", "center"),
            ("background-color", "#ffffff"),
            ("padding", "14px 18px"),
            ("border-bottom", "1px solid #e5e7eb"),
        ],
    },
    Rule {
        selector: Selector::scoped_class("pf-nav", "brand"),
        declarations: &[
            ("font-size", "20px"),
            ("font-weight", "700"),
            ("margin", "0px 16px 0px 0px"),
        ],
    },
    Rule {
        selector: Selector::scoped_tag("pf-nav", "a"),
        declarations: &[
            ("color", "#1f2937"),
            ("margin", "0px 0px 0px 14px"),
            ("text-decoration", "none"),
        ],
    },
    Rule {
        selector: Selector::class("pf-card"),
        declarations: &[
            ("background-color", "#ffffff"),
            ("padding", "16px"),
            ("border-radius", "12px"),
            ("border", "1px solid #e5e7eb"),
            ("box-shadow", "0 6px 18px rgba(0, 0, 0, 0.04)"),
        ],
    },
    Rule {
        selector: Selector::scoped_tag("pf-card", "h3"),
        declarations: &[
            ("font-size", "20px"),
            ("font-weight", "700"),
            ("margin", "0px 0px 8px"),
        ],
    },
    Rule {
        selector: Selector::scoped_tag("pf-card", "p"),
        declarations: &[("color", "#4b5563"), ("margin", "0px")],
    },
    Rule {
        selector: Selector::class("pf-button"),
        declarations: &[
            ("display", "inline-block"),
            ("background-color", "#2b6ef6"),
            ("color", "#ffffff"),
            ("padding", "10px 16px"),
            ("border-radius", "8px"),
            ("font-weight", "600"),
            ("text-align", "center"),
            ("text-decoration", "none"),
        ],
    },
    Rule {
        selector: Selector::class("pf-image"),
        declarations: &[
            ("background-color", "#f3f4f6"),
            ("border-radius", "12px"),
            ("margin", "0px"),
            ("overflow", "hidden"),
        ],
    },
    Rule {
        selector: Selector::scoped_tag("pf-image", "img"),
        declarations: &[
            ("display", "block"),
            ("width", "100%"),
            ("border-radius", "12px 12px 0px 0px"),
        ],
    },
    Rule {
        selector: Selector::scoped_tag("pf-image", "figcaption"),
        declarations: &[
            ("font-size", "14px"),
            ("color", "#6b7280"),
            ("padding", "8px 12px"),
        ],
    },
    Rule {
        selector: Selector::class("pf-unknown"),
        declarations: &[
            ("background-color", "#f9fafb"),
            ("padding", "12px"),
            ("border", "1px dashed #9ca3af"),
            ("color", "#6b7280"),
        ],
    },
];

/// Browser default styles for the tags templates use. Applied before
/// `PREFAB_RULES`; the live view gets them from the browser itself, and
/// export compares against them to decide what to inline. `em` values
/// resolve against the node's font size.
pub const USER_AGENT_RULES: &[Rule] = &[
    ua_rule("div", BLOCK),
    ua_rule("section", BLOCK),
    ua_rule("nav", BLOCK),
    ua_rule("header", BLOCK),
    ua_rule("footer", BLOCK),
    ua_rule("figcaption", BLOCK),
    ua_rule("p", &[("display", "block"), ("margin", "1em 0px")]),
    ua_rule(
        "h1",
        &[("display", "block"), ("font-weight", "700"), ("font-size", "2em"), ("margin", "0.67em 0px")],
    ),
    ua_rule(
        "h2",
        &[("display", "block"), ("font-weight", "700"), ("font-size", "1.5em"), ("margin", "0.83em 0px")],
    ),
    ua_rule(
        "h3",
        &[("display", "block"), ("font-weight", "700"), ("font-size", "1.17em"), ("margin", "1em 0px")],
    ),
    ua_rule(
        "h4",
        &[("display", "block"), ("font-weight", "700"), ("font-size", "1em"), ("margin", "1.33em 0px")],
    ),
    ua_rule(
        "h5",
        &[("display", "block"), ("font-weight", "700"), ("font-size", "0.83em"), ("margin", "1.67em 0px")],
    ),
    ua_rule(
        "h6",
        &[("display", "block"), ("font-weight", "700"), ("font-size", "0.67em"), ("margin", "2.33em 0px")],
    ),
    ua_rule("figure", &[("display", "block"), ("margin", "1em 40px")]),
    ua_rule("a", &[("color", "rgb(0, 0, 238)")]),
];

const BLOCK: &[(&str, &str)] = &[("display", "block")];

const fn ua_rule(tag: &'static str, declarations: &'static [(&'static str, &'static str)]) -> Rule {
    Rule {
        selector: Selector::tag(tag),
        declarations,
    }
}

/// What the browser computes for `tag` under `parent` before any prefab
/// rule or inline style applies.
pub fn user_agent_style(tag: &str, parent: &ComputedStyle) -> ComputedStyle {
    let mut style = ComputedStyle::inherit_from(parent);
    for rule in USER_AGENT_RULES {
        if rule.selector.tag == Some(tag) {
            style.apply_all(rule.declarations.iter().copied());
        }
    }
    style.resolve_em();
    style
}

/// Render `PREFAB_RULES` as a stylesheet for the live view.
pub fn prefab_stylesheet() -> String {
    let mut out = String::new();
    for rule in PREFAB_RULES {
        out.push_str(&rule.selector.to_css());
        out.push('{');
        let body: Vec<String> = rule
            .declarations
            .iter()
            .map(|(p, v)| format!("{p}:{v}"))
            .collect();
        out.push_str(&body.join(";"));
        out.push_str("}\n");
    }
    out
}

// ─── Tracked properties ──────────────────────────────────────────────────

/// Properties that inherit from the parent's computed value.
pub const INHERITED: &[&str] = &[
    "color",
    "font-size",
    "font-family",
    "font-weight",
    "line-height",
    "text-align",
];

/// Initial values of every tracked property except the border sides.
const INITIAL: &[(&str, &str)] = &[
    ("display", "inline"),
    ("background-color", "rgba(0, 0, 0, 0)"),
    ("color", "rgb(0, 0, 0)"),
    ("font-size", "16px"),
    ("font-family", "system-ui, sans-serif"),
    ("font-weight", "400"),
    ("line-height", "normal"),
    ("text-align", "start"),
    ("border-radius", "0px"),
    ("box-shadow", "none"),
    ("padding", "0px"),
    ("margin", "0px"),
    ("width", "auto"),
    ("height", "auto"),
    ("z-index", "auto"),
];

const SIDES: [&str; 4] = ["border-top", "border-right", "border-bottom", "border-left"];

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "solid", "dashed", "dotted", "double", "groove", "ridge", "inset", "outset",
];

const DEFAULT_FONT_SIZE: f64 = 16.0;
const NORMAL_LINE_HEIGHT: f64 = 1.2;

/// Width of `medium`, used when a border names a style but no width.
const MEDIUM_BORDER: f64 = 3.0;

fn canonical(property: &str) -> Option<&'static str> {
    INITIAL
        .iter()
        .map(|(p, _)| *p)
        .find(|p| *p == property)
}

/// One computed border side.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderSide {
    pub width: f64,
    pub style: String,
    pub color: Color,
}

impl Default for BorderSide {
    fn default() -> Self {
        Self {
            width: 0.0,
            style: "none".into(),
            color: Color::BLACK,
        }
    }
}

impl BorderSide {
    /// `1px solid rgb(229, 231, 235)`. Sides with no visible style compute
    /// to zero width.
    pub fn to_css(&self) -> String {
        let width = if matches!(self.style.as_str(), "none" | "hidden") {
            0.0
        } else {
            self.width
        };
        format!("{} {} {}", format_px(width), self.style, self.color.to_css())
    }
}

// ─── Computed style ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    values: HashMap<&'static str, String>,
    borders: [BorderSide; 4],
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::initial()
    }
}

impl ComputedStyle {
    /// Every tracked property at its initial value.
    pub fn initial() -> Self {
        Self {
            values: INITIAL
                .iter()
                .map(|(p, v)| (*p, (*v).to_string()))
                .collect(),
            borders: Default::default(),
        }
    }

    /// Initial values, with inherited properties taken from `parent`.
    pub fn inherit_from(parent: &ComputedStyle) -> Self {
        let mut style = Self::initial();
        for prop in INHERITED {
            if let Some(v) = parent.values.get(prop) {
                style.values.insert(prop, v.clone());
            }
        }
        style
    }

    /// Serialized computed value of a tracked property.
    pub fn get(&self, property: &str) -> Option<String> {
        if let Some(side) = SIDES.iter().position(|s| *s == property) {
            return Some(self.borders[side].to_css());
        }
        self.values.get(property).cloned()
    }

    pub fn border(&self, side: usize) -> Option<&BorderSide> {
        self.borders.get(side)
    }

    /// Computed font size in pixels.
    pub fn font_size(&self) -> f64 {
        self.values
            .get("font-size")
            .and_then(|v| parse_length(v).ok())
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Used line height in pixels: unitless values scale the font size,
    /// `normal` is 1.2.
    pub fn line_height(&self) -> f64 {
        let font_size = self.font_size();
        match self.values.get("line-height").map(|v| v.trim()) {
            Some(v) if v.ends_with("px") => parse_length(v).unwrap_or(font_size * NORMAL_LINE_HEIGHT),
            Some(v) => parse_length(v).map_or(font_size * NORMAL_LINE_HEIGHT, |n| n * font_size),
            None => font_size * NORMAL_LINE_HEIGHT,
        }
    }

    /// Resolve `em` box lengths left by user-agent rules against the final
    /// font size.
    fn resolve_em(&mut self) {
        let font_size = self.font_size();
        for key in ["margin", "padding"] {
            let Some(value) = self.values.get(key) else {
                continue;
            };
            if !value.contains("em") {
                continue;
            }
            let resolved: Vec<String> = split_top_level(value)
                .into_iter()
                .map(|t| match parse_em(&t) {
                    Ok(em) => format_px(em * font_size),
                    Err(_) => t,
                })
                .collect();
            let normalized = normalize_box(&resolved.join(" "));
            self.values.insert(key, normalized);
        }
    }

    /// The computed text color.
    pub fn color(&self) -> Color {
        self.values
            .get("color")
            .and_then(|v| parse_color(v).ok())
            .unwrap_or(Color::BLACK)
    }

    /// Apply one declaration. Untracked properties are ignored; values that
    /// fail to parse are kept verbatim where the property allows free text
    /// and dropped otherwise.
    pub fn apply(&mut self, property: &str, value: &str) {
        let value = value.trim();
        match property {
            "background" | "background-color" => {
                if let Ok(c) = parse_color(value) {
                    self.values.insert("background-color", c.to_css());
                }
            }
            "color" => {
                if let Ok(c) = parse_color(value) {
                    self.values.insert("color", c.to_css());
                }
            }
            "font-size" => {
                let normalized = match (parse_length(value), parse_em(value)) {
                    (Ok(n), _) => format_px(n),
                    (_, Ok(em)) => format_px(em * self.font_size()),
                    _ => value.to_string(),
                };
                self.values.insert("font-size", normalized);
            }
            "width" | "height" => {
                let normalized = match parse_length(value) {
                    Ok(n) => format_px(n),
                    Err(_) => value.to_string(),
                };
                if let Some(key) = canonical(property) {
                    self.values.insert(key, normalized);
                }
            }
            "padding" | "margin" | "border-radius" => {
                if let Some(key) = canonical(property) {
                    self.values.insert(key, normalize_box(value));
                }
            }
            "font-weight" => {
                let weight = match value {
                    "normal" => "400",
                    "bold" => "700",
                    other => other,
                };
                self.values.insert("font-weight", weight.to_string());
            }
            "border" => {
                for side in 0..4 {
                    self.apply_border_side(side, value);
                }
            }
            "border-color" => {
                if let Ok(c) = parse_color(value) {
                    for side in &mut self.borders {
                        side.color = c;
                    }
                }
            }
            "border-width" => {
                if let Ok(w) = parse_length(value) {
                    for side in &mut self.borders {
                        side.width = w.max(0.0);
                    }
                }
            }
            "border-style" => {
                if BORDER_STYLES.contains(&value) {
                    for side in &mut self.borders {
                        side.style = value.to_string();
                    }
                }
            }
            _ => {
                if let Some(side) = SIDES.iter().position(|s| *s == property) {
                    self.apply_border_side(side, value);
                } else if let Some(key) = canonical(property) {
                    self.values.insert(key, value.to_string());
                }
            }
        }
    }

    /// Apply every declaration in order.
    pub fn apply_all<'a>(&mut self, decls: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (p, v) in decls {
            self.apply(p, v);
        }
    }

    /// Border shorthand: any order of width, style and color. Omitted
    /// parts reset to their initial values, color to `currentColor`.
    fn apply_border_side(&mut self, side: usize, value: &str) {
        let mut parsed = BorderSide {
            width: MEDIUM_BORDER,
            style: "none".into(),
            color: self.color(),
        };
        let mut saw_width = false;
        for token in split_top_level(value) {
            if let Ok(w) = parse_length(&token) {
                parsed.width = w.max(0.0);
                saw_width = true;
            } else if BORDER_STYLES.contains(&token.as_str()) {
                parsed.style = token;
            } else if let Ok(c) = parse_color(&token) {
                parsed.color = c;
            }
        }
        if !saw_width && parsed.style == "none" {
            parsed.width = 0.0;
        }
        self.borders[side] = parsed;
    }
}

/// Split on whitespace, keeping parenthesized groups (`rgb(1, 2, 3)`)
/// together.
fn split_top_level(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in value.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Normalize a 1–4 value box shorthand to its shortest computed form.
fn normalize_box(value: &str) -> String {
    let parts: Vec<String> = split_top_level(value)
        .into_iter()
        .map(|t| match parse_length(&t) {
            Ok(n) => format_px(n),
            Err(_) => t,
        })
        .collect();
    let [top, right, bottom, left] = match parts.as_slice() {
        [a] => [a, a, a, a],
        [a, b] => [a, b, a, b],
        [a, b, c] => [a, b, c, b],
        [a, b, c, d] => [a, b, c, d],
        _ => return value.to_string(),
    };
    if left == right {
        if top == bottom {
            if top == right {
                return top.clone();
            }
            return format!("{top} {right}");
        }
        return format!("{top} {right} {bottom}");
    }
    format!("{top} {right} {bottom} {left}")
}

// ─── Resolution ──────────────────────────────────────────────────────────

/// Declarations a node actually carries once the element's record is
/// applied: the template's inline style, then (on the root) geometry and
/// panel overrides, or (on text-bearing descendants) the cascading text
/// color and font size.
pub fn effective_inline(element: &CanvasElement, idx: NodeIndex) -> Declarations {
    let tree = &element.content;
    let Some(data) = tree.element(idx) else {
        return Declarations::new();
    };
    let mut decls = data.style.clone();
    let o = &element.overrides;

    if idx == tree.root {
        decls.set("width", format_px(element.width));
        decls.set(
            "height",
            match element.height {
                Height::Auto => "auto".to_string(),
                Height::Px(h) => format_px(h),
            },
        );
        decls.set("z-index", element.z_index.to_string());
        if let Some(bg) = o.background {
            decls.set("background-color", bg.to_css());
        }
        if o.border_width.is_some() || o.border_color.is_some() {
            decls.set("border-style", "solid");
        }
        if let Some(w) = o.border_width {
            decls.set("border-width", format_px(w));
        }
        if let Some(c) = o.border_color {
            decls.set("border-color", c.to_css());
        }
        if let Some(p) = o.padding {
            decls.set("padding", format_px(p));
        }
    }

    // Text color and font size restyle the whole block: the root and every
    // text-bearing descendant.
    if idx == tree.root || is_text_tag(&data.tag) {
        if let Some(c) = o.text_color {
            decls.set("color", c.to_css());
        }
        if let Some(s) = o.font_size {
            decls.set("font-size", format_px(s));
        }
    }
    decls
}

/// Computed style of every element node in an element's content tree.
pub fn compute_element(element: &CanvasElement) -> HashMap<NodeIndex, ComputedStyle> {
    let mut out = HashMap::new();
    let mut ancestors: Vec<&str> = Vec::new();
    visit(
        element,
        element.content.root,
        &ComputedStyle::initial(),
        &mut ancestors,
        &mut out,
    );
    out
}

/// Computed style of an element's root node.
pub fn compute_root(element: &CanvasElement) -> ComputedStyle {
    compute_element(element)
        .remove(&element.content.root)
        .unwrap_or_default()
}

fn visit<'a>(
    element: &'a CanvasElement,
    idx: NodeIndex,
    parent: &ComputedStyle,
    ancestors: &mut Vec<&'a str>,
    out: &mut HashMap<NodeIndex, ComputedStyle>,
) {
    let tree = &element.content;
    let Some(ContentNode::Element(data)) = tree.node(idx) else {
        return;
    };

    let mut style = user_agent_style(&data.tag, parent);
    for rule in PREFAB_RULES {
        if rule.selector.matches(data, ancestors) {
            style.apply_all(rule.declarations.iter().copied());
        }
    }
    let inline = effective_inline(element, idx);
    style.apply_all(inline.iter());
    style.resolve_em();

    let pushed = data.classes.len();
    ancestors.extend(data.classes.iter().map(String::as_str));
    for child in tree.children(idx) {
        visit(element, child, &style, ancestors, out);
    }
    ancestors.truncate(ancestors.len() - pushed);

    out.insert(idx, style);
}
