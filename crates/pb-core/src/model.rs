//! Record model for the prefab canvas.
//!
//! Every placed element is an owned record (`CanvasElement`) stored in the
//! `Canvas` arena in document order. Records carry geometry, style overrides
//! and an owned content tree cloned from the prefab template; nothing here
//! knows about the rendered HTML, which is a pure projection of these records.

use crate::content::ContentTree;
use crate::id::ElementId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// sRGB color with 8-bit channels and a float alpha, as CSS computes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// CSS `transparent`, computed as `rgba(0, 0, 0, 0)`.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let r = hex_val(bytes[0])? * 17;
                let g = hex_val(bytes[1])? * 17;
                let b = hex_val(bytes[2])? * 17;
                let a = match bytes.get(3) {
                    Some(&c) => (hex_val(c)? * 17) as f32 / 255.0,
                    None => 1.0,
                };
                Some(Self::rgba(r, g, b, a))
            }
            6 | 8 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                let a = if bytes.len() == 8 {
                    (hex_val(bytes[6])? << 4 | hex_val(bytes[7])?) as f32 / 255.0
                } else {
                    1.0
                };
                Some(Self::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Emit as lowercase `#rrggbb`, the only form `<input type="color">`
    /// accepts. Alpha is dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Emit in the serialized form browsers use for computed colors:
    /// `rgb(r, g, b)` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            // Browsers print alpha with at most a few significant digits.
            let a = (self.a * 1000.0).round() / 1000.0;
            format!("rgba({}, {}, {}, {a})", self.r, self.g, self.b)
        }
    }

    pub fn is_opaque(&self) -> bool {
        (self.a - 1.0).abs() < f32::EPSILON
    }
}

// ─── Prefab kinds ────────────────────────────────────────────────────────

/// The palette entry an element was created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefabKind {
    Hero,
    Nav,
    Card,
    Button,
    Image,
    /// An identifier the palette does not know. Rendered as a text
    /// placeholder naming the requested type.
    Unknown(String),
}

impl PrefabKind {
    /// The known palette, in display order.
    pub const PALETTE: [PrefabKind; 5] = [
        PrefabKind::Hero,
        PrefabKind::Nav,
        PrefabKind::Card,
        PrefabKind::Button,
        PrefabKind::Image,
    ];

    /// Resolve a palette identifier. Matching is case-insensitive and
    /// ignores surrounding whitespace; anything else becomes `Unknown`.
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "hero" => Self::Hero,
            "nav" => Self::Nav,
            "card" => Self::Card,
            "button" => Self::Button,
            "image" => Self::Image,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Hero => "hero",
            Self::Nav => "nav",
            Self::Card => "card",
            Self::Button => "button",
            Self::Image => "image",
            Self::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for PrefabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Geometry & overrides ────────────────────────────────────────────────

/// Element height: either explicit pixels or content-driven.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Height {
    #[default]
    Auto,
    Px(f64),
}

impl Height {
    pub fn px(&self) -> Option<f64> {
        match self {
            Height::Auto => None,
            Height::Px(h) => Some(*h),
        }
    }
}

/// Style fields edited through the property panel. `None` leaves the
/// template's own styling in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverrides {
    pub background: Option<Color>,
    /// Cascades to every text-bearing descendant, not just the root.
    pub text_color: Option<Color>,
    pub border_color: Option<Color>,
    pub border_width: Option<f64>,
    /// Cascades like `text_color`.
    pub font_size: Option<f64>,
    pub padding: Option<f64>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// A placed prefab instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasElement {
    pub id: ElementId,
    pub kind: PrefabKind,
    /// Top-left corner relative to the canvas origin. Never negative after
    /// a drag.
    pub position: Point,
    pub width: f64,
    pub height: Height,
    pub z_index: i32,
    #[serde(default)]
    pub overrides: StyleOverrides,
    /// Owned copy of the prefab template, edited in place by the text field.
    /// Omitted in hand-written snapshots; filled from the template on load.
    #[serde(default)]
    pub content: ContentTree,
}

// ─── Canvas ──────────────────────────────────────────────────────────────

/// Canvas surface settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub background: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 640.0,
            background: Color::WHITE,
        }
    }
}

/// Arena of placed elements in document order.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    pub config: CanvasConfig,
    elements: Vec<CanvasElement>,
    /// Index from ElementId → position in `elements`.
    id_index: HashMap<ElementId, usize>,
}

impl Canvas {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            elements: Vec::new(),
            id_index: HashMap::new(),
        }
    }

    /// Rebuild a canvas from a record list (e.g. a decoded snapshot).
    /// Later duplicates of an ID are dropped.
    pub fn from_elements(config: CanvasConfig, elements: Vec<CanvasElement>) -> Self {
        let mut canvas = Self::new(config);
        for element in elements {
            if canvas.contains(element.id) {
                log::warn!("dropping duplicate element id {}", element.id);
                continue;
            }
            canvas.insert(element);
        }
        canvas
    }

    /// Append an element at the end of document order.
    pub fn insert(&mut self, element: CanvasElement) {
        self.id_index.insert(element.id, self.elements.len());
        self.elements.push(element);
    }

    /// Insert at a document-order position (clamped to the end). Used to put
    /// a deleted element back where it was.
    pub fn insert_at(&mut self, index: usize, element: CanvasElement) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
        for (i, element) in self.elements.iter().enumerate().skip(index) {
            self.id_index.insert(element.id, i);
        }
    }

    /// Remove an element, keeping `id_index` synchronized.
    pub fn remove(&mut self, id: ElementId) -> Option<CanvasElement> {
        let idx = self.id_index.remove(&id)?;
        let removed = self.elements.remove(idx);
        for (i, element) in self.elements.iter().enumerate().skip(idx) {
            self.id_index.insert(element.id, i);
        }
        Some(removed)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.id_index.clear();
    }

    pub fn get(&self, id: ElementId) -> Option<&CanvasElement> {
        self.id_index.get(&id).map(|&idx| &self.elements[idx])
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut CanvasElement> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.elements[idx])
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Document-order position of an element.
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.id_index.get(&id).copied()
    }

    /// Elements in document order.
    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CanvasElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in paint order: ascending z-index, ties broken by document
    /// order (later paints above earlier).
    pub fn paint_order(&self) -> Vec<&CanvasElement> {
        let mut ordered: Vec<&CanvasElement> = self.elements.iter().collect();
        // Stable sort keeps document order within equal z.
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    pub fn max_z(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).max()
    }

    pub fn min_z(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).min()
    }

    /// Consume the canvas, returning its records in document order.
    pub fn into_elements(self) -> Vec<CanvasElement> {
        self.elements
    }
}
