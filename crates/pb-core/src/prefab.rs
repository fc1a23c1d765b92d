//! Element factory: palette identifier → freshly placed `CanvasElement`.
//!
//! Each prefab kind owns a template content tree. Placing an element clones
//! that template into the new record, so later text edits never leak back
//! into the palette.

use crate::content::{ContentTree, ElementData};
use crate::id::ElementId;
use crate::model::{CanvasElement, Height, PrefabKind, StyleOverrides};
use kurbo::Point;

/// Where click-placed elements land.
pub const DEFAULT_POSITION: Point = Point::new(20.0, 20.0);
pub const DEFAULT_WIDTH: f64 = 320.0;
pub const DEFAULT_Z_INDEX: i32 = 1;

/// Class carried by every prefab root.
pub const PREFAB_CLASS: &str = "pf";

/// Issues element IDs and builds elements from templates.
///
/// The ID counter is owned here (and therefore by whichever editor session
/// owns the factory), never by global state. IDs are never reissued.
#[derive(Debug, Clone)]
pub struct ElementFactory {
    next_id: u64,
}

impl Default for ElementFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Resume issuing at `next_id` (e.g. after loading a snapshot).
    pub fn resume_from(next_id: u64) -> Self {
        Self {
            next_id: next_id.max(1),
        }
    }

    /// The sequence number the next element will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Make sure the counter is at least `next_id`. Never moves backwards.
    pub fn reserve(&mut self, next_id: u64) {
        self.next_id = self.next_id.max(next_id);
    }

    /// Issue the next unique ID.
    pub fn issue_id(&mut self) -> ElementId {
        let id = ElementId::from_sequence(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Create an element from a palette identifier at the default position.
    pub fn create(&mut self, kind: &str) -> CanvasElement {
        self.create_kind(PrefabKind::parse(kind))
    }

    /// Create an element at a drop point. Negative coordinates clamp to the
    /// canvas origin.
    pub fn create_at(&mut self, kind: &str, at: Point) -> CanvasElement {
        let mut element = self.create(kind);
        element.position = Point::new(at.x.max(0.0), at.y.max(0.0));
        element
    }

    pub fn create_kind(&mut self, kind: PrefabKind) -> CanvasElement {
        let id = self.issue_id();
        if !kind.is_known() {
            log::debug!("unknown prefab type {kind:?}, using placeholder");
        }
        let content = template(&kind);
        CanvasElement {
            id,
            kind,
            position: DEFAULT_POSITION,
            width: DEFAULT_WIDTH,
            height: Height::Auto,
            z_index: DEFAULT_Z_INDEX,
            overrides: StyleOverrides::default(),
            content,
        }
    }
}

// ─── Templates ───────────────────────────────────────────────────────────

fn root(tag: &str, kind_class: &str) -> ElementData {
    ElementData::new(tag).class(PREFAB_CLASS).class(kind_class)
}

/// Build the template content tree for a prefab kind.
pub fn template(kind: &PrefabKind) -> ContentTree {
    match kind {
        PrefabKind::Hero => {
            let mut t = ContentTree::new(root("section", "pf-hero"));
            let h1 = t.append_element(t.root, ElementData::new("h1").editable());
            t.append_text(h1, "Build something great");
            let p = t.append_element(t.root, ElementData::new("p"));
            t.append_text(p, "Launch your next idea with a polished landing page.");
            let a = t.append_element(
                t.root,
                ElementData::new("a").class("pf-btn").attr("href", "#"),
            );
            t.append_text(a, "Get Started");
            t
        }
        PrefabKind::Nav => {
            let mut t = ContentTree::new(root("nav", "pf-nav"));
            let brand = t.append_element(
                t.root,
                ElementData::new("span").class("brand").editable(),
            );
            t.append_text(brand, "Brand");
            for label in ["Home", "About", "Contact"] {
                let a = t.append_element(t.root, ElementData::new("a").attr("href", "#"));
                t.append_text(a, label);
            }
            t
        }
        PrefabKind::Card => {
            let mut t = ContentTree::new(root("div", "pf-card"));
            let h3 = t.append_element(t.root, ElementData::new("h3").editable());
            t.append_text(h3, "Card title");
            let p = t.append_element(t.root, ElementData::new("p"));
            t.append_text(p, "Short supporting copy for this card.");
            t
        }
        PrefabKind::Button => {
            let mut t = ContentTree::new(root("a", "pf-button").attr("href", "#").editable());
            let root = t.root;
            t.append_text(root, "Click me");
            t
        }
        PrefabKind::Image => {
            let mut t = ContentTree::new(root("figure", "pf-image"));
            t.append_element(
                t.root,
                ElementData::new("img")
                    .attr("src", "https://picsum.photos/320/180")
                    .attr("width", "320")
                    .attr("height", "180")
                    .attr("alt", "Placeholder image"),
            );
            let caption = t.append_element(t.root, ElementData::new("figcaption").editable());
            t.append_text(caption, "Image caption");
            t
        }
        PrefabKind::Unknown(name) => {
            let mut t = ContentTree::new(root("div", "pf-unknown").editable());
            let root = t.root;
            t.append_text(root, &format!("Unknown prefab: {name}"));
            t
        }
    }
}
