//! Content trees: the owned markup fragment behind each placed element.
//!
//! A tree is an arena graph of element and text nodes with parent→child
//! edges. Children keep insertion order; nodes are never removed, so the
//! arena indices stay monotonic and sorting by index is sorting by order.

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Tags whose text the color/font-size panel fields restyle in bulk.
pub const TEXT_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "a", "span", "li", "button", "label", "figcaption",
];

/// Whether a tag carries text the bulk restyle should reach.
pub fn is_text_tag(tag: &str) -> bool {
    TEXT_TAGS.contains(&tag)
}

// ─── Declarations ────────────────────────────────────────────────────────

/// An ordered list of CSS `property: value` pairs. Setting an existing
/// property replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declarations(SmallVec<[(String, String); 4]>);

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(p, _)| p == property) {
            Some(slot) => slot.1 = value,
            None => self.0.push((property.to_string(), value)),
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let pos = self.0.iter().position(|(p, _)| p == property)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Serialize as an inline `style` attribute value.
    pub fn to_inline(&self) -> String {
        self.iter()
            .map(|(p, v)| format!("{p}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Parse a `a: b; c: d` list. Malformed entries are skipped.
    pub fn parse_inline(source: &str) -> Self {
        let mut decls = Self::new();
        for entry in source.split(';') {
            if let Some((p, v)) = entry.split_once(':') {
                let (p, v) = (p.trim(), v.trim());
                if !p.is_empty() && !v.is_empty() {
                    decls.set(&p.to_ascii_lowercase(), v);
                }
            }
        }
        decls
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Tag, classes, attributes and inline style of one markup element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementData {
    pub tag: String,
    pub classes: SmallVec<[String; 2]>,
    pub attrs: SmallVec<[(String, String); 2]>,
    pub style: Declarations,
    /// Marks the node whose text the property panel's text field edits,
    /// and which the live view makes `contenteditable`.
    pub editable: bool,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: SmallVec::new(),
            attrs: SmallVec::new(),
            style: Declarations::new(),
            editable: false,
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.style.set(property, value);
        self
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A node in a content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentNode {
    Element(ElementData),
    Text(String),
}

impl ContentNode {
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            ContentNode::Element(data) => Some(data),
            ContentNode::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            ContentNode::Element(data) => Some(data),
            ContentNode::Text(_) => None,
        }
    }
}

// ─── Tree ────────────────────────────────────────────────────────────────

/// Owned markup fragment rooted at one element node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTree {
    pub graph: StableDiGraph<ContentNode, ()>,
    pub root: NodeIndex,
}

/// An empty tree with no root. Only exists transiently while decoding
/// records that omit their content.
impl Default for ContentTree {
    fn default() -> Self {
        Self {
            graph: StableDiGraph::new(),
            root: NodeIndex::end(),
        }
    }
}

impl ContentTree {
    pub fn new(root: ElementData) -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(ContentNode::Element(root));
        Self { graph, root }
    }

    /// Append an element child, returning its index.
    pub fn append_element(&mut self, parent: NodeIndex, data: ElementData) -> NodeIndex {
        self.append(parent, ContentNode::Element(data))
    }

    /// Append a text child, returning its index.
    pub fn append_text(&mut self, parent: NodeIndex, text: &str) -> NodeIndex {
        self.append(parent, ContentNode::Text(text.to_string()))
    }

    fn append(&mut self, parent: NodeIndex, node: ContentNode) -> NodeIndex {
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        idx
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&ContentNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut ContentNode> {
        self.graph.node_weight_mut(idx)
    }

    /// Element data of a node, if it is an element.
    pub fn element(&self, idx: NodeIndex) -> Option<&ElementData> {
        self.node(idx).and_then(ContentNode::as_element)
    }

    pub fn element_mut(&mut self, idx: NodeIndex) -> Option<&mut ElementData> {
        self.node_mut(idx).and_then(ContentNode::as_element_mut)
    }

    pub fn root_element(&self) -> Option<&ElementData> {
        self.element(self.root)
    }

    /// Children of a node in insertion order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// All descendants of `idx` in pre-order, excluding `idx` itself.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.children(idx).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, idx: NodeIndex) -> String {
        let mut out = String::new();
        if let Some(ContentNode::Text(t)) = self.node(idx) {
            out.push_str(t);
        }
        for d in self.descendants(idx) {
            if let Some(ContentNode::Text(t)) = self.node(d) {
                out.push_str(t);
            }
        }
        out
    }

    /// The node the text field edits: the first editable element in
    /// pre-order, or the root when none is marked.
    pub fn text_target(&self) -> NodeIndex {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&idx| self.element(idx).is_some_and(|e| e.editable))
            .unwrap_or(self.root)
    }

    /// Replace the direct text of an element node. The first text child
    /// takes the new value and any further text children are emptied, so
    /// element children keep their place. Returns `true` if anything changed.
    pub fn set_text(&mut self, idx: NodeIndex, text: &str) -> bool {
        if self.element(idx).is_none() {
            return false;
        }
        let text_children: Vec<NodeIndex> = self
            .children(idx)
            .into_iter()
            .filter(|&c| matches!(self.node(c), Some(ContentNode::Text(_))))
            .collect();

        let Some((&first, rest)) = text_children.split_first() else {
            self.append_text(idx, text);
            return true;
        };

        let mut changed = false;
        if let Some(ContentNode::Text(t)) = self.node_mut(first)
            && t.as_str() != text
        {
            *t = text.to_string();
            changed = true;
        }
        for &c in rest {
            if let Some(ContentNode::Text(t)) = self.node_mut(c)
                && !t.is_empty()
            {
                t.clear();
                changed = true;
            }
        }
        changed
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ContentTree {
        let mut tree = ContentTree::new(ElementData::new("section").class("pf-hero"));
        let h1 = tree.append_element(tree.root, ElementData::new("h1").editable());
        tree.append_text(h1, "Title");
        let p = tree.append_element(tree.root, ElementData::new("p"));
        tree.append_text(p, "Body ");
        let a = tree.append_element(p, ElementData::new("a"));
        tree.append_text(a, "link");
        tree
    }

    #[test]
    fn descendants_are_preorder() {
        let tree = sample();
        let tags: Vec<String> = tree
            .descendants(tree.root)
            .into_iter()
            .map(|idx| match tree.node(idx).unwrap() {
                ContentNode::Element(e) => e.tag.clone(),
                ContentNode::Text(t) => format!("'{t}'"),
            })
            .collect();
        assert_eq!(tags, vec!["h1", "'Title'", "p", "'Body '", "a", "'link'"]);
    }

    #[test]
    fn text_target_prefers_editable_node() {
        let tree = sample();
        let target = tree.text_target();
        assert_eq!(tree.element(target).unwrap().tag, "h1");
        assert_eq!(tree.text_content(target), "Title");
    }

    #[test]
    fn set_text_keeps_element_children() {
        let mut tree = sample();
        let p = tree.children(tree.root)[1];
        assert!(tree.set_text(p, "New "));
        assert_eq!(tree.text_content(p), "New link");
        assert!(!tree.set_text(p, "New "));
    }

    #[test]
    fn set_text_on_empty_element_appends() {
        let mut tree = ContentTree::new(ElementData::new("div"));
        let root = tree.root;
        assert!(tree.set_text(root, "hello"));
        assert_eq!(tree.text_content(root), "hello");
    }

    #[test]
    fn declarations_replace_in_place() {
        let mut d = Declarations::parse_inline("color: red; padding: 4px;; bogus");
        assert_eq!(d.len(), 2);
        d.set("color", "blue");
        assert_eq!(d.to_inline(), "color: blue; padding: 4px");
        assert_eq!(d.remove("padding").as_deref(), Some("4px"));
        assert_eq!(d.get("padding"), None);
    }
}
