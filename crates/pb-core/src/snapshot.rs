//! Serializable form of a whole canvas: the record set plus the ID counter.
//!
//! JSON is the interchange format for hosts and files; MessagePack is used
//! for the in-memory undo history where size matters more than readability.

use crate::error::Result;
use crate::model::{Canvas, CanvasConfig, CanvasElement};
use crate::prefab::template;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    #[serde(default)]
    pub canvas: CanvasConfig,
    /// Elements in document order.
    #[serde(default)]
    pub elements: Vec<CanvasElement>,
    /// Next sequence number the factory will issue.
    #[serde(default)]
    pub next_id: u64,
}

impl CanvasSnapshot {
    pub fn capture(canvas: &Canvas, next_id: u64) -> Self {
        Self {
            canvas: canvas.config,
            elements: canvas.elements().to_vec(),
            next_id,
        }
    }

    /// Rebuild the canvas arena. Records saved without content get a fresh
    /// copy of their prefab template.
    pub fn into_canvas(self) -> Canvas {
        let elements = self
            .elements
            .into_iter()
            .map(|mut element| {
                if element.content.is_empty() {
                    element.content = template(&element.kind);
                }
                element
            })
            .collect();
        Canvas::from_elements(self.canvas, elements)
    }

    /// The counter value that guarantees fresh IDs: the stored counter, or
    /// one past the highest `el_<n>` present if that is larger.
    pub fn safe_next_id(&self) -> u64 {
        let highest = self
            .elements
            .iter()
            .filter_map(|e| e.id.sequence())
            .max()
            .unwrap_or(0);
        self.next_id.max(highest.saturating_add(1))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
