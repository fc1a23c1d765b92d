pub mod content;
pub mod css;
pub mod error;
pub mod id;
pub mod model;
pub mod prefab;
pub mod snapshot;

pub use content::{ContentNode, ContentTree, Declarations, ElementData};
pub use error::{Error, Result};
pub use id::ElementId;
pub use model::*;
pub use prefab::ElementFactory;
pub use snapshot::CanvasSnapshot;

// Re-export geometry and graph types so downstream crates don't need a direct dependency
pub use kurbo::{Point, Rect, Size, Vec2};
pub use petgraph::graph::NodeIndex;
