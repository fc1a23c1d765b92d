//! Rendering for Prefab Builder canvases.
//!
//! Everything here is a pure function of the element records: the live
//! editor view, the exported document, computed styles and hit testing all
//! read a `Canvas` and never mutate it.

pub mod export;
pub mod hit;
pub mod html;
pub mod layout;
pub mod project;
pub mod style;

pub use export::{ExportOptions, export_document};
pub use hit::{Hit, HitPart, hit_test};
pub use html::{HtmlElement, HtmlNode};
pub use layout::{auto_height, rendered_height};
pub use project::{project_canvas, project_element, render_live};
pub use style::{ComputedStyle, compute_element, compute_root};
