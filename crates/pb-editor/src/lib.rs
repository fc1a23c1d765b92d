//! Editor engine for Prefab Builder.
//!
//! An [`EditorSession`] owns the document, the selection, gesture state and
//! history. Hosts (the WASM bridge, the CLI, tests) feed it pointer, key and
//! panel events and read back the live view, panel values or an export.

pub mod commands;
pub mod document;
pub mod gesture;
pub mod input;
pub mod panel;
pub mod session;
pub mod shortcuts;

pub use commands::CommandStack;
pub use document::{CanvasDocument, EditorMutation};
pub use input::InputEvent;
pub use panel::{PanelField, PanelValues};
pub use session::EditorSession;
pub use shortcuts::{ShortcutAction, ShortcutMap};
