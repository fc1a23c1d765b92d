//! Undo/Redo command stack.
//!
//! Discrete edits (place, delete, panel writes, z-order) are pushed as a
//! forward mutation plus its inverse. Gestures use **snapshot batching**:
//! the encoded document is captured when the gesture starts and when it
//! ends, so undo/redo restores the whole pre- or post-gesture state in a
//! single step however many moves happened in between.

use crate::document::{CanvasDocument, EditorMutation};

/// Maximum number of undo steps kept by default.
pub const DEFAULT_HISTORY_DEPTH: usize = 200;

#[derive(Debug, Clone)]
pub enum Command {
    /// Single mutation with its inverse.
    Single {
        forward: Box<EditorMutation>,
        inverse: Box<EditorMutation>,
        description: String,
    },
    /// Encoded document before and after a batch.
    Snapshot {
        before: Vec<u8>,
        after: Vec<u8>,
        description: String,
    },
}

/// Undo/redo stacks with batch grouping for gestures.
#[derive(Debug)]
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Encoded document captured when the outermost batch began.
    batch_snapshot: Option<Vec<u8>>,
    /// Whether any mutation changed the document during the current batch.
    batch_dirty: bool,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    /// Start a batch group. Mutations until the matching `end_batch` are
    /// applied live and recorded as one undo step.
    pub fn begin_batch(&mut self, doc: &CanvasDocument) {
        if self.batch_depth == 0 {
            self.batch_snapshot = match doc.encode() {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    log::warn!("history snapshot failed, gesture will not be undoable: {e}");
                    None
                }
            };
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and the document
    /// changed, one snapshot command is pushed.
    pub fn end_batch(&mut self, doc: &CanvasDocument, description: &str) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let before = self.batch_snapshot.take();
        if self.batch_dirty
            && let Some(before) = before
        {
            match doc.encode() {
                Ok(after) if after != before => {
                    self.push(Command::Snapshot {
                        before,
                        after,
                        description: description.to_string(),
                    });
                }
                Ok(_) => {}
                Err(e) => log::warn!("history snapshot failed: {e}"),
            }
        }
        self.batch_dirty = false;
    }

    /// Abandon every open batch, putting the document back to how it was
    /// when the outermost batch began. Nothing is recorded.
    pub fn cancel_batch(&mut self, doc: &mut CanvasDocument) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth = 0;
        if let Some(before) = self.batch_snapshot.take()
            && self.batch_dirty
            && let Err(e) = doc.restore(&before)
        {
            log::warn!("could not roll back cancelled gesture: {e}");
        }
        self.batch_dirty = false;
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Apply a mutation and record it. Returns `true` if the document
    /// changed; no-op mutations leave history untouched.
    pub fn execute(
        &mut self,
        doc: &mut CanvasDocument,
        mutation: EditorMutation,
        description: &str,
    ) -> bool {
        if self.batch_depth > 0 {
            let changed = doc.apply_mutation(mutation);
            self.batch_dirty |= changed;
            return changed;
        }

        let inverse = compute_inverse(doc, &mutation);
        if !doc.apply_mutation(mutation.clone()) {
            return false;
        }
        self.push(Command::Single {
            forward: Box::new(mutation),
            inverse: Box::new(inverse),
            description: description.to_string(),
        });
        true
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Undo the last command. Returns its description.
    pub fn undo(&mut self, doc: &mut CanvasDocument) -> Option<String> {
        if self.batch_depth > 0 {
            return None;
        }
        let cmd = self.undo_stack.pop()?;
        let desc = match &cmd {
            Command::Single {
                inverse,
                description,
                ..
            } => {
                doc.apply_mutation(*inverse.clone());
                description.clone()
            }
            Command::Snapshot {
                before,
                description,
                ..
            } => {
                if let Err(e) = doc.restore(before) {
                    log::warn!("undo failed to decode snapshot: {e}");
                }
                description.clone()
            }
        };
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(&mut self, doc: &mut CanvasDocument) -> Option<String> {
        if self.batch_depth > 0 {
            return None;
        }
        let cmd = self.redo_stack.pop()?;
        let desc = match &cmd {
            Command::Single {
                forward,
                description,
                ..
            } => {
                doc.apply_mutation(*forward.clone());
                description.clone()
            }
            Command::Snapshot {
                after, description, ..
            } => {
                if let Err(e) = doc.restore(after) {
                    log::warn!("redo failed to decode snapshot: {e}");
                }
                description.clone()
            }
        };
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop all history (e.g. after loading a different document).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
        self.batch_dirty = false;
    }
}

/// Compute the mutation that undoes `mutation` against the current state.
fn compute_inverse(doc: &CanvasDocument, mutation: &EditorMutation) -> EditorMutation {
    let canvas = &doc.canvas;
    match mutation {
        EditorMutation::Insert { element, .. } => EditorMutation::Remove { id: element.id },
        EditorMutation::Remove { id } => match canvas.get(*id) {
            Some(el) => EditorMutation::Insert {
                element: Box::new(el.clone()),
                index: canvas.index_of(*id),
            },
            None => EditorMutation::Remove { id: *id },
        },
        EditorMutation::MoveTo { id, position } => EditorMutation::MoveTo {
            id: *id,
            position: canvas.get(*id).map_or(*position, |el| el.position),
        },
        EditorMutation::ResizeTo { id, width, height } => {
            let (width, height) = canvas
                .get(*id)
                .map_or((*width, *height), |el| (el.width, el.height));
            EditorMutation::ResizeTo {
                id: *id,
                width,
                height,
            }
        }
        EditorMutation::SetZIndex { id, z_index } => EditorMutation::SetZIndex {
            id: *id,
            z_index: canvas.get(*id).map_or(*z_index, |el| el.z_index),
        },
        EditorMutation::SetOverrides { id, overrides } => EditorMutation::SetOverrides {
            id: *id,
            overrides: canvas
                .get(*id)
                .map_or_else(|| overrides.clone(), |el| el.overrides.clone()),
        },
        EditorMutation::SetText { id, text } => EditorMutation::SetText {
            id: *id,
            text: doc.text_of(*id).unwrap_or_else(|| text.clone()),
        },
        EditorMutation::ReplaceAll { .. } => EditorMutation::ReplaceAll {
            elements: canvas.elements().to_vec(),
        },
    }
}
