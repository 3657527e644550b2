//! The inner editable surface.
//!
//! A `Surface` is a self-contained editable document bound to the projected
//! content of a single outer node. It is owned exclusively by its controller:
//! it holds the text in an `xi_rope::Rope` buffer, applies edits as commands
//! compiled to deltas, and tracks selection and a version counter. `release`
//! is terminal; a released surface refuses all further patches.

use std::ops::Range;
use uuid::Uuid;
use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::error::EngineError;

/// Unique identifier for a surface, used to route events back to the
/// controller that owns it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Edits that can be applied to a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    ReplaceRange { range: Range<usize>, text: String },
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub changed: Vec<Range<usize>>,
    pub new_selection: Range<usize>,
    pub version: u64,
}

pub struct Surface {
    id: SurfaceId,
    /// Rope buffer holding the projected content as UTF-8 bytes
    buffer: Rope,
    /// Current selection as byte offsets in the buffer
    selection: Range<usize>,
    /// Incremented on each applied edit
    version: u64,
    released: bool,
}

impl Surface {
    pub fn new(text: &str) -> Self {
        let buffer = Rope::from(text);
        let len = buffer.len();
        Self {
            id: SurfaceId::new(),
            buffer,
            selection: len..len,
            version: 0,
            released: false,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn set_selection(&mut self, selection: Range<usize>) {
        self.selection = selection;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Mark the surface as torn down. Terminal: every subsequent `apply`
    /// fails with [`EngineError::SurfaceReleased`].
    pub fn release(&mut self) {
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Apply a command to the surface.
    ///
    /// The command is validated, compiled to a delta, applied to the buffer,
    /// and the selection is transformed through the edit. Returns a `Patch`
    /// with the changed ranges in post-edit coordinates.
    pub fn apply(&mut self, cmd: &Cmd) -> Result<Patch, EngineError> {
        if self.released {
            return Err(EngineError::SurfaceReleased);
        }
        self.validate(cmd)?;

        let delta = self.compile_command(cmd);

        // Extract changed ranges from the delta elements
        let mut changed = Vec::new();
        let mut cursor = 0;
        for op in delta.els.iter() {
            match op {
                xi_rope::delta::DeltaElement::Copy(_from, to) => {
                    cursor = *to;
                }
                xi_rope::delta::DeltaElement::Insert(inserted) => {
                    let start = cursor;
                    let end = cursor + inserted.len();
                    changed.push(start..end);
                    cursor = end;
                }
            }
        }

        self.buffer = delta.apply(&self.buffer);

        let new_selection = transform_selection(&self.selection, cmd);
        self.selection = new_selection.clone();
        self.version += 1;

        Ok(Patch {
            changed,
            new_selection,
            version: self.version,
        })
    }

    fn compile_command(&self, cmd: &Cmd) -> Delta<RopeInfo> {
        let mut builder = Builder::new(self.len());
        match cmd {
            Cmd::InsertText { at, text } => {
                builder.replace(*at..*at, Rope::from(text));
            }
            Cmd::DeleteRange { range } => {
                builder.delete(range.clone());
            }
            Cmd::ReplaceRange { range, text } => {
                builder.replace(range.clone(), Rope::from(text));
            }
        }
        builder.build()
    }

    fn validate(&self, cmd: &Cmd) -> Result<(), EngineError> {
        let (start, end) = match cmd {
            Cmd::InsertText { at, .. } => (*at, *at),
            Cmd::DeleteRange { range } | Cmd::ReplaceRange { range, .. } => {
                (range.start, range.end)
            }
        };
        let len = self.len();
        let text = self.text();
        let aligned = |at: usize| at <= len && text.is_char_boundary(at);
        if start > end || !aligned(start) || !aligned(end) {
            return Err(EngineError::RangeOutOfBounds { start, end, len });
        }
        Ok(())
    }
}

/// Transform a selection range through a command.
fn transform_selection(range: &Range<usize>, cmd: &Cmd) -> Range<usize> {
    match cmd {
        Cmd::InsertText { at, text } => {
            let text_len = text.len();
            if *at <= range.start {
                // Insertion before the selection shifts it right
                (range.start + text_len)..(range.end + text_len)
            } else if *at < range.end {
                // Insertion inside the selection grows the end
                range.start..(range.end + text_len)
            } else {
                range.clone()
            }
        }
        Cmd::DeleteRange { range: del } => {
            let del_len = del.len();
            if del.end <= range.start {
                (range.start - del_len)..(range.end - del_len)
            } else if del.start >= range.end {
                range.clone()
            } else {
                // Deletion overlaps the selection; collapse to the deletion point
                del.start..del.start
            }
        }
        Cmd::ReplaceRange { range: rep, text } => {
            let del_len = rep.len();
            let insert_len = text.len();
            if rep.end <= range.start {
                // Replacement before the selection shifts it by the net change
                if insert_len >= del_len {
                    let delta = insert_len - del_len;
                    (range.start + delta)..(range.end + delta)
                } else {
                    let delta = del_len - insert_len;
                    (range.start.saturating_sub(delta))..(range.end.saturating_sub(delta))
                }
            } else if rep.start >= range.end {
                range.clone()
            } else {
                // Replacement overlaps the selection; collapse after the new text
                let at = rep.start + insert_len;
                at..at
            }
        }
    }
}
