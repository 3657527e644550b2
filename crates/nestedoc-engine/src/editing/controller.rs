//! Per-node controller mediating between one outer node and its inner
//! editable surface.
//!
//! One controller is created per rendered node instance and destroyed when
//! the node leaves the outer document. All inner edits funnel through a
//! single synchronization function tagged with [`EditSource`]. `Local`
//! edits are diffed against the cached node and pushed outward through the
//! [`OuterAccessor`]; `Propagated` edits stop at the inner buffer and are
//! never pushed back out.
//!
//! The canonical outer content is unprefixed and the stored `level`
//! attribute is the source of truth. The marker prefix exists only inside
//! the inner surface, injected on focus and stripped on blur. Blur is the
//! sole path by which typed marker edits become structural changes.
//!
//! The inner surface holds the node's unit-space text: an atom appears as
//! one placeholder byte, so diff windows over surface text are valid unit
//! spans of the outer node's content and atoms stay opaque to inner edits.

use std::ops::Range;

use anyhow::Context;

use crate::editing::diff;
use crate::editing::mapping;
use crate::editing::markers;
use crate::editing::surface::{Cmd, Surface, SurfaceId};
use crate::error::EngineError;
use crate::model::{NodeKind, OuterNode};

/// Loop-prevention tag carried by every patch crossing the outer/inner
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSource {
    /// Originated in the inner surface; must be propagated outward.
    Local,
    /// Came from the other side; must not be re-propagated.
    Propagated,
}

/// The narrow channel through which a controller patches the outer
/// document. Each controller only ever issues patches scoped to its own
/// node's span; the outer document serializes them.
pub trait OuterAccessor {
    /// Replace a content span, in outer-document unit coordinates.
    fn replace_text(&mut self, range: Range<usize>, text: &str);
    /// Update the level attribute of the node at `pos` in place.
    fn set_level(&mut self, pos: usize, level: u8);
    /// Convert the node at `pos` to the default unleveled type.
    fn convert_to_paragraph(&mut self, pos: usize);
    /// Remove the node at `pos` from the outer document entirely.
    fn delete_node(&mut self, pos: usize);
}

/// An input event as seen by the outer document's event routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceEvent {
    pub surface: SurfaceId,
}

/// Resolves the node's current position in the outer document. The position
/// shifts as sibling content changes, so it is queried per patch rather
/// than cached.
pub type GetPos = Box<dyn Fn() -> usize>;

pub struct SurfaceController {
    /// Last-known outer node snapshot
    node: OuterNode,
    /// The inner editable surface, exclusively owned
    surface: Surface,
    get_pos: GetPos,
    editing: bool,
    /// Pending click correction, armed when the marker prefix is injected
    /// and consumed exactly once
    cursor_offset: usize,
    /// Presentational classification of the surface content
    display_level: Option<usize>,
    destroyed: bool,
}

impl SurfaceController {
    /// Build a controller and its inner surface from a node snapshot.
    pub fn new(node: OuterNode, get_pos: GetPos) -> anyhow::Result<Self> {
        match node.kind {
            NodeKind::Heading | NodeKind::Paragraph => {}
            kind => {
                return Err(EngineError::UnsupportedNode { kind })
                    .context("creating nested surface controller");
            }
        }
        let surface = Surface::new(&node.unit_text());
        let display_level = node.attrs.level.map(usize::from);
        Ok(Self {
            node,
            surface,
            get_pos,
            editing: false,
            cursor_offset: 0,
            display_level,
            destroyed: false,
        })
    }

    pub fn node(&self) -> &OuterNode {
        &self.node
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface.id()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Current text of the inner surface (prefixed while editing).
    pub fn inner_text(&self) -> String {
        self.surface.text()
    }

    /// Presentational level classification, kept in step with the typed
    /// marker run while editing.
    pub fn display_level(&self) -> Option<usize> {
        self.display_level
    }

    /// Accept a fresh node snapshot from the outer document.
    ///
    /// Returns `false` when the update cannot be handled in place (a
    /// structural identity change while idle, or a torn-down controller),
    /// signaling the outer system to replace the controller instead.
    pub fn update(&mut self, node: OuterNode) -> bool {
        if self.destroyed {
            return false;
        }
        if !self.editing && !node.same_markup(&self.node) {
            return false;
        }

        let projected = self.project(&node);
        self.node = node;

        let current = self.surface.text();
        let window = diff::diff(&current, &projected);
        if !window.is_empty() {
            let cmd = Cmd::ReplaceRange {
                range: window.start..window.end_a,
                text: projected[window.start..window.end_b].to_string(),
            };
            if self.sync(cmd, EditSource::Propagated, None).is_err() {
                return false;
            }
        }
        self.render();
        true
    }

    /// Apply a user edit to the inner surface and propagate the change
    /// outward.
    pub fn edit(&mut self, cmd: Cmd, outer: &mut dyn OuterAccessor) -> Result<(), EngineError> {
        self.sync(cmd, EditSource::Local, Some(outer))
    }

    /// Focus transition `Idle -> Editing`: inject the marker prefix into the
    /// inner surface and arm the click correction.
    pub fn focus(&mut self) -> Result<(), EngineError> {
        if self.destroyed {
            return Err(EngineError::SurfaceReleased);
        }
        self.editing = true;
        if let Some(level) = self.node.attrs.level {
            let level = usize::from(level);
            self.cursor_offset = level + 1;
            self.sync(
                Cmd::InsertText {
                    at: 0,
                    text: markers::marker_prefix(level),
                },
                EditSource::Propagated,
                None,
            )?;
        }
        self.render();
        Ok(())
    }

    /// Blur transition `Editing -> Idle`.
    ///
    /// The sole path by which typed marker edits become structural changes:
    /// a vanished marker run converts the node to a paragraph, a changed
    /// run updates the level attribute. The prefix is then stripped so the
    /// idle surface mirrors the canonical, unprefixed content.
    pub fn blur(&mut self, outer: &mut dyn OuterAccessor) -> Result<(), EngineError> {
        if self.destroyed {
            return Err(EngineError::SurfaceReleased);
        }
        self.editing = false;

        let text = self.surface.text();
        let inferred = markers::infer_level(&text, true);
        let stored = self.node.attrs.level.map(usize::from);
        if inferred != stored {
            let pos = (self.get_pos)();
            match inferred {
                None => outer.convert_to_paragraph(pos),
                Some(level) => outer.set_level(pos, level as u8),
            }
        }

        if let Some(run) = markers::infer_level(&text, false) {
            let ws = text[run..].chars().next().map_or(0, char::len_utf8);
            self.sync(
                Cmd::DeleteRange { range: 0..run + ws },
                EditSource::Propagated,
                None,
            )?;
        }

        self.cursor_offset = 0;
        self.render();
        Ok(())
    }

    /// Resolve a click position inside the inner surface, applying and
    /// consuming the pending cursor correction. Returns the resolved caret
    /// when a correction was pending.
    pub fn handle_click(&mut self, pos: usize) -> Option<usize> {
        if self.destroyed || self.cursor_offset == 0 {
            return None;
        }
        let text = self.surface.text();
        let at = mapping::resolve_click(&text, pos, self.cursor_offset);
        self.cursor_offset = 0;
        self.surface.set_selection(at..at);
        Some(at)
    }

    /// Backspace pressed inside the inner surface.
    ///
    /// Consumes the press only when the caret selection is empty and the
    /// node has no content left: the node itself is then deleted from the
    /// outer document and the editing session ends. In every other state
    /// the surface keeps its default key handling and `false` is returned.
    pub fn backspace(&mut self, outer: &mut dyn OuterAccessor) -> Result<bool, EngineError> {
        if self.destroyed {
            return Err(EngineError::SurfaceReleased);
        }
        if !self.surface.selection().is_empty() {
            return Ok(false);
        }
        if self.node.content_len() > 0 {
            return Ok(false);
        }
        outer.delete_node((self.get_pos)());
        self.editing = false;
        self.cursor_offset = 0;
        Ok(true)
    }

    /// Select-all inside the inner surface, bounded to the surface's own
    /// text rather than the whole outer document. Returns the selection it
    /// installed.
    pub fn select_all(&mut self) -> Result<Range<usize>, EngineError> {
        if self.destroyed {
            return Err(EngineError::SurfaceReleased);
        }
        let all = 0..self.surface.len();
        self.surface.set_selection(all.clone());
        Ok(all)
    }

    /// Tear down the controller: release the inner surface and clear the
    /// rendered classification. Terminal; no further patches are accepted
    /// from either direction.
    pub fn destroy(&mut self) {
        self.surface.release();
        self.display_level = None;
        self.editing = false;
        self.cursor_offset = 0;
        self.destroyed = true;
    }

    /// True iff the event originated inside the owned inner surface and the
    /// outer document should leave it alone.
    pub fn stop_event(&self, event: &SurfaceEvent) -> bool {
        !self.destroyed && event.surface == self.surface.id()
    }

    /// The controller manages its own rendered output; the outer document
    /// must not attempt to reconcile it.
    pub fn ignore_mutation(&self) -> bool {
        true
    }

    /// The inner projection of an outer node: the canonical (unprefixed)
    /// unit-space text, behind whatever marker run currently sits in the
    /// surface.
    ///
    /// The typed run is preserved rather than re-derived from the stored
    /// attribute: mid-edit the two legitimately disagree, and the attribute
    /// only catches up on blur.
    fn project(&self, node: &OuterNode) -> String {
        let text = node.unit_text();
        if self.editing {
            let current = self.surface.text();
            if let Some(run) = markers::infer_level(&current, false) {
                let ws = current[run..].chars().next().map_or(0, char::len_utf8);
                let mut projected = current[..run + ws].to_string();
                projected.push_str(&text);
                return projected;
            }
        }
        text
    }

    /// The single synchronization function every boundary-crossing patch
    /// goes through.
    fn sync(
        &mut self,
        cmd: Cmd,
        source: EditSource,
        outer: Option<&mut dyn OuterAccessor>,
    ) -> Result<(), EngineError> {
        if self.destroyed {
            return Err(EngineError::SurfaceReleased);
        }

        let prev_text = self.surface.text();
        self.surface.apply(&cmd)?;

        let (EditSource::Local, Some(outer)) = (source, outer) else {
            return Ok(());
        };

        let new_text = self.surface.text();
        let prev_level = markers::infer_level(&prev_text, true);
        let level = markers::infer_level(&new_text, true);

        // Strip the (arbitrary-length) typed prefix before comparing with
        // the canonical, unprefixed node content. Both sides are unit-space
        // text, so the window is a valid content span of the node.
        let stripped = markers::strip_markers(&new_text);
        let outer_text = self.node.unit_text();
        let window = diff::diff(&outer_text, stripped);
        if !window.is_empty() {
            let base = (self.get_pos)();
            let range = mapping::map_inner_to_outer(window.start..window.end_a, base);
            outer.replace_text(range, &stripped[window.start..window.end_b]);
        }

        if level != prev_level {
            self.display_level = level;
        }
        Ok(())
    }

    fn render(&mut self) {
        self.display_level = markers::infer_level(&self.surface.text(), true)
            .or_else(|| self.node.attrs.level.map(usize::from));
    }
}
