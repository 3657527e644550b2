use serde::{Deserialize, Serialize};

/// Stand-in for an atom in the unit-space text projection. Must stay a
/// one-byte character so byte offsets into [`OuterNode::unit_text`] equal
/// content unit offsets.
pub const ATOM_PLACEHOLDER: char = '\u{1a}';

/// Node tags understood by the engine.
///
/// `Heading` and `Paragraph` can host a nested surface; `Formula` is the
/// atomic node produced by materialization and is opaque to ordinary
/// outer-document editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Paragraph,
    Heading,
    Formula,
}

/// Structural attributes carried by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attrs {
    /// Heading depth, 1..=6. `None` for unleveled nodes.
    pub level: Option<u8>,
}

impl Attrs {
    pub fn leveled(level: u8) -> Self {
        Self { level: Some(level) }
    }
}

/// A materialized atomic node (e.g. an inline formula).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomNode {
    pub kind: NodeKind,
    pub attrs: Attrs,
    pub content: String,
}

/// One run of inline content: plain text or an atomic child node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),
    Atom(AtomNode),
}

impl Inline {
    /// Addressable unit length: text counts bytes, an atom counts as one unit.
    pub fn len(&self) -> usize {
        match self {
            Inline::Text(text) => text.len(),
            Inline::Atom(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable snapshot of an outer-document node.
///
/// The outer document owns the canonical tree; controllers receive fresh
/// snapshots via `update` and never mutate one they were handed. The mutating
/// helpers below exist for hosts applying patches to their own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OuterNode {
    pub kind: NodeKind,
    pub attrs: Attrs,
    pub content: Vec<Inline>,
}

impl OuterNode {
    pub fn heading(level: u8, text: &str) -> Self {
        Self {
            kind: NodeKind::Heading,
            attrs: Attrs::leveled(level),
            content: text_content_vec(text),
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: NodeKind::Paragraph,
            attrs: Attrs::default(),
            content: text_content_vec(text),
        }
    }

    /// Concatenated text of all inline runs, atoms included.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            match item {
                Inline::Text(text) => out.push_str(text),
                Inline::Atom(atom) => out.push_str(&atom.content),
            }
        }
        out
    }

    /// Content projected into unit space: text runs verbatim, each atom as
    /// a single [`ATOM_PLACEHOLDER`]. Byte offsets into the result line up
    /// with [`OuterNode::splice`] ranges, which is what nested surfaces
    /// diff against. Atoms never expose their own bytes here.
    pub fn unit_text(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            match item {
                Inline::Text(text) => out.push_str(text),
                Inline::Atom(_) => out.push(ATOM_PLACEHOLDER),
            }
        }
        out
    }

    /// Length of the content in addressable units.
    pub fn content_len(&self) -> usize {
        self.content.iter().map(Inline::len).sum()
    }

    /// Total addressable span, including the two boundary tokens of the
    /// node's own container markup.
    pub fn size(&self) -> usize {
        self.content_len() + 2
    }

    /// Structural identity: same tag and same attributes, content ignored.
    pub fn same_markup(&self, other: &OuterNode) -> bool {
        self.kind == other.kind && self.attrs == other.attrs
    }

    /// Replace a unit span of content with plain text.
    pub fn replace_text(&mut self, range: std::ops::Range<usize>, text: &str) {
        let replacement = if text.is_empty() {
            Vec::new()
        } else {
            vec![Inline::Text(text.to_string())]
        };
        self.splice(range, replacement);
    }

    /// Replace a unit span of content with a newly materialized atom.
    pub fn replace_span_with_atom(&mut self, range: std::ops::Range<usize>, atom: AtomNode) {
        self.splice(range, vec![Inline::Atom(atom)]);
    }

    /// Splice `replacement` over the unit range. Text runs are split at the
    /// range edges; an atom overlapped by the range is removed whole.
    pub fn splice(&mut self, range: std::ops::Range<usize>, replacement: Vec<Inline>) {
        let mut head: Vec<Inline> = Vec::new();
        let mut tail: Vec<Inline> = Vec::new();
        let mut pos = 0;

        for item in self.content.drain(..) {
            let len = item.len();
            let end = pos + len;
            match item {
                Inline::Text(text) => {
                    let cut_a = range.start.clamp(pos, end) - pos;
                    let cut_b = range.end.clamp(pos, end) - pos;
                    if cut_a > 0 {
                        head.push(Inline::Text(text[..cut_a].to_string()));
                    }
                    if cut_b < len {
                        tail.push(Inline::Text(text[cut_b..].to_string()));
                    }
                }
                atom @ Inline::Atom(_) => {
                    if end <= range.start {
                        head.push(atom);
                    } else if pos >= range.end {
                        tail.push(atom);
                    }
                    // otherwise the atom sits inside the range and is dropped
                }
            }
            pos = end;
        }

        head.extend(replacement);
        head.extend(tail);
        self.content = normalize(head);
    }
}

fn text_content_vec(text: &str) -> Vec<Inline> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Inline::Text(text.to_string())]
    }
}

/// Merge adjacent text runs and drop empty ones.
fn normalize(items: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    for item in items {
        match item {
            Inline::Text(text) if text.is_empty() => {}
            Inline::Text(text) => {
                if let Some(Inline::Text(prev)) = out.last_mut() {
                    prev.push_str(&text);
                } else {
                    out.push(Inline::Text(text));
                }
            }
            atom => out.push(atom),
        }
    }
    out
}
