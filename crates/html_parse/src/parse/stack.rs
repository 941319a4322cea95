//! Cursor stack of open elements.

use crate::dom::NodeId;
use crate::symbol::Symbol;

/// Entry in the cursor stack: the element and its interned tag name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct OpenElement {
    pub(crate) node: NodeId,
    pub(crate) name: Symbol,
}

impl OpenElement {
    pub(crate) fn new(node: NodeId, name: Symbol) -> Self {
        Self { node, name }
    }
}

/// Stack of open elements; the top is the current node.
///
/// The document root is implicit and never stored.
#[derive(Clone, Debug, Default)]
pub(crate) struct CursorStack {
    items: Vec<OpenElement>,
    max_depth: u32,
}

impl CursorStack {
    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn push(&mut self, entry: OpenElement) {
        self.items.push(entry);
        self.max_depth = self.max_depth.max(self.items.len() as u32);
    }

    pub(crate) fn current(&self) -> Option<OpenElement> {
        self.items.last().copied()
    }

    pub(crate) fn pop(&mut self) -> Option<OpenElement> {
        self.items.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub(crate) fn iter_nodes(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.items.iter().map(|entry| entry.node)
    }

    /// Index of the innermost open element named `name`.
    pub(crate) fn position_of(&self, name: Symbol) -> Option<usize> {
        self.items.iter().rposition(|entry| entry.name == name)
    }

    /// Pop everything above `index`, innermost first, leaving `index` on top.
    pub(crate) fn pop_above(&mut self, index: usize) -> impl Iterator<Item = OpenElement> + '_ {
        let keep = (index + 1).min(self.items.len());
        self.items.drain(keep..).rev()
    }
}
