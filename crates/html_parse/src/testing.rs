//! White-box access to parser internals for tests.
//!
//! Compiled for unit tests and behind the `test-harness` feature. Nothing here
//! is needed to drive a parse; these hooks bypass the scanner, the cursor
//! discipline or the tree validation on purpose.

use crate::dom::NodeId;
use crate::error::TreeError;
use crate::event::Event;
use crate::parse::HtmlParse;

/// Privileged operations on an [`HtmlParse`] session.
pub struct TestingPeer;

impl TestingPeer {
    /// Rewrite only the parent back-reference of `node`.
    ///
    /// Child sequences are not touched, so a mismatched call leaves the tree
    /// inconsistent; `Dom::check_invariants` reports it.
    pub fn set_node_parent(parser: &mut HtmlParse, node: NodeId, parent: Option<NodeId>) {
        parser.document_mut().dom_mut().set_parent(node, parent);
    }

    /// Inject a synthetic event as if the scanner had produced it.
    pub fn add_event(parser: &mut HtmlParse, event: Event) {
        parser.emit(event);
    }

    /// Force the cursor to `node` (an element or the root).
    pub fn set_current(parser: &mut HtmlParse, node: NodeId) -> Result<(), TreeError> {
        parser.set_current(node)
    }

    pub fn set_coalesce_characters(parser: &mut HtmlParse, on: bool) {
        parser.set_coalesce_characters(on);
    }

    pub fn symbol_table_size(parser: &HtmlParse) -> usize {
        parser.symbol_table_size()
    }

    pub fn set_buffer_events(parser: &mut HtmlParse, on: bool) {
        parser.set_buffer_events(on);
    }
}
