//! Filter pipeline interface.
//!
//! Filters observe committed events in commit order and may mutate the
//! document while they do. Node ids handed to a callback are valid for that
//! callback; a filter must not hold on to Characters ids across later text,
//! since coalescing may merge them away.

use crate::document::Document;
use crate::dom::NodeId;

/// Observer of parse events. Every callback defaults to a no-op.
pub trait HtmlFilter {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn start_document(&mut self, _doc: &mut Document) {}

    fn end_document(&mut self, _doc: &mut Document) {}

    /// The element was just attached under the current node.
    fn start_element(&mut self, _doc: &mut Document, _element: NodeId) {}

    /// The element was closed; its close style is already recorded.
    fn end_element(&mut self, _doc: &mut Document, _element: NodeId) {}

    /// Text was added. With coalescing on, `node` may be an existing
    /// Characters node that just grew.
    fn characters(&mut self, _doc: &mut Document, _node: NodeId) {}

    fn comment(&mut self, _doc: &mut Document, _node: NodeId) {}

    fn directive(&mut self, _doc: &mut Document, _node: NodeId) {}

    fn cdata(&mut self, _doc: &mut Document, _node: NodeId) {}

    /// The driver called `flush`.
    fn flush(&mut self, _doc: &mut Document) {}
}

/// One filter callback, dispatched to every filter in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Notification {
    StartDocument,
    EndDocument,
    StartElement(NodeId),
    EndElement(NodeId),
    Characters(NodeId),
    Comment(NodeId),
    Directive(NodeId),
    Cdata(NodeId),
    Flush,
}

impl Notification {
    pub(crate) fn deliver(self, filter: &mut dyn HtmlFilter, doc: &mut Document) {
        match self {
            Notification::StartDocument => filter.start_document(doc),
            Notification::EndDocument => filter.end_document(doc),
            Notification::StartElement(id) => filter.start_element(doc, id),
            Notification::EndElement(id) => filter.end_element(doc, id),
            Notification::Characters(id) => filter.characters(doc, id),
            Notification::Comment(id) => filter.comment(doc, id),
            Notification::Directive(id) => filter.directive(doc, id),
            Notification::Cdata(id) => filter.cdata(doc, id),
            Notification::Flush => filter.flush(doc),
        }
    }
}
