//! Arena-backed node graph.
//!
//! Invariants:
//! - Ownership lives only in `children`; `parent` is a non-owning back-reference.
//! - Every attached node appears exactly once in its parent's `children`.
//! - No node is its own ancestor.
//! - Only `Document` and `Element` nodes have children.
//! - Removed nodes keep their arena slot as a tombstone, so a stale `NodeId` is
//!   detected instead of aliasing a newer node.

use crate::error::{InvalidTreeReason, TreeError};
use crate::symbol::Symbol;

/// Arena index of a node within one [`Dom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The document root. Always present, never removable.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Characters,
    Comment,
    Directive,
    Cdata,
}

impl NodeKind {
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::Element)
    }
}

/// Quoting used for an attribute value in the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuoteStyle {
    /// Unquoted value, or no value at all.
    #[default]
    None,
    Single,
    Double,
}

/// Element attribute. Order and duplicates are preserved as written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: Symbol,
    pub value: Option<String>,
    pub quote: QuoteStyle,
}

impl Attribute {
    pub fn new(name: Symbol, value: Option<String>) -> Self {
        let quote = if value.is_some() {
            QuoteStyle::Double
        } else {
            QuoteStyle::None
        };
        Self { name, value, quote }
    }
}

/// How an element was (or was not yet) closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CloseStyle {
    /// Still open, or never closed.
    #[default]
    Unclosed,
    /// Closed by a matching close tag.
    Explicit,
    /// Written as `<tag/>`.
    Brief,
    /// Void element such as `<br>`; has no close tag.
    Void,
    /// Close tag legitimately omitted; closed by a following open tag.
    Implicit,
    /// Closed by recovery: a mismatched close tag or end of document.
    AutoClose,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    pub name: Symbol,
    pub attributes: Vec<Attribute>,
    pub close_style: CloseStyle,
}

impl ElementData {
    pub fn new(name: Symbol, attributes: Vec<Attribute>) -> Self {
        Self {
            name,
            attributes,
            close_style: CloseStyle::Unclosed,
        }
    }

    /// First attribute named `name`.
    pub fn attribute(&self, name: Symbol) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn attribute_value(&self, name: Symbol) -> Option<&str> {
        self.attribute(name).and_then(|attr| attr.value.as_deref())
    }

    /// Replace the value of the first `name` attribute, or append a new one.
    pub fn set_attribute(&mut self, name: Symbol, value: Option<String>) {
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => {
                if value.is_some() && attr.quote == QuoteStyle::None {
                    attr.quote = QuoteStyle::Double;
                }
                attr.value = value;
            }
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Remove every attribute named `name`; returns whether any was present.
    pub fn remove_attribute(&mut self, name: Symbol) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|attr| attr.name != name);
        self.attributes.len() != before
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Characters(String),
    Comment(String),
    Directive(String),
    Cdata(String),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document => NodeKind::Document,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Characters(_) => NodeKind::Characters,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Directive(_) => NodeKind::Directive,
            NodeData::Cdata(_) => NodeKind::Cdata,
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            NodeData::Characters(text)
            | NodeData::Comment(text)
            | NodeData::Directive(text)
            | NodeData::Cdata(text) => Some(text),
            NodeData::Document | NodeData::Element(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
    line: u32,
    live: bool,
}

impl Node {
    fn new(data: NodeData, line: u32) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
            line,
            live: true,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Source line the node was created from (0 for synthesized nodes).
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text payload of a leaf node.
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Characters(text)
            | NodeData::Comment(text)
            | NodeData::Directive(text)
            | NodeData::Cdata(text) => Some(text),
            NodeData::Document | NodeData::Element(_) => None,
        }
    }
}

/// Node graph for one document.
#[derive(Debug)]
pub struct Dom {
    nodes: Vec<Node>,
    live: usize,
}

impl Dom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document, 0)],
            live: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of live nodes, including the root and detached subtrees.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Never true: the root is always live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Allocate an unattached node.
    pub fn create_node(&mut self, data: NodeData, line: u32) -> NodeId {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data, line));
        self.live += 1;
        id
    }

    pub fn create_element(&mut self, name: Symbol, attributes: Vec<Attribute>, line: u32) -> NodeId {
        self.create_node(NodeData::Element(ElementData::new(name, attributes)), line)
    }

    pub fn create_characters(&mut self, text: impl Into<String>, line: u32) -> NodeId {
        self.create_node(NodeData::Characters(text.into()), line)
    }

    pub fn create_comment(&mut self, text: impl Into<String>, line: u32) -> NodeId {
        self.create_node(NodeData::Comment(text.into()), line)
    }

    pub fn create_directive(&mut self, text: impl Into<String>, line: u32) -> NodeId {
        self.create_node(NodeData::Directive(text.into()), line)
    }

    pub fn create_cdata(&mut self, text: impl Into<String>, line: u32) -> NodeId {
        self.create_node(NodeData::Cdata(text.into()), line)
    }

    /// Live node lookup; `None` for unknown or removed ids.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).filter(|node| node.live)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(Node::kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|&sibling| sibling == id)?;
        siblings.get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|&sibling| sibling == id)?;
        index.checked_sub(1).map(|prev| siblings[prev])
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.live_mut(id).ok()?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::text)
    }

    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        self.live_mut(id).ok()?.data.text_mut()
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        // A corrupted graph may contain a parent cycle; never walk more links
        // than there are nodes.
        let mut budget = self.nodes.len();
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if budget == 0 {
                return false;
            }
            budget -= 1;
            current = self.parent(id);
        }
        false
    }

    /// Attach `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.validate_attach(parent, child)?;
        self.set_parent(child, Some(parent));
        self.nodes[parent.0 as usize].children.push(child);
        Ok(())
    }

    /// Attach `child` immediately before `reference`, a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), TreeError> {
        self.validate_attach(parent, child)?;
        let index = self.child_index(parent, reference)?;
        self.set_parent(child, Some(parent));
        self.nodes[parent.0 as usize].children.insert(index, child);
        Ok(())
    }

    /// Attach `child` immediately after `reference`, under the same parent.
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> Result<(), TreeError> {
        let parent = self
            .live(reference)?
            .parent
            .ok_or(TreeError::invalid(reference, InvalidTreeReason::NotAChild))?;
        self.validate_attach(parent, child)?;
        let index = self.child_index(parent, reference)?;
        self.set_parent(child, Some(parent));
        self.nodes[parent.0 as usize].children.insert(index + 1, child);
        Ok(())
    }

    /// Detach the subtree rooted at `child` and hand it back to the caller.
    ///
    /// The subtree stays live and parentless; it can be re-attached elsewhere.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, TreeError> {
        self.live(parent)?;
        self.live(child)?;
        if child == NodeId::ROOT {
            return Err(TreeError::invalid(child, InvalidTreeReason::RootNotMovable));
        }
        let index = self.child_index(parent, child)?;
        self.nodes[parent.0 as usize].children.remove(index);
        self.set_parent(child, None);
        Ok(child)
    }

    /// Detach `node` from its parent, if it has one.
    pub fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        match self.live(node)?.parent {
            Some(parent) => self.remove_child(parent, node).map(|_| ()),
            None if node == NodeId::ROOT => {
                Err(TreeError::invalid(node, InvalidTreeReason::RootNotMovable))
            }
            None => Ok(()),
        }
    }

    /// Detach and destroy the subtree rooted at `node`.
    ///
    /// Every id in the subtree becomes stale.
    pub fn delete_node(&mut self, node: NodeId) -> Result<(), TreeError> {
        self.detach(node)?;
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let slot = &mut self.nodes[id.0 as usize];
            stack.extend(slot.children.drain(..));
            self.tombstone(id);
        }
        Ok(())
    }

    /// Move `node` (with its subtree) to the end of `new_parent`'s children.
    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), TreeError> {
        self.live(new_parent)?;
        if node == new_parent || self.is_ancestor(node, new_parent) {
            return Err(TreeError::invalid(node, InvalidTreeReason::Cycle));
        }
        self.detach(node)?;
        self.append_child(new_parent, node)
    }

    /// Merge every run of adjacent Characters children of `parent` into the
    /// first node of the run. Returns the number of nodes merged away.
    pub fn coalesce_adjacent_text(&mut self, parent: NodeId) -> Result<usize, TreeError> {
        let children = std::mem::take(&mut self.live_mut(parent)?.children);
        let mut kept = Vec::with_capacity(children.len());
        let mut merged = Vec::new();
        let mut run_head: Option<NodeId> = None;

        for child in children {
            let is_text = matches!(self.nodes[child.0 as usize].data, NodeData::Characters(_));
            if !is_text {
                run_head = None;
                kept.push(child);
                continue;
            }
            let Some(head) = run_head else {
                run_head = Some(child);
                kept.push(child);
                continue;
            };
            let text = match &mut self.nodes[child.0 as usize].data {
                NodeData::Characters(text) => std::mem::take(text),
                _ => String::new(),
            };
            if let NodeData::Characters(head_text) = &mut self.nodes[head.0 as usize].data {
                head_text.push_str(&text);
            }
            merged.push(child);
        }

        self.nodes[parent.0 as usize].children = kept;
        for &id in &merged {
            self.tombstone(id);
        }
        Ok(merged.len())
    }

    /// Preorder walk of the subtree rooted at `start` (inclusive).
    pub fn descendants(&self, start: NodeId) -> Descendants<'_> {
        let stack = if self.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Descendants { dom: self, stack }
    }

    /// Verify the whole-graph invariants listed in the module docs.
    pub fn check_invariants(&self) -> Result<(), TreeError> {
        if self.nodes[0].parent.is_some() {
            return Err(TreeError::invalid(
                NodeId::ROOT,
                InvalidTreeReason::Inconsistent,
            ));
        }
        let mut live = 0usize;
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index as u32);
            if !node.live {
                continue;
            }
            live += 1;
            if !node.kind().is_container() && !node.children.is_empty() {
                return Err(TreeError::invalid(id, InvalidTreeReason::NotAContainer));
            }
            for &child in &node.children {
                let slot = self
                    .nodes
                    .get(child.0 as usize)
                    .ok_or(TreeError::UnknownNode(child))?;
                if !slot.live {
                    return Err(TreeError::StaleNode(child));
                }
                if slot.parent != Some(id) {
                    return Err(TreeError::invalid(child, InvalidTreeReason::Inconsistent));
                }
            }
            if let Some(parent) = node.parent {
                let slot = self
                    .nodes
                    .get(parent.0 as usize)
                    .filter(|slot| slot.live)
                    .ok_or(TreeError::invalid(id, InvalidTreeReason::Inconsistent))?;
                let occurrences = slot.children.iter().filter(|&&c| c == id).count();
                if occurrences != 1 {
                    return Err(TreeError::invalid(id, InvalidTreeReason::Inconsistent));
                }
            }
        }
        if live != self.live {
            return Err(TreeError::invalid(
                NodeId::ROOT,
                InvalidTreeReason::Inconsistent,
            ));
        }

        // With parent/child pairing consistent, every node reachable from a
        // parentless node is visited exactly once; anything left over sits on
        // a parent cycle.
        let mut reached = 0usize;
        let mut stack: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.live && node.parent.is_none())
            .map(|(index, _)| NodeId(index as u32))
            .collect();
        while let Some(id) = stack.pop() {
            reached += 1;
            stack.extend_from_slice(&self.nodes[id.0 as usize].children);
        }
        if reached != live {
            let stuck = self
                .nodes
                .iter()
                .enumerate()
                .find(|(_, node)| node.live && node.parent.is_some())
                .map(|(index, _)| NodeId(index as u32))
                .unwrap_or(NodeId::ROOT);
            return Err(TreeError::invalid(stuck, InvalidTreeReason::Cycle));
        }
        Ok(())
    }

    /// Rewrite only the back-reference of `node`; child sequences are left
    /// untouched. Callers must keep both sides consistent.
    pub(crate) fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
        if let Some(slot) = self.nodes.get_mut(node.0 as usize) {
            slot.parent = parent;
        }
    }

    pub(crate) fn live(&self, id: NodeId) -> Result<&Node, TreeError> {
        match self.nodes.get(id.0 as usize) {
            Some(node) if node.live => Ok(node),
            Some(_) => Err(TreeError::StaleNode(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    fn live_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        match self.nodes.get_mut(id.0 as usize) {
            Some(node) if node.live => Ok(node),
            Some(_) => Err(TreeError::StaleNode(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    fn validate_attach(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let parent_node = self.live(parent)?;
        let child_node = self.live(child)?;
        if child == NodeId::ROOT {
            return Err(TreeError::invalid(child, InvalidTreeReason::RootNotMovable));
        }
        if !parent_node.kind().is_container() {
            return Err(TreeError::invalid(parent, InvalidTreeReason::NotAContainer));
        }
        if child_node.parent.is_some() {
            return Err(TreeError::invalid(child, InvalidTreeReason::AlreadyAttached));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TreeError::invalid(child, InvalidTreeReason::Cycle));
        }
        Ok(())
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Result<usize, TreeError> {
        self.live(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::invalid(child, InvalidTreeReason::NotAChild))
    }

    fn tombstone(&mut self, id: NodeId) {
        let slot = &mut self.nodes[id.0 as usize];
        if !slot.live {
            return;
        }
        slot.live = false;
        slot.parent = None;
        slot.children = Vec::new();
        if let Some(text) = slot.data.text_mut() {
            *text = String::new();
        }
        self.live -= 1;
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`Dom::descendants`].
pub struct Descendants<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.dom.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolTable;

    fn element(dom: &mut Dom, symbols: &mut SymbolTable, name: &str) -> NodeId {
        let name = symbols.intern_name(name);
        dom.create_element(name, Vec::new(), 0)
    }

    fn texts(dom: &Dom, parent: NodeId) -> Vec<String> {
        dom.children(parent)
            .iter()
            .map(|&id| dom.text(id).unwrap_or("<element>").to_string())
            .collect()
    }

    #[test]
    fn append_child_links_both_directions() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let div = element(&mut dom, &mut symbols, "div");
        let text = dom.create_characters("hi", 1);

        dom.append_child(dom.root(), div).expect("attach div");
        dom.append_child(div, text).expect("attach text");

        assert_eq!(dom.parent(div), Some(NodeId::ROOT));
        assert_eq!(dom.parent(text), Some(div));
        assert_eq!(dom.children(div), &[text]);
        assert!(dom.check_invariants().is_ok());
    }

    #[test]
    fn append_child_rejects_double_attach() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let a = element(&mut dom, &mut symbols, "a");
        let b = element(&mut dom, &mut symbols, "b");
        dom.append_child(dom.root(), a).expect("attach a");
        dom.append_child(dom.root(), b).expect("attach b");

        let err = dom.append_child(b, a).expect_err("a already attached");
        assert_eq!(err.reason(), Some(InvalidTreeReason::AlreadyAttached));
    }

    #[test]
    fn append_child_rejects_cycles() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let outer = element(&mut dom, &mut symbols, "div");
        let inner = element(&mut dom, &mut symbols, "span");
        dom.append_child(outer, inner).expect("attach inner");

        let err = dom.append_child(inner, outer).expect_err("cycle");
        assert_eq!(err.reason(), Some(InvalidTreeReason::Cycle));
        let err = dom.append_child(outer, outer).expect_err("self parent");
        assert_eq!(err.reason(), Some(InvalidTreeReason::Cycle));
        assert!(dom.check_invariants().is_ok());
    }

    #[test]
    fn leaves_cannot_own_children() {
        let mut dom = Dom::new();
        let comment = dom.create_comment("c", 0);
        let text = dom.create_characters("t", 0);
        let err = dom.append_child(comment, text).expect_err("leaf parent");
        assert_eq!(err.reason(), Some(InvalidTreeReason::NotAContainer));
    }

    #[test]
    fn root_cannot_be_attached_or_removed() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let div = element(&mut dom, &mut symbols, "div");
        let err = dom.append_child(div, NodeId::ROOT).expect_err("root");
        assert_eq!(err.reason(), Some(InvalidTreeReason::RootNotMovable));
        let err = dom.delete_node(NodeId::ROOT).expect_err("root");
        assert_eq!(err.reason(), Some(InvalidTreeReason::RootNotMovable));
    }

    #[test]
    fn insert_before_and_after_keep_order() {
        let mut dom = Dom::new();
        let b = dom.create_characters("b", 0);
        let a = dom.create_comment("a", 0);
        let c = dom.create_comment("c", 0);
        dom.append_child(dom.root(), b).expect("b");
        dom.insert_before(dom.root(), a, b).expect("a before b");
        dom.insert_after(b, c).expect("c after b");

        assert_eq!(texts(&dom, NodeId::ROOT), vec!["a", "b", "c"]);
        assert_eq!(dom.next_sibling(a), Some(b));
        assert_eq!(dom.previous_sibling(c), Some(b));
        assert_eq!(dom.previous_sibling(a), None);

        let stray = dom.create_comment("x", 0);
        let other = dom.create_comment("y", 0);
        let err = dom.insert_after(stray, other).expect_err("stray has no parent");
        assert_eq!(err.reason(), Some(InvalidTreeReason::NotAChild));
    }

    #[test]
    fn remove_child_returns_live_detached_subtree() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let div = element(&mut dom, &mut symbols, "div");
        let text = dom.create_characters("inside", 0);
        dom.append_child(dom.root(), div).expect("div");
        dom.append_child(div, text).expect("text");

        let removed = dom.remove_child(dom.root(), div).expect("remove");
        assert_eq!(removed, div);
        assert!(dom.children(NodeId::ROOT).is_empty());
        assert_eq!(dom.parent(div), None);
        assert_eq!(dom.children(div), &[text], "subtree kept intact");
        assert!(dom.check_invariants().is_ok());

        dom.append_child(dom.root(), div).expect("re-attach");
        assert_eq!(dom.children(NodeId::ROOT), &[div]);
    }

    #[test]
    fn remove_child_rejects_non_children() {
        let mut dom = Dom::new();
        let text = dom.create_characters("t", 0);
        let err = dom.remove_child(dom.root(), text).expect_err("not a child");
        assert_eq!(err.reason(), Some(InvalidTreeReason::NotAChild));
    }

    #[test]
    fn delete_node_makes_subtree_stale() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let div = element(&mut dom, &mut symbols, "div");
        let text = dom.create_characters("gone", 0);
        dom.append_child(dom.root(), div).expect("div");
        dom.append_child(div, text).expect("text");
        assert_eq!(dom.len(), 3);

        dom.delete_node(div).expect("delete");
        assert_eq!(dom.len(), 1);
        assert!(!dom.contains(div));
        assert!(!dom.contains(text));
        assert_eq!(
            dom.append_child(dom.root(), text),
            Err(TreeError::StaleNode(text))
        );
        assert!(dom.check_invariants().is_ok());
    }

    #[test]
    fn move_node_reparents_with_validation() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let a = element(&mut dom, &mut symbols, "a");
        let b = element(&mut dom, &mut symbols, "b");
        let c = element(&mut dom, &mut symbols, "c");
        dom.append_child(dom.root(), a).expect("a");
        dom.append_child(a, b).expect("b");
        dom.append_child(dom.root(), c).expect("c");

        dom.move_node(b, c).expect("move b under c");
        assert_eq!(dom.parent(b), Some(c));
        assert!(dom.children(a).is_empty());

        let err = dom.move_node(c, b).expect_err("c is b's ancestor");
        assert_eq!(err.reason(), Some(InvalidTreeReason::Cycle));
        assert!(dom.check_invariants().is_ok());
    }

    #[test]
    fn coalesce_merges_runs_and_is_idempotent() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let root = dom.root();
        let parts = ["a", "b", "c"];
        for part in parts {
            let id = dom.create_characters(part, 0);
            dom.append_child(root, id).expect("text");
        }
        let br = element(&mut dom, &mut symbols, "br");
        dom.append_child(root, br).expect("br");
        for part in ["d", "e"] {
            let id = dom.create_characters(part, 0);
            dom.append_child(root, id).expect("text");
        }

        let merged = dom.coalesce_adjacent_text(root).expect("coalesce");
        assert_eq!(merged, 3);
        assert_eq!(texts(&dom, root), vec!["abc", "<element>", "de"]);
        assert!(dom.check_invariants().is_ok());

        let again = dom.coalesce_adjacent_text(root).expect("coalesce again");
        assert_eq!(again, 0);
        assert_eq!(texts(&dom, root), vec!["abc", "<element>", "de"]);
    }

    #[test]
    fn descendants_walk_in_document_order() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let div = element(&mut dom, &mut symbols, "div");
        let span = element(&mut dom, &mut symbols, "span");
        let one = dom.create_characters("1", 0);
        let two = dom.create_characters("2", 0);
        dom.append_child(dom.root(), div).expect("div");
        dom.append_child(div, span).expect("span");
        dom.append_child(span, one).expect("one");
        dom.append_child(div, two).expect("two");

        let order: Vec<NodeId> = dom.descendants(NodeId::ROOT).collect();
        assert_eq!(order, vec![NodeId::ROOT, div, span, one, two]);
    }

    #[test]
    fn set_parent_alone_breaks_invariants() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let a = element(&mut dom, &mut symbols, "a");
        let b = element(&mut dom, &mut symbols, "b");
        dom.append_child(dom.root(), a).expect("a");
        dom.append_child(dom.root(), b).expect("b");

        dom.set_parent(b, Some(a));
        let err = dom.check_invariants().expect_err("one-sided relink");
        assert_eq!(err.reason(), Some(InvalidTreeReason::Inconsistent));

        dom.set_parent(b, Some(NodeId::ROOT));
        assert!(dom.check_invariants().is_ok());
    }

    #[test]
    fn element_attribute_edits() {
        let mut symbols = SymbolTable::new();
        let mut dom = Dom::new();
        let href = symbols.intern_name("href");
        let rel = symbols.intern_name("rel");
        let a = element(&mut dom, &mut symbols, "a");
        let data = dom.element_mut(a).expect("element");
        data.set_attribute(href, Some("/x".to_string()));
        data.set_attribute(rel, None);
        data.set_attribute(href, Some("/y".to_string()));

        let data = dom.element(a).expect("element");
        assert_eq!(data.attributes.len(), 2);
        assert_eq!(data.attribute_value(href), Some("/y"));
        assert_eq!(data.attribute(rel).map(|attr| attr.quote), Some(QuoteStyle::None));

        assert!(dom.element_mut(a).expect("element").remove_attribute(rel));
        assert!(!dom.element_mut(a).expect("element").remove_attribute(rel));
    }
}
