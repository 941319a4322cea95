//! Parsing-session document: node graph plus its symbol table.

use crate::dom::{Dom, NodeId, NodeKind};
use crate::symbol::{Symbol, SymbolTable};

/// One document being parsed.
///
/// The symbol table is owned here and never shared with another document;
/// `Symbol` handles stored in the node graph are only meaningful against it.
#[derive(Debug, Default)]
pub struct Document {
    url: String,
    dom: Dom,
    symbols: SymbolTable,
}

impl Document {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            dom: Dom::new(),
            symbols: SymbolTable::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn set_url(&mut self, url: &str) {
        self.url.clear();
        self.url.push_str(url);
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Intern a tag or attribute name for this document.
    pub fn intern_name(&mut self, name: &str) -> Symbol {
        self.symbols.intern_name(name)
    }

    /// Canonical tag name of an element node.
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        let element = self.dom.element(id)?;
        self.symbols.resolve(element.name)
    }

    /// Whether `id` is an element with the given (case-insensitive) name.
    pub fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        match (self.dom.element(id), self.symbols.lookup_name(name)) {
            (Some(element), Some(symbol)) => element.name == symbol,
            _ => false,
        }
    }

    /// Value of the first attribute named `name` on an element node.
    pub fn attribute_value(&self, id: NodeId, name: &str) -> Option<&str> {
        let symbol = self.symbols.lookup_name(name)?;
        self.dom.element(id)?.attribute_value(symbol)
    }

    /// Create a detached element; attach it with the `Dom` edit operations.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let name = self.symbols.intern_name(name);
        self.dom.create_element(name, Vec::new(), 0)
    }

    /// Concatenated Characters content of the subtree rooted at `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.dom.descendants(id) {
            if self.dom.kind(node) == Some(NodeKind::Characters) {
                out.push_str(self.dom.text(node).unwrap_or_default());
            }
        }
        out
    }
}
