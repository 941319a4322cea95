//! Lexical event model.
//!
//! Determinism contract:
//! - Events are produced in source order and committed in emit order.
//! - Names are interned in the owning document's symbol table.
//! - Attributes are kept in encounter order, duplicates included.

use crate::dom::Attribute;
use crate::symbol::Symbol;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    OpenTag {
        name: Symbol,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    CloseTag {
        name: Symbol,
    },
    Characters(String),
    Comment(String),
    /// Markup declaration or processing instruction, without `<!`/`<?` and `>`.
    Directive(String),
    Cdata(String),
    EndOfDocument,
}

/// One lexical occurrence with its source line (1-based; 0 when synthesized).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub line: u32,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, line: 0 }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn open_tag(name: Symbol, attributes: Vec<Attribute>) -> Self {
        Self::new(EventKind::OpenTag {
            name,
            attributes,
            self_closing: false,
        })
    }

    pub fn self_closing_tag(name: Symbol, attributes: Vec<Attribute>) -> Self {
        Self::new(EventKind::OpenTag {
            name,
            attributes,
            self_closing: true,
        })
    }

    pub fn close_tag(name: Symbol) -> Self {
        Self::new(EventKind::CloseTag { name })
    }

    pub fn characters(text: impl Into<String>) -> Self {
        Self::new(EventKind::Characters(text.into()))
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(EventKind::Comment(text.into()))
    }

    pub fn directive(text: impl Into<String>) -> Self {
        Self::new(EventKind::Directive(text.into()))
    }

    pub fn cdata(text: impl Into<String>) -> Self {
        Self::new(EventKind::Cdata(text.into()))
    }

    pub fn end_of_document() -> Self {
        Self::new(EventKind::EndOfDocument)
    }
}
