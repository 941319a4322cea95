//! Incremental, event-driven HTML parsing into an editable node graph.
//!
//! An [`HtmlParse`] session scans text or bytes fed in arbitrary chunks,
//! turns them into [`Event`]s and commits each event into its [`Document`],
//! notifying registered [`HtmlFilter`]s as the tree grows. Filters may edit
//! the tree mid-stream. Malformed markup is recovered from deterministically
//! and reported through [`ParseDiagnostic`]s.

mod decode;
pub mod document;
pub mod dom;
pub mod error;
pub mod event;
pub mod filter;
mod lexer;
pub mod parse;
pub mod snapshot;
pub mod symbol;
#[cfg(any(test, feature = "test-harness"))]
pub mod testing;

pub use document::Document;
pub use dom::{
    Attribute, CloseStyle, Dom, ElementData, Node, NodeData, NodeId, NodeKind, QuoteStyle,
};
pub use error::{DiagnosticCode, InvalidTreeReason, ParseDiagnostic, ParseError, TreeError};
pub use event::{Event, EventKind};
pub use filter::HtmlFilter;
pub use parse::{HtmlParse, ParseState, ParserConfig};
pub use snapshot::{DomSnapshot, DomSnapshotOptions, render_html};
pub use symbol::{Symbol, SymbolTable};
#[cfg(any(test, feature = "test-harness"))]
pub use testing::TestingPeer;
