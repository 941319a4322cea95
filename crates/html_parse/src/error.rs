//! Tree errors, session errors and recoverable parse diagnostics.

use crate::dom::NodeId;
use std::fmt;

/// Why a structural edit was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidTreeReason {
    /// The child already has a parent.
    AlreadyAttached,
    /// The edit would make a node its own ancestor.
    Cycle,
    /// The target parent is a leaf kind and cannot own children.
    NotAContainer,
    /// The node is not a child of the given parent.
    NotAChild,
    /// The document root cannot be attached, removed or deleted.
    RootNotMovable,
    /// Parent back-references and child sequences disagree.
    Inconsistent,
}

impl fmt::Display for InvalidTreeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidTreeReason::AlreadyAttached => "node already has a parent",
            InvalidTreeReason::Cycle => "edit would create a cycle",
            InvalidTreeReason::NotAContainer => "node kind cannot have children",
            InvalidTreeReason::NotAChild => "node is not a child of the given parent",
            InvalidTreeReason::RootNotMovable => "the document root cannot be moved",
            InvalidTreeReason::Inconsistent => "parent link and child list disagree",
        };
        f.write_str(text)
    }
}

/// Node graph error. Always surfaced to the caller, never silently fixed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("invalid tree operation on {node:?}: {reason}")]
    InvalidTree {
        node: NodeId,
        reason: InvalidTreeReason,
    },
    #[error("node {0:?} was removed from the document")]
    StaleNode(NodeId),
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
}

impl TreeError {
    pub(crate) fn invalid(node: NodeId, reason: InvalidTreeReason) -> Self {
        TreeError::InvalidTree { node, reason }
    }

    pub fn reason(&self) -> Option<InvalidTreeReason> {
        match self {
            TreeError::InvalidTree { reason, .. } => Some(*reason),
            TreeError::StaleNode(_) | TreeError::UnknownNode(_) => None,
        }
    }
}

/// Misuse of the parse session lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("start_parse called on a session that already started")]
    AlreadyStarted,
    #[error("the document was already finished")]
    AlreadyFinished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// A close tag matched no open element and was ignored.
    UnmatchedCloseTag,
    /// A close tag matched an outer element; inner elements were auto-closed.
    MisnestedCloseTag,
    /// An event arrived after end-of-document and was dropped.
    EventAfterEnd,
}

/// Recoverable anomaly found while committing events. Never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub code: DiagnosticCode,
    pub line: u32,
    pub message: String,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at line {}: {}", self.code, self.line, self.message)
    }
}
