//! Error types for Tally Context

use crate::element::ElementId;

/// Element tree errors
///
/// Registry operations never fail: duplicate adds and missing removes are
/// silent no-ops. Only structural edits of a [`ParentageTree`] report errors.
///
/// [`ParentageTree`]: crate::ParentageTree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// Element is not part of the tree
    #[error("unknown element: {0}")]
    UnknownElement(ElementId),

    /// Parent element is not part of the tree
    #[error("cannot attach under unknown parent {0}")]
    UnknownParent(ElementId),
}
