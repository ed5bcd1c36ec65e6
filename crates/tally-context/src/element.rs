//! Element handles and containment
//!
//! The input router only needs two questions answered about the UI: is an
//! element still part of the live tree, and does one element contain
//! another. [`ElementTree`] captures exactly that, so any toolkit (DOM,
//! retained-mode widget tree, terminal hit regions) can back it.

use crate::error::ContextError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// Opaque handle to a UI element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    /// Wrap a raw toolkit handle
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw toolkit handle
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Containment queries over a live element tree
pub trait ElementTree {
    /// Whether `element` is currently part of the live tree
    fn is_attached(&self, element: ElementId) -> bool;

    /// Whether `target` is `ancestor` or a descendant of it
    fn contains(&self, ancestor: ElementId, target: ElementId) -> bool;
}

/// Parent-pointer element tree
///
/// Minimal [`ElementTree`] for non-browser UIs and tests. Elements are
/// attached while present in the tree; detaching an element removes its
/// whole subtree.
#[derive(Debug, Default, Clone)]
pub struct ParentageTree {
    parents: HashMap<ElementId, Option<ElementId>>,
    next_id: u64,
}

impl ParentageTree {
    /// Create an empty tree
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new top-level element
    pub fn insert_root(&mut self) -> ElementId {
        let id = self.allocate();
        self.parents.insert(id, None);
        id
    }

    /// Insert a new element under `parent`
    ///
    /// # Errors
    /// - `ContextError::UnknownParent` if `parent` is not attached
    pub fn insert_child(&mut self, parent: ElementId) -> Result<ElementId, ContextError> {
        if !self.parents.contains_key(&parent) {
            return Err(ContextError::UnknownParent(parent));
        }
        let id = self.allocate();
        self.parents.insert(id, Some(parent));
        Ok(id)
    }

    /// Detach `element` and all of its descendants
    ///
    /// Returns the number of elements removed.
    ///
    /// # Errors
    /// - `ContextError::UnknownElement` if `element` is not attached
    pub fn detach(&mut self, element: ElementId) -> Result<usize, ContextError> {
        if !self.parents.contains_key(&element) {
            return Err(ContextError::UnknownElement(element));
        }
        let doomed: Vec<ElementId> = self
            .parents
            .keys()
            .copied()
            .filter(|candidate| self.contains(element, *candidate))
            .collect();
        for id in &doomed {
            self.parents.remove(id);
        }
        Ok(doomed.len())
    }

    /// Parent of `element`, if it has one
    #[inline]
    #[must_use]
    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.parents.get(&element).copied().flatten()
    }

    /// Number of attached elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if tree is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    fn allocate(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId(self.next_id)
    }
}

impl ElementTree for ParentageTree {
    fn is_attached(&self, element: ElementId) -> bool {
        self.parents.contains_key(&element)
    }

    fn contains(&self, ancestor: ElementId, target: ElementId) -> bool {
        if !self.parents.contains_key(&ancestor) {
            return false;
        }
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parents.get(&current).copied().flatten();
        }
        false
    }
}
