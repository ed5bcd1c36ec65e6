//! Context store
//!
//! Provides [`ContextStore`], the insertion-ordered set of subjects
//! currently considered in focus.

use crate::subject::Subject;
use parking_lot::RwLock;

/// Ordered, deduplicated collection of in-focus subjects
///
/// Insertion order is preserved and never reshuffled by lookups. It only
/// matters for "most recent wins" queries such as
/// [`find_subject_with_type`](Self::find_subject_with_type).
#[derive(Debug, Default)]
pub struct ContextStore {
    subjects: RwLock<Vec<Subject>>,
}

impl ContextStore {
    /// Create new empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subject
    ///
    /// Returns `false` when an equal subject is already present.
    pub fn add(&self, subject: Subject) -> bool {
        let mut subjects = self.subjects.write();
        if subjects.contains(&subject) {
            return false;
        }
        tracing::debug!(subject = %subject, "context add");
        subjects.push(subject);
        true
    }

    /// Remove a subject
    ///
    /// Returns `false` when the subject was not present.
    pub fn remove(&self, subject: &Subject) -> bool {
        let mut subjects = self.subjects.write();
        match subjects.iter().position(|s| s == subject) {
            Some(index) => {
                subjects.remove(index);
                tracing::debug!(subject = %subject, "context remove");
                true
            }
            None => false,
        }
    }

    /// Whether `subject` is in context
    #[must_use]
    pub fn has_subject(&self, subject: &Subject) -> bool {
        self.subjects.read().iter().rev().any(|s| s == subject)
    }

    /// Most recently added subject of the given type
    #[must_use]
    pub fn find_subject_with_type(&self, kind: &str) -> Option<Subject> {
        self.subjects
            .read()
            .iter()
            .rev()
            .find(|s| s.is_kind(kind))
            .cloned()
    }

    /// Position of the first-added subject of the given type
    #[must_use]
    pub fn find_index_of_subject_with_type(&self, kind: &str) -> Option<usize> {
        self.subjects.read().iter().position(|s| s.is_kind(kind))
    }

    /// Snapshot of all subjects in insertion order
    #[must_use]
    pub fn state(&self) -> Vec<Subject> {
        self.subjects.read().clone()
    }

    /// Number of subjects in context
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.read().len()
    }

    /// Check if context is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.read().is_empty()
    }

    /// Drop every subject (session teardown)
    pub fn clear(&self) {
        self.subjects.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_has_set_semantics() {
        let store = ContextStore::new();
        assert!(store.add(Subject::new("Log")));
        assert!(!store.add(Subject::new("Log")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_preserves_order_of_others() {
        let store = ContextStore::new();
        store.add(Subject::new("Log"));
        store.add(Subject::with_id("Entry", "1"));
        store.add(Subject::with_id("Entry", "2"));

        assert!(store.remove(&Subject::with_id("Entry", "1")));
        assert!(!store.remove(&Subject::with_id("Entry", "1")));
        assert_eq!(
            store.state(),
            vec![Subject::new("Log"), Subject::with_id("Entry", "2")]
        );
    }

    #[test]
    fn type_lookups_scan_in_opposite_directions() {
        let store = ContextStore::new();
        store.add(Subject::with_id("Entry", "1"));
        store.add(Subject::new("Log"));
        store.add(Subject::with_id("Entry", "2"));

        assert_eq!(
            store.find_subject_with_type("Entry"),
            Some(Subject::with_id("Entry", "2"))
        );
        assert_eq!(store.find_index_of_subject_with_type("Entry"), Some(0));
        assert_eq!(store.find_index_of_subject_with_type("Log"), Some(1));
        assert_eq!(store.find_subject_with_type("Account"), None);
        assert_eq!(store.find_index_of_subject_with_type("Account"), None);
    }

    #[test]
    fn lookups_do_not_reorder() {
        let store = ContextStore::new();
        store.add(Subject::with_id("Entry", "1"));
        store.add(Subject::with_id("Entry", "2"));
        let before = store.state();
        let _ = store.find_subject_with_type("Entry");
        let _ = store.has_subject(&Subject::with_id("Entry", "1"));
        assert_eq!(store.state(), before);
    }
}
