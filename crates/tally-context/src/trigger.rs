//! Trigger registry
//!
//! Provides [`TriggerRegistry`] for the set of currently mounted triggers
//! and [`TriggerGuard`] for tying a trigger to its owner's lifetime.

use crate::element::ElementId;
use crate::subject::Subject;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// How a trigger claims its subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Always in context while mounted
    Automatic,

    /// In context after the user clicks or focuses inside the element
    Element(ElementId),
}

/// Live binding of a subject to an element or an automatic flag
///
/// Equality covers the whole record: subject and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trigger {
    subject: Subject,
    kind: TriggerKind,
}

impl Trigger {
    /// Create an automatic trigger
    #[inline]
    #[must_use]
    pub fn automatic(subject: Subject) -> Self {
        Self {
            subject,
            kind: TriggerKind::Automatic,
        }
    }

    /// Create a trigger bound to an element
    #[inline]
    #[must_use]
    pub fn element(subject: Subject, element: ElementId) -> Self {
        Self {
            subject,
            kind: TriggerKind::Element(element),
        }
    }

    /// Subject claimed by this trigger
    #[inline]
    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Trigger kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    /// Whether this trigger is automatic
    #[inline]
    #[must_use]
    pub fn is_automatic(&self) -> bool {
        matches!(self.kind, TriggerKind::Automatic)
    }

    /// Backing element, `None` for automatic triggers
    #[inline]
    #[must_use]
    pub fn element_id(&self) -> Option<ElementId> {
        match self.kind {
            TriggerKind::Automatic => None,
            TriggerKind::Element(element) => Some(element),
        }
    }
}

/// Registry of mounted triggers
///
/// Triggers are never merged by subject alone: a list row and a detail
/// panel may both claim `Entry[42]` and coexist until each is removed.
///
/// Guards share one entry per structurally equal trigger; the entry stays
/// until the last enabled guard lets go.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    triggers: RwLock<Vec<Trigger>>,
    mounts: Mutex<HashMap<Trigger, usize>>,
}

impl TriggerRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trigger
    ///
    /// Returns `false` when a structurally equal trigger is already present.
    pub fn add(&self, trigger: Trigger) -> bool {
        let mut triggers = self.triggers.write();
        if triggers.contains(&trigger) {
            tracing::trace!(subject = %trigger.subject, "duplicate trigger ignored");
            return false;
        }
        tracing::debug!(subject = %trigger.subject, automatic = trigger.is_automatic(), "trigger added");
        triggers.push(trigger);
        true
    }

    /// Remove the first structurally equal trigger
    ///
    /// Returns `false` when no such trigger exists.
    pub fn remove(&self, trigger: &Trigger) -> bool {
        let mut triggers = self.triggers.write();
        match triggers.iter().position(|t| t == trigger) {
            Some(index) => {
                triggers.remove(index);
                tracing::debug!(subject = %trigger.subject, "trigger removed");
                true
            }
            None => false,
        }
    }

    /// First trigger claiming `subject`, automatic or element-bound
    #[must_use]
    pub fn find_by_subject(&self, subject: &Subject) -> Option<Trigger> {
        self.triggers
            .read()
            .iter()
            .find(|t| &t.subject == subject)
            .cloned()
    }

    /// Whether any trigger claims `subject`
    #[must_use]
    pub fn has_subject(&self, subject: &Subject) -> bool {
        self.triggers.read().iter().any(|t| &t.subject == subject)
    }

    /// Snapshot of all triggers in registration order
    #[must_use]
    pub fn state(&self) -> Vec<Trigger> {
        self.triggers.read().clone()
    }

    /// Number of registered triggers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.read().len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.read().is_empty()
    }

    /// Drop every trigger (session teardown)
    pub fn clear(&self) {
        let mut mounts = self.mounts.lock();
        mounts.clear();
        self.triggers.write().clear();
    }

    /// Number of enabled guards holding `trigger`
    #[must_use]
    pub fn mount_count(&self, trigger: &Trigger) -> usize {
        self.mounts.lock().get(trigger).copied().unwrap_or(0)
    }

    fn acquire(&self, trigger: &Trigger) {
        let mut mounts = self.mounts.lock();
        *mounts.entry(trigger.clone()).or_insert(0) += 1;
        self.add(trigger.clone());
    }

    fn release(&self, trigger: &Trigger) {
        let mut mounts = self.mounts.lock();
        let Some(count) = mounts.get_mut(trigger) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            mounts.remove(trigger);
            self.remove(trigger);
        } else {
            tracing::trace!(subject = %trigger.subject, remaining = *count, "trigger still mounted");
        }
    }

    /// Register `trigger` for the lifetime of the returned guard
    pub fn mount(self: &Arc<Self>, trigger: Trigger) -> TriggerGuard {
        self.mount_with(trigger, true)
    }

    /// Register `trigger` only if `enabled`
    ///
    /// A disabled guard holds nothing until it is enabled.
    pub fn mount_with(self: &Arc<Self>, trigger: Trigger, enabled: bool) -> TriggerGuard {
        let mut guard = TriggerGuard {
            registry: Arc::clone(self),
            trigger,
            enabled: false,
        };
        guard.set_enabled(enabled);
        guard
    }
}

/// Scoped trigger registration
///
/// Dropping the guard releases its mount; the trigger leaves the registry
/// once no other enabled guard holds an equal trigger. Replacing a guard
/// with a fresh mount of the same trigger keeps it registered.
#[derive(Debug)]
#[must_use = "dropping the guard unregisters the trigger"]
pub struct TriggerGuard {
    registry: Arc<TriggerRegistry>,
    trigger: Trigger,
    enabled: bool,
}

impl TriggerGuard {
    /// Guarded trigger
    #[inline]
    #[must_use]
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Whether the trigger is currently requested
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Take or release the mount without giving up the guard
    pub fn set_enabled(&mut self, enabled: bool) {
        match (self.enabled, enabled) {
            (false, true) => self.registry.acquire(&self.trigger),
            (true, false) => self.registry.release(&self.trigger),
            // re-adds a trigger removed behind the guard's back
            (true, true) => {
                self.registry.add(self.trigger.clone());
            }
            (false, false) => {}
        }
        self.enabled = enabled;
    }
}

impl Drop for TriggerGuard {
    fn drop(&mut self) {
        if self.enabled {
            self.registry.release(&self.trigger);
        }
    }
}
