//! Context reconciliation
//!
//! Runs once per render/interaction cycle. Order matters:
//! 1. Every automatic trigger's subject is added to the context
//! 2. Every context subject without any trigger (automatic or element-bound)
//!    is evicted
//!
//! Running the pass again with no intervening changes is a no-op, so
//! callers may run it as often as they like.

use crate::context::ContextStore;
use crate::subject::Subject;
use crate::trigger::TriggerRegistry;
use std::sync::Arc;

/// Changes applied by one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Subjects added because an automatic trigger claims them
    pub promoted: Vec<Subject>,
    /// Subjects removed because no trigger claims them anymore
    pub evicted: Vec<Subject>,
}

impl ReconcileReport {
    /// Whether the pass changed nothing
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.promoted.is_empty() && self.evicted.is_empty()
    }
}

/// Keeps the context consistent with the trigger registry
#[derive(Debug, Clone)]
pub struct ContextReconciler {
    triggers: Arc<TriggerRegistry>,
    context: Arc<ContextStore>,
}

impl ContextReconciler {
    /// Create reconciler over shared registries
    #[inline]
    #[must_use]
    pub fn new(triggers: Arc<TriggerRegistry>, context: Arc<ContextStore>) -> Self {
        Self { triggers, context }
    }

    /// Run one reconciliation pass
    pub fn run(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for trigger in self.triggers.state() {
            if trigger.is_automatic() && self.context.add(trigger.subject().clone()) {
                report.promoted.push(trigger.subject().clone());
            }
        }

        for subject in self.context.state() {
            if !self.triggers.has_subject(&subject) && self.context.remove(&subject) {
                report.evicted.push(subject);
            }
        }

        if !report.is_noop() {
            tracing::debug!(
                promoted = report.promoted.len(),
                evicted = report.evicted.len(),
                "context reconciled"
            );
        }
        report
    }
}
