//! Input event routing
//!
//! Translates pointer activations and focus changes into context updates.
//!
//! For every element-bound trigger, independently:
//! - target inside the trigger's element: the subject joins the context,
//!   and a pointer activation also fires the focus callback
//! - otherwise, unless the target is inside the palette itself: the
//!   subject leaves the context
//!
//! Eviction is decided per trigger. A click on trigger A's element does not
//! protect trigger B's subject; only clicks inside the palette root do.
//! Automatic triggers are never touched here.

use crate::context::ContextStore;
use crate::element::{ElementId, ElementTree};
use crate::subject::Subject;
use crate::trigger::TriggerRegistry;
use std::fmt;
use std::sync::Arc;

/// Kind of input signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Primary pointer activation ("click")
    PointerActivation,

    /// Focus acquisition anywhere in the tree
    Focus,
}

/// Input signal aimed at an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSignal {
    /// Signal kind
    pub kind: SignalKind,
    /// Element the signal targets
    pub target: ElementId,
}

impl InputSignal {
    /// Pointer activation on `target`
    #[inline]
    #[must_use]
    pub fn pointer(target: ElementId) -> Self {
        Self {
            kind: SignalKind::PointerActivation,
            target,
        }
    }

    /// Focus acquired by `target`
    #[inline]
    #[must_use]
    pub fn focus(target: ElementId) -> Self {
        Self {
            kind: SignalKind::Focus,
            target,
        }
    }
}

/// Context changes caused by one signal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Target was no longer attached; nothing happened
    pub ignored: bool,
    /// Subjects whose element contains the target, in trigger order
    pub focused: Vec<Subject>,
    /// Subjects removed from context
    pub evicted: Vec<Subject>,
    /// Number of focus callback invocations
    pub focus_requests: usize,
}

/// Callback bringing the palette into view after a pointer activation
pub type FocusCallback = Arc<dyn Fn(&Subject) + Send + Sync>;

/// Routes pointer and focus signals into the context store
#[derive(Clone)]
pub struct InputEventRouter {
    triggers: Arc<TriggerRegistry>,
    context: Arc<ContextStore>,
    palette_root: Option<ElementId>,
    on_context_focus: Option<FocusCallback>,
}

impl fmt::Debug for InputEventRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputEventRouter")
            .field("palette_root", &self.palette_root)
            .field("has_focus_callback", &self.on_context_focus.is_some())
            .finish_non_exhaustive()
    }
}

impl InputEventRouter {
    /// Create router over shared registries
    #[inline]
    #[must_use]
    pub fn new(triggers: Arc<TriggerRegistry>, context: Arc<ContextStore>) -> Self {
        Self {
            triggers,
            context,
            palette_root: None,
            on_context_focus: None,
        }
    }

    /// With palette root element
    #[inline]
    #[must_use]
    pub fn with_palette_root(mut self, root: ElementId) -> Self {
        self.palette_root = Some(root);
        self
    }

    /// With focus callback
    #[inline]
    #[must_use]
    pub fn with_focus_callback(mut self, callback: FocusCallback) -> Self {
        self.on_context_focus = Some(callback);
        self
    }

    /// Replace the palette root (`None` while the palette is unmounted)
    #[inline]
    pub fn set_palette_root(&mut self, root: Option<ElementId>) {
        self.palette_root = root;
    }

    /// Replace the focus callback
    #[inline]
    pub fn set_focus_callback(&mut self, callback: Option<FocusCallback>) {
        self.on_context_focus = callback;
    }

    /// Current palette root
    #[inline]
    #[must_use]
    pub fn palette_root(&self) -> Option<ElementId> {
        self.palette_root
    }

    /// Apply one input signal
    pub fn route(&self, signal: InputSignal, tree: &dyn ElementTree) -> RouteOutcome {
        let mut outcome = RouteOutcome::default();

        if !tree.is_attached(signal.target) {
            tracing::trace!(target_element = %signal.target, "signal on detached element ignored");
            outcome.ignored = true;
            return outcome;
        }

        let within_palette = self
            .palette_root
            .is_some_and(|root| tree.contains(root, signal.target));

        for trigger in self.triggers.state() {
            let Some(element) = trigger.element_id() else {
                continue;
            };

            if tree.contains(element, signal.target) {
                self.context.add(trigger.subject().clone());
                outcome.focused.push(trigger.subject().clone());
                if signal.kind == SignalKind::PointerActivation {
                    if let Some(callback) = &self.on_context_focus {
                        callback(trigger.subject());
                    }
                    outcome.focus_requests += 1;
                }
            } else if !within_palette && self.context.remove(trigger.subject()) {
                outcome.evicted.push(trigger.subject().clone());
            }
        }

        tracing::trace!(
            kind = ?signal.kind,
            target_element = %signal.target,
            focused = outcome.focused.len(),
            evicted = outcome.evicted.len(),
            "signal routed"
        );
        outcome
    }
}
