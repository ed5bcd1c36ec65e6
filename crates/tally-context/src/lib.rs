//! Tally Context
//!
//! Tracks which logical subjects the user is currently interacting with.
//!
//! # Core Concepts
//!
//! - [`Subject`]: Value identifying a logical thing (`Entry[42]`, `Log`)
//! - [`Trigger`]: Live binding of a subject to an element or an automatic flag
//! - [`TriggerRegistry`]: Currently mounted triggers
//! - [`ContextStore`]: Ordered, deduplicated subjects currently in focus
//! - [`ContextReconciler`]: Per-cycle pass promoting automatic triggers and
//!   evicting orphaned subjects
//! - [`InputEventRouter`]: Pointer/focus routing based on element containment
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tally_context::{
//!     ContextReconciler, ContextStore, InputEventRouter, InputSignal, ParentageTree, Subject,
//!     Trigger, TriggerRegistry,
//! };
//!
//! let mut tree = ParentageTree::new();
//! let root = tree.insert_root();
//! let row = tree.insert_child(root).unwrap();
//!
//! let triggers = Arc::new(TriggerRegistry::new());
//! let context = Arc::new(ContextStore::new());
//! let entry = Subject::with_id("Entry", "42");
//! let _guard = triggers.mount(Trigger::element(entry.clone(), row));
//!
//! let router = InputEventRouter::new(triggers.clone(), context.clone());
//! router.route(InputSignal::pointer(row), &tree);
//! assert!(context.has_subject(&entry));
//!
//! ContextReconciler::new(triggers, context.clone()).run();
//! assert!(context.has_subject(&entry));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod context;
mod element;
mod error;
mod reconciler;
mod router;
mod subject;
mod trigger;

pub use context::ContextStore;
pub use element::{ElementId, ElementTree, ParentageTree};
pub use error::ContextError;
pub use reconciler::{ContextReconciler, ReconcileReport};
pub use router::{FocusCallback, InputEventRouter, InputSignal, RouteOutcome, SignalKind};
pub use subject::Subject;
pub use trigger::{Trigger, TriggerGuard, TriggerKind, TriggerRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
