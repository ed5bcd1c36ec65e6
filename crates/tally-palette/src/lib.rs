//! Tally Palette
//!
//! Session facade for the context-sensitive command palette: wires the
//! trigger, context and command registries of one UI session together and
//! provides the top-level error boundary.
//!
//! # Example
//!
//! ```rust
//! use tally_palette::prelude::*;
//!
//! let palette = Palette::new(PaletteConfig::default());
//!
//! let mut tree = ParentageTree::new();
//! let document = tree.insert_root();
//! let row = tree.insert_child(document).unwrap();
//!
//! let entry = Subject::with_id("Entry", "42");
//! let _trigger = palette.mount_trigger(Trigger::element(entry.clone(), row));
//! let _command = palette.register_command(Command::new(
//!     entry.clone(),
//!     "delete",
//!     sync_submit_fn(|_| Ok(())),
//! ));
//!
//! palette.dispatch(InputSignal::pointer(row), &tree);
//! assert_eq!(palette.visible_commands().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod logging;
mod session;

pub use config::{LogConfig, PaletteConfig, LOG_ENV};
pub use error::{ErrorSurface, PaletteError, ReportedError};
pub use logging::init_logging;
pub use session::Palette;

/// Commonly used types
pub mod prelude {
    pub use crate::{init_logging, ErrorSurface, LogConfig, Palette, PaletteConfig, PaletteError};
    pub use tally_commands::{
        params_fn, submit_fn, sync_submit_fn, Command, CommandKey, DuplicatePolicy,
        ExecuteError, Executor, ParamData, ParamOptions, ParamSpec, ParamValue, ParameterForm,
        SubmitHandler, SubmitOutcome, ValidationError,
    };
    pub use tally_context::{
        ElementId, ElementTree, InputSignal, ParentageTree, Subject, Trigger, TriggerKind,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
