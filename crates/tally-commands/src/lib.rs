//! Tally Commands
//!
//! Named, parameterized actions scoped to a [`Subject`], discoverable
//! through the palette whenever their subject is in context.
//!
//! # Core Concepts
//!
//! - [`ParamSpec`]: Parameter declarations (`string` or `time`)
//! - [`Command`]: Subject-scoped action with a [`SubmitHandler`]
//! - [`CommandRegistry`]: Registered commands, deduplicated by `(subject, name)`
//! - [`CommandResolver`]: Commands visible for the live context
//! - [`Executor`]: Two-phase invocation (cancellable parameter resolution,
//!   then a single submit)
//!
//! # Example
//!
//! ```rust
//! use tally_commands::{submit_fn, Command, Executor, ParamOptions, ParamSpec, SubmitOutcome};
//! use tally_context::Subject;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let command = Command::new(
//!     Subject::with_id("Entry", "42"),
//!     "describe",
//!     submit_fn(|data| async move {
//!         println!("new description: {:?}", data.string("description"));
//!         Ok::<_, anyhow::Error>(())
//!     }),
//! )
//! .with_params(ParamSpec::new().with("description", ParamOptions::string().required()));
//!
//! let mut form = Executor::new().invoke(command).resolve().await?;
//! form.set("description", "fix typo")?;
//! assert!(matches!(form.submit().await?, SubmitOutcome::Submitted(_)));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```
//!
//! [`Subject`]: tally_context::Subject

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod command;
mod error;
mod executor;
mod handler;
mod params;
mod registry;
mod resolver;

pub use command::{Command, CommandKey};
pub use error::{CommandError, ExecuteError, ValidationError};
pub use executor::{Canceller, Executor, Field, Invocation, ParameterForm, SubmitOutcome};
pub use handler::{params_fn, submit_fn, sync_submit_fn, ParamSource, ParamsProducer, SubmitHandler};
pub use params::{ParamData, ParamOptions, ParamSpec, ParamType, ParamValue};
pub use registry::{CommandGuard, CommandRegistry, DuplicatePolicy};
pub use resolver::{resolve_visible, CommandResolver};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
