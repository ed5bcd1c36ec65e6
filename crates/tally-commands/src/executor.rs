//! Command execution
//!
//! Invocation runs in two phases:
//!
//! 1. [`Invocation::resolve`] turns the command's [`ParamSource`] into a
//!    [`ParameterForm`]. This phase may suspend on a deferred producer and
//!    can be cancelled through a [`Canceller`].
//! 2. [`ParameterForm::submit`] validates the inputs and hands the data to
//!    the command's handler. This phase is not cancellable, and a form
//!    calls its handler at most once.
//!
//! [`ParamSource`]: crate::ParamSource

use crate::command::Command;
use crate::error::{ExecuteError, ValidationError};
use crate::params::{ParamData, ParamOptions, ParamSpec, ParamValue};
use chrono::{DateTime, FixedOffset, Local};
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use indexmap::IndexMap;

/// Starts command invocations
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    reference: Option<DateTime<FixedOffset>>,
}

impl Executor {
    /// Create executor using the local clock for time inputs
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the reference time that wall-clock inputs are placed on
    #[inline]
    #[must_use]
    pub fn with_reference_time(mut self, reference: DateTime<FixedOffset>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Reference time for new invocations
    #[must_use]
    pub fn reference_time(&self) -> DateTime<FixedOffset> {
        self.reference.unwrap_or_else(|| Local::now().fixed_offset())
    }

    /// Begin invoking `command`
    pub fn invoke(&self, command: Command) -> Invocation {
        let (handle, registration) = AbortHandle::new_pair();
        tracing::debug!(command = %command, "invocation started");
        Invocation {
            command,
            handle,
            registration,
            reference: self.reference_time(),
        }
    }
}

/// Cancels the resolution phase of one invocation
#[derive(Debug, Clone)]
pub struct Canceller(AbortHandle);

impl Canceller {
    /// Request cancellation
    ///
    /// Has no effect once the parameter form has been produced.
    pub fn cancel(&self) {
        self.0.abort();
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.is_aborted()
    }
}

/// A selected command awaiting parameter resolution
#[derive(Debug)]
pub struct Invocation {
    command: Command,
    handle: AbortHandle,
    registration: AbortRegistration,
    reference: DateTime<FixedOffset>,
}

impl Invocation {
    /// Command being invoked
    #[inline]
    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Handle for cancelling [`resolve`](Self::resolve)
    #[must_use]
    pub fn canceller(&self) -> Canceller {
        Canceller(self.handle.clone())
    }

    /// Resolve parameters into a form seeded with default values
    ///
    /// # Errors
    /// - `ExecuteError::Cancelled` if cancelled before resolution finished
    /// - `ExecuteError::Params` if a deferred producer fails
    pub async fn resolve(self) -> Result<ParameterForm, ExecuteError> {
        let Self {
            command,
            registration,
            reference,
            ..
        } = self;
        let label = command.to_string();

        let source = command.params().clone();
        let resolved = Abortable::new(source.resolve(&label), registration).await;
        let spec = match resolved {
            Ok(spec) => spec?,
            Err(_aborted) => {
                tracing::debug!(command = %label, "parameter resolution cancelled");
                return Err(ExecuteError::Cancelled { command: label });
            }
        };

        tracing::debug!(command = %label, params = spec.len(), "parameters resolved");
        Ok(ParameterForm::new(command, spec, reference))
    }
}

/// One parameter input of a form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field<'a> {
    /// Parameter name
    pub name: &'a str,
    /// Declared options
    pub options: &'a ParamOptions,
    /// Current value, `None` while empty
    pub value: Option<&'a ParamValue>,
}

/// Result of submitting a form
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Handler ran with this data
    Submitted(ParamData),
    /// Validation blocked the submission; the handler did not run
    Blocked(Vec<ValidationError>),
    /// Handler failed and the failure was captured by an error boundary
    Failed {
        /// Command display name
        command: String,
        /// Rendered failure
        message: String,
    },
}

impl SubmitOutcome {
    /// Whether the handler ran successfully
    #[inline]
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

/// Parameter inputs for a resolved invocation
#[derive(Debug)]
pub struct ParameterForm {
    command: Command,
    spec: ParamSpec,
    values: IndexMap<String, Option<ParamValue>>,
    reference: DateTime<FixedOffset>,
    submitted: bool,
}

impl ParameterForm {
    fn new(command: Command, spec: ParamSpec, reference: DateTime<FixedOffset>) -> Self {
        let values = spec
            .iter()
            .map(|(name, options)| (name.to_string(), options.default_value()))
            .collect();
        Self {
            command,
            spec,
            values,
            reference,
            submitted: false,
        }
    }

    /// Command this form belongs to
    #[inline]
    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Resolved parameter spec
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &ParamSpec {
        &self.spec
    }

    /// Inputs in declaration order
    pub fn fields(&self) -> impl Iterator<Item = Field<'_>> {
        self.spec.iter().map(|(name, options)| Field {
            name,
            options,
            value: self.values.get(name).and_then(Option::as_ref),
        })
    }

    /// Current value of `name`
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Set `name` from raw user input
    ///
    /// Blank input clears the value. Wall-clock time input is placed on the
    /// date of the parameter's default, or of the form's reference time.
    ///
    /// # Errors
    /// - `ValidationError::UnknownParam` if `name` is not declared
    /// - `ValidationError::InvalidTime` if time input cannot be parsed
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), ValidationError> {
        let options = self.options(name)?;
        let reference = match options {
            ParamOptions::Time {
                default_value: Some(default),
                ..
            } => *default,
            _ => self.reference,
        };
        let value = options.parse_input(name, raw, reference)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Set `name` to an already typed value
    ///
    /// # Errors
    /// - `ValidationError::UnknownParam` if `name` is not declared
    /// - `ValidationError::TypeMismatch` if `value` has the wrong type
    pub fn set_value(&mut self, name: &str, value: ParamValue) -> Result<(), ValidationError> {
        let expected = self.options(name)?.param_type();
        if value.param_type() != expected {
            return Err(ValidationError::TypeMismatch {
                param: name.to_string(),
                expected,
            });
        }
        self.values.insert(name.to_string(), Some(value));
        Ok(())
    }

    /// Clear the value of `name`
    ///
    /// # Errors
    /// - `ValidationError::UnknownParam` if `name` is not declared
    pub fn clear(&mut self, name: &str) -> Result<(), ValidationError> {
        self.options(name)?;
        self.values.insert(name.to_string(), None);
        Ok(())
    }

    fn options(&self, name: &str) -> Result<&ParamOptions, ValidationError> {
        self.spec.get(name).ok_or_else(|| ValidationError::UnknownParam {
            param: name.to_string(),
        })
    }

    /// Assemble submitted data
    ///
    /// Optional parameters without a value are omitted.
    ///
    /// # Errors
    /// Every required parameter that has no value.
    pub fn validate(&self) -> Result<ParamData, Vec<ValidationError>> {
        let mut data = ParamData::new();
        let mut errors = Vec::new();
        for (name, options) in self.spec.iter() {
            match self.value(name) {
                Some(value) => data.insert(name, value.clone()),
                None if options.is_required() => errors.push(ValidationError::MissingRequired {
                    param: name.to_string(),
                }),
                None => {}
            }
        }
        if errors.is_empty() {
            Ok(data)
        } else {
            Err(errors)
        }
    }

    /// Whether the handler has been called
    #[inline]
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Validate and run the handler
    ///
    /// Validation problems are returned as [`SubmitOutcome::Blocked`] and
    /// leave the form open for correction. Once the handler has been
    /// called the form is spent, whether or not the handler succeeded.
    ///
    /// # Errors
    /// - `ExecuteError::AlreadySubmitted` if the handler was already called
    /// - `ExecuteError::Handler` if the handler fails
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ExecuteError> {
        if self.submitted {
            return Err(ExecuteError::AlreadySubmitted {
                command: self.command.to_string(),
            });
        }

        let data = match self.validate() {
            Ok(data) => data,
            Err(errors) => {
                tracing::debug!(command = %self.command, errors = errors.len(), "submission blocked");
                return Ok(SubmitOutcome::Blocked(errors));
            }
        };

        self.submitted = true;
        self.command
            .handler()
            .submit(data.clone())
            .await
            .map_err(|source| ExecuteError::Handler {
                command: self.command.to_string(),
                source,
            })?;

        tracing::debug!(command = %self.command, "command submitted");
        Ok(SubmitOutcome::Submitted(data))
    }
}
