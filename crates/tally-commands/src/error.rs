//! Error types for Tally Commands
//!
//! - [`ValidationError`]: recoverable input problems; they block a
//!   submission and are reported as values, never raised
//! - [`ExecuteError`]: handler, params-producer and lifecycle failures
//! - [`CommandError`]: typed access to submitted data

use crate::params::ParamType;

/// Parameter input problems that block submission
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required parameter has no value
    #[error("`{param}` is required")]
    MissingRequired {
        /// Parameter name
        param: String,
    },

    /// Time input could not be parsed
    #[error("`{input}` is not a valid time for `{param}`")]
    InvalidTime {
        /// Parameter name
        param: String,
        /// Rejected input
        input: String,
    },

    /// Value of the wrong type for the parameter
    #[error("`{param}` expects a {expected} value")]
    TypeMismatch {
        /// Parameter name
        param: String,
        /// Declared type
        expected: ParamType,
    },

    /// Parameter not declared by the command
    #[error("unknown parameter `{param}`")]
    UnknownParam {
        /// Parameter name
        param: String,
    },
}

impl ValidationError {
    /// Parameter the error refers to
    #[inline]
    #[must_use]
    pub fn param(&self) -> &str {
        match self {
            Self::MissingRequired { param }
            | Self::InvalidTime { param, .. }
            | Self::TypeMismatch { param, .. }
            | Self::UnknownParam { param } => param,
        }
    }
}

/// Command invocation failures
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// Deferred parameter producer failed
    #[error("resolving parameters for {command} failed: {source}")]
    Params {
        /// Command display name
        command: String,
        /// Producer error
        #[source]
        source: anyhow::Error,
    },

    /// Submit handler failed
    #[error("{command} failed: {source}")]
    Handler {
        /// Command display name
        command: String,
        /// Handler error
        #[source]
        source: anyhow::Error,
    },

    /// Parameter resolution was cancelled
    #[error("{command} was cancelled")]
    Cancelled {
        /// Command display name
        command: String,
    },

    /// Form was already submitted
    #[error("{command} was already submitted")]
    AlreadySubmitted {
        /// Command display name
        command: String,
    },
}

impl ExecuteError {
    /// Display name of the command that failed
    #[inline]
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Params { command, .. }
            | Self::Handler { command, .. }
            | Self::Cancelled { command }
            | Self::AlreadySubmitted { command } => command,
        }
    }

    /// Whether the failure came from a collaborator (handler or producer)
    #[inline]
    #[must_use]
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, Self::Params { .. } | Self::Handler { .. })
    }
}

/// Typed access errors on submitted data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Value not present
    #[error("missing value for `{0}`")]
    MissingValue(String),

    /// Value present with another type
    #[error("`{param}` is not a {expected} value")]
    WrongType {
        /// Parameter name
        param: String,
        /// Requested type
        expected: ParamType,
    },
}
