//! Error types for Tally Palette
//!
//! [`PaletteError`] covers configuration and bootstrap failures.
//! [`ErrorSurface`] is the palette's top-level error boundary: handler and
//! params failures land there instead of unwinding through the registries.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::path::PathBuf;
use tally_commands::ExecuteError;

/// Palette error type
#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    /// Configuration file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// File path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Log filter directive is invalid
    #[error("invalid log filter `{filter}`: {reason}")]
    LogFilter {
        /// Offending filter
        filter: String,
        /// Parser message
        reason: String,
    },
}

/// Failure captured by the error boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    /// Command display name
    pub command: String,
    /// Rendered error chain
    pub message: String,
    /// When the failure was captured
    pub at: DateTime<Utc>,
}

/// Top-level error boundary of one palette session
///
/// Captured errors are kept until taken; nothing else in the session is
/// touched when a failure is reported.
#[derive(Debug, Default)]
pub struct ErrorSurface {
    reported: RwLock<Vec<ReportedError>>,
}

impl ErrorSurface {
    /// Create an empty surface
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an execution failure
    pub fn report(&self, error: &ExecuteError) -> ReportedError {
        let reported = ReportedError {
            command: error.command().to_string(),
            message: render_chain(error),
            at: Utc::now(),
        };
        tracing::warn!(command = %reported.command, error = %reported.message, "command failed");
        self.reported.write().push(reported.clone());
        reported
    }

    /// Most recent failure
    #[must_use]
    pub fn latest(&self) -> Option<ReportedError> {
        self.reported.read().last().cloned()
    }

    /// All captured failures, oldest first
    #[must_use]
    pub fn reported(&self) -> Vec<ReportedError> {
        self.reported.read().clone()
    }

    /// Take and clear captured failures
    pub fn take(&self) -> Vec<ReportedError> {
        std::mem::take(&mut *self.reported.write())
    }

    /// Number of captured failures
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.reported.read().len()
    }

    /// Check if nothing was captured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reported.read().is_empty()
    }
}

fn render_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let rendered = cause.to_string();
        if !message.contains(&rendered) {
            message.push_str(": ");
            message.push_str(&rendered);
        }
        source = cause.source();
    }
    message
}
