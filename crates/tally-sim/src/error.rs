//! Error types for the scenario simulator

use std::path::PathBuf;
use tally_context::ContextError;
use tally_palette::PaletteError;

/// Simulator error type
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Scenario file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// Extension is not yaml, yml or json
    #[error("unsupported scenario format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Malformed YAML scenario
    #[error("invalid YAML scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON scenario
    #[error("invalid JSON scenario: {0}")]
    Json(#[from] serde_json::Error),

    /// Element name not declared
    #[error("unknown element `{0}`")]
    UnknownElement(String),

    /// Element name declared twice
    #[error("duplicate element `{0}`")]
    DuplicateElement(String),

    /// Command not registered
    #[error("unknown command {0}")]
    UnknownCommand(String),

    /// Element tree rejected an operation
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Palette setup failed
    #[error(transparent)]
    Palette(#[from] PaletteError),
}
