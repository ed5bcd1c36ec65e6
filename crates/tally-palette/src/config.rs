//! Palette configuration
//!
//! ```toml
//! duplicate_commands = "replace"
//! reconcile_after_signal = true
//!
//! [log]
//! filter = "tally_context=debug,info"
//! json = false
//! ```

use crate::error::PaletteError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_commands::DuplicatePolicy;

/// Environment variable overriding [`LogConfig::filter`]
pub const LOG_ENV: &str = "TALLY_PALETTE_LOG";

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// What happens when a command key is registered twice
    pub duplicate_commands: DuplicatePolicy,
    /// Run a reconciliation pass after every routed input signal
    pub reconcile_after_signal: bool,
    /// Logging setup
    pub log: LogConfig,
}

impl PaletteConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML
    ///
    /// # Errors
    /// - `PaletteError::ConfigParse` on malformed TOML or unknown values
    pub fn from_toml_str(source: &str) -> Result<Self, PaletteError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - `PaletteError::ConfigRead` if the file cannot be read
    /// - `PaletteError::ConfigParse` on malformed TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PaletteError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| PaletteError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Apply environment overrides
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    #[must_use]
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(filter) = lookup(LOG_ENV).filter(|f| !f.trim().is_empty()) {
            self.log.filter = filter;
        }
        self
    }

    /// With duplicate command policy
    #[inline]
    #[must_use]
    pub fn with_duplicate_commands(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_commands = policy;
        self
    }

    /// With reconcile-after-signal flag
    #[inline]
    #[must_use]
    pub fn with_reconcile_after_signal(mut self, enabled: bool) -> Self {
        self.reconcile_after_signal = enabled;
        self
    }

    /// With logging setup
    #[inline]
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            duplicate_commands: DuplicatePolicy::KeepFirst,
            reconcile_after_signal: true,
            log: LogConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives
    pub filter: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
