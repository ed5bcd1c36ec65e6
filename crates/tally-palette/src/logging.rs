//! Logging bootstrap
//!
//! Installs a global `tracing` subscriber writing to stderr, once per
//! process. `RUST_LOG` takes precedence over the configured filter.

use crate::config::LogConfig;
use crate::error::PaletteError;
use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install the global subscriber
///
/// Returns `Ok(true)` if this call installed it, `Ok(false)` if logging was
/// already initialized (by an earlier call or by the host application).
///
/// # Errors
/// - `PaletteError::LogFilter` if the configured filter does not parse
pub fn init_logging(config: &LogConfig) -> Result<bool, PaletteError> {
    let mut installed = false;
    LOGGING.get_or_try_init(|| -> Result<(), PaletteError> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => parse_filter(&config.filter)?,
        };

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
        installed = result.is_ok();
        Ok(())
    })?;

    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "logging initialized");
    }
    Ok(installed)
}

/// Parse filter directives without consulting the environment
///
/// # Errors
/// - `PaletteError::LogFilter` if `directives` is malformed
pub fn parse_filter(directives: &str) -> Result<EnvFilter, PaletteError> {
    EnvFilter::try_new(directives).map_err(|e| PaletteError::LogFilter {
        filter: directives.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("tally_context=debug,tally_commands=trace,warn").is_ok());
    }

    #[test]
    fn rejects_invalid_level() {
        let err = parse_filter("tally_context=loud").unwrap_err();
        assert!(matches!(err, PaletteError::LogFilter { .. }));
    }

    #[test]
    fn second_init_is_noop() {
        let config = LogConfig::default();
        init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
    }
}
