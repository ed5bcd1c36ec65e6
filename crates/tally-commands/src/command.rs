//! Command definitions
//!
//! A [`Command`] is identified by its [`CommandKey`]: the subject it acts on
//! plus its name. Everything else (description, params, handler, enabled
//! flag) is payload.

use crate::handler::{ParamSource, ParamsProducer, SubmitHandler};
use crate::params::ParamSpec;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use tally_context::Subject;

/// Identity of a command: `(subject, name)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandKey {
    /// Subject the command acts on
    pub subject: Subject,
    /// Command name
    pub name: String,
}

impl CommandKey {
    /// Create a key
    #[inline]
    #[must_use]
    pub fn new(subject: Subject, name: impl Into<String>) -> Self {
        Self {
            subject,
            name: name.into(),
        }
    }
}

impl Display for CommandKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.subject.kind(),
            self.name,
            self.subject.id().unwrap_or_default()
        )
    }
}

/// Subject-scoped action
///
/// Cloning is cheap: the handler and any params producer are shared.
#[derive(Clone)]
pub struct Command {
    key: CommandKey,
    description: String,
    params: ParamSource,
    handler: Arc<dyn SubmitHandler>,
    enabled: bool,
}

impl Command {
    /// Create an enabled command without parameters
    #[must_use]
    pub fn new(subject: Subject, name: impl Into<String>, handler: Arc<dyn SubmitHandler>) -> Self {
        Self {
            key: CommandKey::new(subject, name),
            description: String::new(),
            params: ParamSource::default(),
            handler,
            enabled: true,
        }
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With a parameter spec known up front
    #[must_use]
    pub fn with_params(mut self, spec: ParamSpec) -> Self {
        self.params = ParamSource::Static(spec);
        self
    }

    /// With a parameter spec produced on selection
    #[must_use]
    pub fn with_params_producer(mut self, producer: Arc<dyn ParamsProducer>) -> Self {
        self.params = ParamSource::Deferred(producer);
        self
    }

    /// Set the enabled flag
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Identity key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &CommandKey {
        &self.key
    }

    /// Subject the command acts on
    #[inline]
    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.key.subject
    }

    /// Command name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// Human readable description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameter source
    #[inline]
    #[must_use]
    pub fn params(&self) -> &ParamSource {
        &self.params
    }

    /// Submit handler
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn SubmitHandler> {
        &self.handler
    }

    /// Whether the command may appear in the palette
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `other` has the same identity key
    #[inline]
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.key, f)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("subject", &self.key.subject)
            .field("name", &self.key.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::sync_submit_fn;
    use crate::params::ParamOptions;

    fn noop() -> Arc<dyn SubmitHandler> {
        sync_submit_fn(|_| Ok(()))
    }

    #[test]
    fn display_includes_subject_id() {
        let cmd = Command::new(Subject::with_id("Entry", "42"), "delete", noop());
        assert_eq!(cmd.to_string(), "Entry.delete(42)");

        let cmd = Command::new(Subject::new("Log"), "start", noop());
        assert_eq!(cmd.to_string(), "Log.start()");
    }

    #[test]
    fn builder_sets_payload() {
        let cmd = Command::new(Subject::new("Log"), "start", noop())
            .with_description("Start tracking")
            .with_params(ParamSpec::new().with("description", ParamOptions::string()))
            .enabled(false);

        assert_eq!(cmd.description(), "Start tracking");
        assert!(!cmd.is_enabled());
        assert!(!cmd.params().is_deferred());
    }

    #[test]
    fn key_ignores_payload() {
        let a = Command::new(Subject::with_id("Entry", "1"), "delete", noop());
        let b = Command::new(Subject::with_id("Entry", "1"), "delete", noop())
            .with_description("different")
            .enabled(false);
        let c = Command::new(Subject::with_id("Entry", "2"), "delete", noop());

        assert!(a.same_key(&b));
        assert!(!a.same_key(&c));
    }
}
