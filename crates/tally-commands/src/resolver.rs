//! Palette visibility
//!
//! A command is visible iff its subject is in context and it is enabled.
//! There is no ranking: visible commands keep registry insertion order.

use crate::command::{Command, CommandKey};
use crate::registry::CommandRegistry;
use std::sync::Arc;
use tally_context::{ContextStore, Subject};

/// Filter `commands` down to those visible for `context`
#[must_use]
pub fn resolve_visible(context: &[Subject], commands: &[Command]) -> Vec<Command> {
    commands
        .iter()
        .filter(|c| c.is_enabled() && context.contains(c.subject()))
        .cloned()
        .collect()
}

/// Live view of the visible command list
#[derive(Debug, Clone)]
pub struct CommandResolver {
    context: Arc<ContextStore>,
    commands: Arc<CommandRegistry>,
}

impl CommandResolver {
    /// Create resolver over shared registries
    #[inline]
    #[must_use]
    pub fn new(context: Arc<ContextStore>, commands: Arc<CommandRegistry>) -> Self {
        Self { context, commands }
    }

    /// Commands visible right now
    #[must_use]
    pub fn visible(&self) -> Vec<Command> {
        resolve_visible(&self.context.state(), &self.commands.state())
    }

    /// Visible commands matching `query`
    ///
    /// Case-insensitive substring match against name, description and the
    /// display form (`Entry.delete(42)`). An empty query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Command> {
        let needle = query.trim().to_lowercase();
        let mut visible = self.visible();
        if needle.is_empty() {
            return visible;
        }
        visible.retain(|c| {
            c.name().to_lowercase().contains(&needle)
                || c.description().to_lowercase().contains(&needle)
                || c.to_string().to_lowercase().contains(&needle)
        });
        visible
    }

    /// Whether the command with `key` is currently visible
    #[must_use]
    pub fn is_visible(&self, key: &CommandKey) -> bool {
        self.commands
            .find(key)
            .is_some_and(|c| c.is_enabled() && self.context.has_subject(c.subject()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::sync_submit_fn;

    fn command(subject: Subject, name: &str) -> Command {
        Command::new(subject, name, sync_submit_fn(|_| Ok(())))
    }

    fn entry(id: &str) -> Subject {
        Subject::with_id("Entry", id)
    }

    #[test]
    fn filters_by_context_in_registry_order() {
        let commands = vec![
            command(entry("1"), "delete"),
            command(Subject::new("Log"), "start"),
            command(entry("2"), "delete"),
            command(entry("1"), "describe"),
        ];
        let context = vec![entry("1"), Subject::new("Log")];

        let names: Vec<String> = resolve_visible(&context, &commands)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, vec!["Entry.delete(1)", "Log.start()", "Entry.describe(1)"]);
    }

    #[test]
    fn disabled_commands_hidden() {
        let commands = vec![command(Subject::new("Log"), "stop").enabled(false)];
        assert!(resolve_visible(&[Subject::new("Log")], &commands).is_empty());
    }

    #[test]
    fn search_narrows_visible_list() {
        let context = Arc::new(ContextStore::new());
        let registry = Arc::new(CommandRegistry::new());
        context.add(entry("42"));
        registry.add(command(entry("42"), "delete").with_description("Remove the entry"));
        registry.add(command(entry("42"), "describe").with_description("Edit description"));
        registry.add(command(entry("7"), "delete"));

        let resolver = CommandResolver::new(context, registry);
        assert_eq!(resolver.search("").len(), 2);
        assert_eq!(resolver.search("REMOVE").len(), 1);
        assert_eq!(resolver.search("entry.de").len(), 2);
        assert!(resolver.search("Log").is_empty());
    }

    #[test]
    fn is_visible_tracks_context() {
        let context = Arc::new(ContextStore::new());
        let registry = Arc::new(CommandRegistry::new());
        registry.add(command(entry("42"), "delete"));
        let resolver = CommandResolver::new(Arc::clone(&context), registry);
        let key = CommandKey::new(entry("42"), "delete");

        assert!(!resolver.is_visible(&key));
        context.add(entry("42"));
        assert!(resolver.is_visible(&key));
        context.remove(&entry("42"));
        assert!(!resolver.is_visible(&key));
    }
}
