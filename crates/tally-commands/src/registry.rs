//! Command registry
//!
//! Holds registered commands in insertion order, at most one per
//! [`CommandKey`]. A colliding registration is resolved by the registry's
//! [`DuplicatePolicy`].

use crate::command::{Command, CommandKey};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// What `add` does with a command whose key is already registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Ignore the newcomer; the first registration wins
    #[default]
    KeepFirst,
    /// Replace the existing entry in place, keeping its position
    Replace,
}

/// Registry of commands
///
/// Guards are counted per key: the command is unregistered when the last
/// guard for its key is dropped.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: RwLock<Vec<Command>>,
    mounts: Mutex<HashMap<CommandKey, usize>>,
    policy: DuplicatePolicy,
}

impl CommandRegistry {
    /// Create new empty registry with the first-wins policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new empty registry with `policy`
    #[inline]
    #[must_use]
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            commands: RwLock::new(Vec::new()),
            mounts: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// Duplicate policy in effect
    #[inline]
    #[must_use]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Add a command
    ///
    /// Returns `true` if the registry changed.
    pub fn add(&self, command: Command) -> bool {
        let mut commands = self.commands.write();
        match commands.iter().position(|c| c.same_key(&command)) {
            None => {
                tracing::debug!(command = %command, "command added");
                commands.push(command);
                true
            }
            Some(index) => match self.policy {
                DuplicatePolicy::KeepFirst => {
                    tracing::trace!(command = %command, "duplicate command ignored");
                    false
                }
                DuplicatePolicy::Replace => {
                    tracing::debug!(command = %command, "command replaced");
                    commands[index] = command;
                    true
                }
            },
        }
    }

    /// Remove the entry with the same key as `command`
    pub fn remove(&self, command: &Command) -> bool {
        self.remove_key(command.key())
    }

    /// Remove the entry with `key`
    pub fn remove_key(&self, key: &CommandKey) -> bool {
        let mut commands = self.commands.write();
        match commands.iter().position(|c| c.key() == key) {
            Some(index) => {
                commands.remove(index);
                tracing::debug!(command = %key, "command removed");
                true
            }
            None => false,
        }
    }

    /// Registered command with `key`
    #[must_use]
    pub fn find(&self, key: &CommandKey) -> Option<Command> {
        self.commands.read().iter().find(|c| c.key() == key).cloned()
    }

    /// Snapshot of all commands in insertion order
    #[must_use]
    pub fn state(&self) -> Vec<Command> {
        self.commands.read().clone()
    }

    /// Number of registered commands
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Drop every command
    pub fn clear(&self) {
        let mut mounts = self.mounts.lock();
        mounts.clear();
        self.commands.write().clear();
    }

    /// Number of live guards for `key`
    #[must_use]
    pub fn guard_count(&self, key: &CommandKey) -> usize {
        self.mounts.lock().get(key).copied().unwrap_or(0)
    }

    /// Register `command` for the lifetime of the returned guard
    ///
    /// The duplicate policy applies as for [`add`](Self::add).
    pub fn register(self: &Arc<Self>, command: Command) -> CommandGuard {
        let key = command.key().clone();
        let mut mounts = self.mounts.lock();
        *mounts.entry(key.clone()).or_insert(0) += 1;
        self.add(command);
        drop(mounts);
        CommandGuard {
            registry: Arc::clone(self),
            key,
        }
    }

    fn release(&self, key: &CommandKey) {
        let mut mounts = self.mounts.lock();
        let Some(count) = mounts.get_mut(key) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            mounts.remove(key);
            self.remove_key(key);
        }
    }
}

/// Scoped command registration
///
/// Dropping the last guard for a key removes whichever command currently
/// holds it.
#[derive(Debug)]
#[must_use = "dropping the guard unregisters the command"]
pub struct CommandGuard {
    registry: Arc<CommandRegistry>,
    key: CommandKey,
}

impl CommandGuard {
    /// Key of the guarded command
    #[inline]
    #[must_use]
    pub fn key(&self) -> &CommandKey {
        &self.key
    }
}

impl Drop for CommandGuard {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::sync_submit_fn;
    use tally_context::Subject;

    fn command(id: &str, name: &str, description: &str) -> Command {
        Command::new(Subject::with_id("Entry", id), name, sync_submit_fn(|_| Ok(())))
            .with_description(description)
    }

    #[test]
    fn first_registration_wins() {
        let registry = CommandRegistry::new();
        assert!(registry.add(command("42", "delete", "first")));
        assert!(!registry.add(command("42", "delete", "second")));

        let state = registry.state();
        assert_eq!(state.len(), 1);
        assert_eq!(state[0].description(), "first");
    }

    #[test]
    fn replace_policy_keeps_position() {
        let registry = CommandRegistry::with_policy(DuplicatePolicy::Replace);
        registry.add(command("1", "delete", "first"));
        registry.add(command("2", "delete", "other"));
        assert!(registry.add(command("1", "delete", "second")));

        let state = registry.state();
        assert_eq!(state.len(), 2);
        assert_eq!(state[0].description(), "second");
        assert_eq!(state[1].subject().id(), Some("2"));
    }

    #[test]
    fn remove_by_key() {
        let registry = CommandRegistry::new();
        registry.add(command("1", "delete", ""));
        registry.add(command("1", "describe", ""));

        assert!(registry.remove(&command("1", "delete", "payload differs")));
        assert!(!registry.remove(&command("1", "delete", "")));
        assert_eq!(registry.len(), 1);
        assert!(registry
            .find(&CommandKey::new(Subject::with_id("Entry", "1"), "describe"))
            .is_some());
    }

    #[test]
    fn guard_unregisters_on_drop() {
        let registry = Arc::new(CommandRegistry::new());
        let guard = registry.register(command("7", "delete", ""));
        assert_eq!(guard.key().name, "delete");
        assert_eq!(registry.len(), 1);
        drop(guard);
        assert!(registry.is_empty());
    }

    #[test]
    fn reassigned_guard_keeps_command() {
        let registry = Arc::new(CommandRegistry::new());
        let mut guard = registry.register(command("7", "delete", "first"));
        assert_eq!(registry.guard_count(guard.key()), 1);
        guard = registry.register(command("7", "delete", "second"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.guard_count(guard.key()), 1);
        assert_eq!(registry.state()[0].description(), "first");

        drop(guard);
        assert!(registry.is_empty());
    }

    #[test]
    fn replaced_command_outlives_first_guard() {
        let registry = Arc::new(CommandRegistry::with_policy(DuplicatePolicy::Replace));
        let first = registry.register(command("7", "delete", "first"));
        let second = registry.register(command("7", "delete", "second"));

        drop(first);
        let state = registry.state();
        assert_eq!(state.len(), 1);
        assert_eq!(state[0].description(), "second");

        drop(second);
        assert!(registry.is_empty());
    }

    #[test]
    fn policy_deserializes_snake_case() {
        let policy: DuplicatePolicy = serde_json::from_str("\"keep_first\"").unwrap();
        assert_eq!(policy, DuplicatePolicy::KeepFirst);
        let policy: DuplicatePolicy = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(policy, DuplicatePolicy::Replace);
    }
}
