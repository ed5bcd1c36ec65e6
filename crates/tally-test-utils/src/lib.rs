//! Testing utilities for the Tally palette workspace
//!
//! Shared fixtures: subjects, named element trees and recording handlers.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tally_commands::{Command, ParamData, ParamOptions, ParamSpec, SubmitHandler};
use tally_context::{ContextError, ElementId, ElementTree, ParentageTree, Subject};

pub fn entry(id: impl Into<String>) -> Subject {
    Subject::with_id("Entry", id)
}

pub fn log() -> Subject {
    Subject::new("Log")
}

pub fn auth() -> Subject {
    Subject::new("Auth")
}

/// Element tree addressed by name
#[derive(Debug, Default)]
pub struct NamedTree {
    tree: ParentageTree,
    names: HashMap<String, ElementId>,
}

impl NamedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, name: &str) -> Self {
        let id = self.tree.insert_root();
        self.names.insert(name.to_string(), id);
        self
    }

    pub fn child(mut self, name: &str, parent: &str) -> Self {
        let parent = self.id(parent);
        let id = self.tree.insert_child(parent).unwrap();
        self.names.insert(name.to_string(), id);
        self
    }

    /// Handle for `name`; panics if unknown
    pub fn id(&self, name: &str) -> ElementId {
        *self
            .names
            .get(name)
            .unwrap_or_else(|| panic!("no element named `{name}`"))
    }

    pub fn detach(&mut self, name: &str) -> Result<usize, ContextError> {
        let id = self.id(name);
        self.tree.detach(id)
    }

    pub fn tree(&self) -> &ParentageTree {
        &self.tree
    }
}

impl ElementTree for NamedTree {
    fn is_attached(&self, element: ElementId) -> bool {
        self.tree.is_attached(element)
    }

    fn contains(&self, ancestor: ElementId, target: ElementId) -> bool {
        self.tree.contains(ancestor, target)
    }
}

/// Screen layout used across tests
///
/// ```text
/// document
/// ├── list
/// │   ├── row-42 ── row-42-label
/// │   └── row-7
/// ├── sidebar
/// └── palette ── palette-input
/// ```
pub fn screen() -> NamedTree {
    NamedTree::new()
        .root("document")
        .child("list", "document")
        .child("row-42", "list")
        .child("row-42-label", "row-42")
        .child("row-7", "list")
        .child("sidebar", "document")
        .child("palette", "document")
        .child("palette-input", "palette")
}

/// Submit handler that records every call
#[derive(Debug, Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<ParamData>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<ParamData> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl SubmitHandler for RecordingHandler {
    async fn submit(&self, data: ParamData) -> anyhow::Result<()> {
        self.calls.lock().push(data);
        Ok(())
    }
}

/// Submit handler that always fails
#[derive(Debug)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    pub fn new(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            message: message.into(),
        })
    }
}

#[async_trait]
impl SubmitHandler for FailingHandler {
    async fn submit(&self, _data: ParamData) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("{}", self.message))
    }
}

pub fn delete_entry(id: &str, handler: Arc<dyn SubmitHandler>) -> Command {
    Command::new(entry(id), "delete", handler).with_description("Delete this entry")
}

pub fn describe_entry(id: &str, handler: Arc<dyn SubmitHandler>) -> Command {
    Command::new(entry(id), "describe", handler)
        .with_description("Change the description")
        .with_params(ParamSpec::new().with("description", ParamOptions::string().required()))
}

pub fn start_log(handler: Arc<dyn SubmitHandler>) -> Command {
    Command::new(log(), "start", handler)
        .with_description("Start tracking time")
        .with_params(
            ParamSpec::new()
                .with("description", ParamOptions::string())
                .with("start", ParamOptions::time()),
        )
}
