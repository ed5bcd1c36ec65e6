//! Scenario files
//!
//! A scenario declares an element tree, the commands available, and a
//! sequence of steps:
//!
//! ```yaml
//! name: delete an entry
//! elements:
//!   - { name: document }
//!   - { name: row-42, parent: document }
//! commands:
//!   - subject: { type: Entry, id: "42" }
//!     name: delete
//! steps:
//!   - { op: mount, subject: { type: Entry, id: "42" }, element: row-42 }
//!   - { op: click, target: row-42 }
//!   - { op: submit, subject: { type: Entry, id: "42" }, name: delete }
//! ```

use crate::error::SimError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_commands::ParamSpec;
use tally_context::Subject;

/// A scripted interaction
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Element tree, parents declared before children
    #[serde(default)]
    pub elements: Vec<ElementDecl>,
    /// Element hosting the palette UI
    #[serde(default)]
    pub palette_root: Option<String>,
    /// Commands registered before the first step
    #[serde(default)]
    pub commands: Vec<CommandDecl>,
    /// Steps in order
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse YAML
    ///
    /// # Errors
    /// - `SimError::Yaml` on malformed input
    pub fn from_yaml(source: &str) -> Result<Self, SimError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parse JSON
    ///
    /// # Errors
    /// - `SimError::Json` on malformed input
    pub fn from_json(source: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a file, choosing the format by extension
    ///
    /// # Errors
    /// - `SimError::Io` if the file cannot be read
    /// - `SimError::UnsupportedFormat` for extensions other than
    ///   `yaml`, `yml` and `json`
    /// - `SimError::Yaml` / `SimError::Json` on malformed input
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let source = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&source),
            "json" => Self::from_json(&source),
            _ => Err(SimError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Element declaration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ElementDecl {
    /// Unique element name
    pub name: String,
    /// Parent element, `None` for a root
    #[serde(default)]
    pub parent: Option<String>,
}

/// Command declaration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommandDecl {
    /// Subject the command acts on
    pub subject: Subject,
    /// Command name
    pub name: String,
    /// Description shown in the palette
    #[serde(default)]
    pub description: String,
    /// Parameter declarations
    #[serde(default)]
    pub params: ParamSpec,
    /// Listed in the palette while in context
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Make the handler fail with this message
    #[serde(default)]
    pub fail: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Expected result of a submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// Handler ran
    #[default]
    Submitted,
    /// Validation blocked the submission
    Blocked,
    /// Handler or params producer failed
    Failed,
}

/// One scripted step
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Mount an element trigger
    Mount {
        /// Subject claimed
        subject: Subject,
        /// Element name
        element: String,
    },
    /// Unmount an element trigger
    Unmount {
        /// Subject claimed
        subject: Subject,
        /// Element name
        element: String,
    },
    /// Mount, enable or disable the automatic trigger for a subject
    Auto {
        /// Subject claimed
        subject: Subject,
        /// Whether the trigger is active
        #[serde(default = "default_true")]
        enabled: bool,
    },
    /// Pointer activation
    Click {
        /// Element name
        target: String,
    },
    /// Focus change
    Focus {
        /// Element name
        target: String,
    },
    /// Remove an element and its subtree from the tree
    Detach {
        /// Element name
        element: String,
    },
    /// Reconciliation pass
    Reconcile,
    /// Register an additional command
    Register {
        /// Command declaration
        command: CommandDecl,
    },
    /// Unregister a command
    Unregister {
        /// Subject of the command
        subject: Subject,
        /// Command name
        name: String,
    },
    /// Narrow the visible list
    Search {
        /// Query text
        query: String,
    },
    /// Run a visible command with raw inputs
    Submit {
        /// Subject of the command
        subject: Subject,
        /// Command name
        name: String,
        /// Raw input per parameter
        #[serde(default)]
        values: IndexMap<String, String>,
        /// Expected outcome
        #[serde(default)]
        expect: Expectation,
    },
    /// Assert the current state
    Expect {
        /// Exact context, in order
        #[serde(default)]
        context: Option<Vec<Subject>>,
        /// Exact visible command list, in order
        #[serde(default)]
        visible: Option<Vec<String>>,
    },
}

impl Step {
    /// Short label for reports
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Mount { subject, element } => format!("mount {subject} on {element}"),
            Self::Unmount { subject, element } => format!("unmount {subject} from {element}"),
            Self::Auto { subject, enabled } => format!("auto {subject} = {enabled}"),
            Self::Click { target } => format!("click {target}"),
            Self::Focus { target } => format!("focus {target}"),
            Self::Detach { element } => format!("detach {element}"),
            Self::Reconcile => "reconcile".to_string(),
            Self::Register { command } => {
                format!("register {}.{}", command.subject.kind(), command.name)
            }
            Self::Unregister { subject, name } => {
                format!("unregister {}.{name}", subject.kind())
            }
            Self::Search { query } => format!("search {query:?}"),
            Self::Submit { subject, name, .. } => {
                format!("submit {}.{name}({})", subject.kind(), subject.id().unwrap_or_default())
            }
            Self::Expect { .. } => "expect".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_steps() {
        let scenario = Scenario::from_yaml(
            r#"
elements:
  - name: document
  - name: row
    parent: document
commands:
  - subject: { type: Entry, id: "1" }
    name: describe
    params:
      description: { type: string, required: true }
steps:
  - { op: mount, subject: { type: Entry, id: "1" }, element: row }
  - { op: click, target: row }
  - op: submit
    subject: { type: Entry, id: "1" }
    name: describe
    values: { description: "fix typo" }
  - { op: reconcile }
"#,
        )
        .unwrap();

        assert_eq!(scenario.elements.len(), 2);
        assert_eq!(scenario.commands[0].params.len(), 1);
        assert!(scenario.commands[0].enabled);
        assert_eq!(scenario.steps.len(), 4);
        assert_eq!(scenario.steps[3].label(), "reconcile");
        assert!(matches!(
            &scenario.steps[2],
            Step::Submit { expect: Expectation::Submitted, values, .. } if values.len() == 1
        ));
    }

    #[test]
    fn register_step_from_json() {
        let scenario = Scenario::from_json(
            r#"{"steps": [{"op": "register", "command": {"subject": {"type": "Log"}, "name": "stop", "enabled": false}}]}"#,
        )
        .unwrap();
        match &scenario.steps[0] {
            Step::Register { command } => {
                assert_eq!(command.name, "stop");
                assert!(!command.enabled);
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_op() {
        assert!(Scenario::from_yaml("steps: [{ op: teleport }]").is_err());
    }
}
