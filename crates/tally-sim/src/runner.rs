//! Scenario execution
//!
//! [`Runner`] owns one [`Palette`] session plus the element tree and the
//! registration guards a UI would hold, and applies steps to it one by one.

use crate::error::SimError;
use crate::scenario::{CommandDecl, Expectation, Scenario, Step};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use tally_commands::{Command, CommandGuard, CommandKey, ParamData, SubmitHandler, SubmitOutcome};
use tally_context::{ElementId, InputSignal, ParentageTree, Subject, Trigger, TriggerGuard};
use tally_palette::{Palette, PaletteConfig};

/// Data received by a scenario handler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    /// Command display name
    pub command: String,
    /// Submitted data
    pub data: ParamData,
}

type SubmissionLog = Arc<Mutex<Vec<Submission>>>;

struct EchoHandler {
    command: String,
    fail: Option<String>,
    log: SubmissionLog,
}

#[async_trait]
impl SubmitHandler for EchoHandler {
    async fn submit(&self, data: ParamData) -> anyhow::Result<()> {
        if let Some(message) = &self.fail {
            anyhow::bail!("{message}");
        }
        self.log.lock().push(Submission {
            command: self.command.clone(),
            data,
        });
        Ok(())
    }
}

/// Result of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Position in the scenario, starting at 1
    pub index: usize,
    /// Step label
    pub step: String,
    /// Whether the step did what the scenario expected
    pub ok: bool,
    /// What happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Context after the step
    pub context: Vec<String>,
    /// Visible commands after the step
    pub visible: Vec<String>,
}

/// Result of a whole scenario
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Scenario name
    pub scenario: Option<String>,
    /// Palette session id
    pub session: String,
    /// Per-step results
    pub steps: Vec<StepReport>,
    /// Successful handler calls, in order
    pub submissions: Vec<Submission>,
    /// Failures captured by the palette's error boundary
    pub errors: Vec<String>,
}

impl RunReport {
    /// Whether every step succeeded
    #[must_use]
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.ok)
    }

    /// Number of failed steps
    #[must_use]
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.ok).count()
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.scenario {
            writeln!(f, "== {name} ==")?;
        }
        for step in &self.steps {
            let status = if step.ok { "ok" } else { "FAILED" };
            writeln!(f, "[{:>2}] {:<44} {status}", step.index, step.step)?;
            if let Some(detail) = &step.detail {
                writeln!(f, "     {detail}")?;
            }
            writeln!(f, "     context: {}", join_or_dash(&step.context))?;
            writeln!(f, "     visible: {}", join_or_dash(&step.visible))?;
        }
        for submission in &self.submissions {
            let data = submission
                .data
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "submitted {} {{{data}}}", submission.command)?;
        }
        for error in &self.errors {
            writeln!(f, "error: {error}")?;
        }
        writeln!(f, "{} steps, {} failed", self.steps.len(), self.failures())
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

struct StepResult {
    ok: bool,
    detail: Option<String>,
}

impl StepResult {
    fn ok(detail: Option<String>) -> Self {
        Self { ok: true, detail }
    }

    fn failed(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            detail: Some(detail.into()),
        }
    }
}

/// Drives one palette session through a scenario
pub struct Runner {
    palette: Palette,
    tree: ParentageTree,
    elements: IndexMap<String, ElementId>,
    element_triggers: HashMap<(Subject, ElementId), TriggerGuard>,
    auto_triggers: HashMap<Subject, TriggerGuard>,
    commands: HashMap<CommandKey, CommandGuard>,
    submissions: SubmissionLog,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("palette", &self.palette)
            .field("elements", &self.elements.len())
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Build the session, element tree and initial commands
    ///
    /// # Errors
    /// - `SimError::DuplicateElement` / `SimError::UnknownElement` for a
    ///   malformed element list or palette root
    pub fn new(config: PaletteConfig, scenario: &Scenario) -> Result<Self, SimError> {
        let mut runner = Self {
            palette: Palette::new(config),
            tree: ParentageTree::new(),
            elements: IndexMap::new(),
            element_triggers: HashMap::new(),
            auto_triggers: HashMap::new(),
            commands: HashMap::new(),
            submissions: Arc::new(Mutex::new(Vec::new())),
        };

        for element in &scenario.elements {
            if runner.elements.contains_key(&element.name) {
                return Err(SimError::DuplicateElement(element.name.clone()));
            }
            let id = match &element.parent {
                Some(parent) => {
                    let parent = runner.element(parent)?;
                    runner.tree.insert_child(parent)?
                }
                None => runner.tree.insert_root(),
            };
            runner.elements.insert(element.name.clone(), id);
        }

        if let Some(root) = &scenario.palette_root {
            let root = runner.element(root)?;
            runner.palette.set_palette_root(Some(root));
        }

        for decl in &scenario.commands {
            runner.register(decl);
        }

        Ok(runner)
    }

    /// Session being driven
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Apply `steps` and collect the report
    pub async fn run(&mut self, name: Option<String>, steps: &[Step]) -> RunReport {
        let mut reports = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let result = match self.apply(step).await {
                Ok(result) => result,
                Err(e) => StepResult::failed(e.to_string()),
            };
            if !result.ok {
                tracing::warn!(step = index + 1, label = %step.label(), "step failed");
            }
            reports.push(StepReport {
                index: index + 1,
                step: step.label(),
                ok: result.ok,
                detail: result.detail,
                context: self
                    .palette
                    .context_state()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                visible: self
                    .palette
                    .visible_commands()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            });
        }

        RunReport {
            scenario: name,
            session: self.palette.id().to_string(),
            steps: reports,
            submissions: self.submissions.lock().clone(),
            errors: self
                .palette
                .errors()
                .reported()
                .into_iter()
                .map(|e| e.message)
                .collect(),
        }
    }

    fn element(&self, name: &str) -> Result<ElementId, SimError> {
        self.elements
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownElement(name.to_string()))
    }

    fn build_command(&self, decl: &CommandDecl) -> Command {
        let key = CommandKey::new(decl.subject.clone(), decl.name.clone());
        let handler = Arc::new(EchoHandler {
            command: key.to_string(),
            fail: decl.fail.clone(),
            log: Arc::clone(&self.submissions),
        });
        Command::new(decl.subject.clone(), decl.name.clone(), handler)
            .with_description(decl.description.clone())
            .with_params(decl.params.clone())
            .enabled(decl.enabled)
    }

    fn register(&mut self, decl: &CommandDecl) -> Option<String> {
        let command = self.build_command(decl);
        let key = command.key().clone();
        if self.commands.contains_key(&key) {
            let changed = self.palette.commands().add(command);
            return Some(if changed { "replaced" } else { "duplicate ignored" }.to_string());
        }
        let guard = self.palette.register_command(command);
        self.commands.insert(key, guard);
        None
    }

    async fn apply(&mut self, step: &Step) -> Result<StepResult, SimError> {
        let result = match step {
            Step::Mount { subject, element } => {
                let element = self.element(element)?;
                let slot = (subject.clone(), element);
                if self.element_triggers.contains_key(&slot) {
                    StepResult::ok(Some("already mounted".to_string()))
                } else {
                    let guard = self
                        .palette
                        .mount_trigger(Trigger::element(subject.clone(), element));
                    self.element_triggers.insert(slot, guard);
                    StepResult::ok(None)
                }
            }
            Step::Unmount { subject, element } => {
                let element = self.element(element)?;
                match self.element_triggers.remove(&(subject.clone(), element)) {
                    Some(_guard) => StepResult::ok(None),
                    None => StepResult::failed("not mounted"),
                }
            }
            Step::Auto { subject, enabled } => {
                if let Some(guard) = self.auto_triggers.get_mut(subject) {
                    guard.set_enabled(*enabled);
                } else {
                    let guard = self.palette.auto_trigger(subject.clone(), *enabled);
                    self.auto_triggers.insert(subject.clone(), guard);
                }
                StepResult::ok(None)
            }
            Step::Click { target } => self.signal(InputSignal::pointer(self.element(target)?)),
            Step::Focus { target } => self.signal(InputSignal::focus(self.element(target)?)),
            Step::Detach { element } => {
                let element = self.element(element)?;
                let removed = self.tree.detach(element)?;
                StepResult::ok(Some(format!("{removed} element(s) detached")))
            }
            Step::Reconcile => {
                let report = self.palette.reconcile();
                if report.is_noop() {
                    StepResult::ok(None)
                } else {
                    StepResult::ok(Some(format!(
                        "promoted: {}; evicted: {}",
                        join_or_dash(&to_strings(&report.promoted)),
                        join_or_dash(&to_strings(&report.evicted))
                    )))
                }
            }
            Step::Register { command } => StepResult::ok(self.register(command)),
            Step::Unregister { subject, name } => {
                let key = CommandKey::new(subject.clone(), name.clone());
                match self.commands.remove(&key) {
                    Some(_guard) => StepResult::ok(None),
                    None => return Err(SimError::UnknownCommand(key.to_string())),
                }
            }
            Step::Search { query } => {
                let matches: Vec<String> = self
                    .palette
                    .search(query)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                StepResult::ok(Some(format!("matches: {}", join_or_dash(&matches))))
            }
            Step::Submit {
                subject,
                name,
                values,
                expect,
            } => self.submit(subject, name, values, *expect).await?,
            Step::Expect { context, visible } => self.expect(context.as_deref(), visible.as_deref()),
        };
        Ok(result)
    }

    fn signal(&self, signal: InputSignal) -> StepResult {
        let outcome = self.palette.dispatch(signal, &self.tree);
        if outcome.ignored {
            return StepResult::ok(Some("target detached, ignored".to_string()));
        }
        let mut parts = Vec::new();
        if !outcome.focused.is_empty() {
            parts.push(format!("focused: {}", to_strings(&outcome.focused).join(", ")));
        }
        if !outcome.evicted.is_empty() {
            parts.push(format!("evicted: {}", to_strings(&outcome.evicted).join(", ")));
        }
        StepResult::ok((!parts.is_empty()).then(|| parts.join("; ")))
    }

    async fn submit(
        &self,
        subject: &Subject,
        name: &str,
        values: &IndexMap<String, String>,
        expect: Expectation,
    ) -> Result<StepResult, SimError> {
        let key = CommandKey::new(subject.clone(), name);
        let command = self
            .palette
            .commands()
            .find(&key)
            .ok_or_else(|| SimError::UnknownCommand(key.to_string()))?;
        if !self.palette.is_visible(&key) {
            return Ok(StepResult::failed(format!("{key} is not visible")));
        }

        let outcome = self
            .palette
            .execute(command, values.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .await;
        let (actual, detail) = match outcome {
            SubmitOutcome::Submitted(data) => (
                Expectation::Submitted,
                format!("{} value(s) submitted", data.len()),
            ),
            SubmitOutcome::Blocked(errors) => (
                Expectation::Blocked,
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            SubmitOutcome::Failed { message, .. } => (Expectation::Failed, message),
        };

        if actual == expect {
            Ok(StepResult::ok(Some(detail)))
        } else {
            Ok(StepResult::failed(format!(
                "expected {expect:?}, got {actual:?}: {detail}"
            )))
        }
    }

    fn expect(&self, context: Option<&[Subject]>, visible: Option<&[String]>) -> StepResult {
        let mut mismatches = Vec::new();
        if let Some(expected) = context {
            let actual = self.palette.context_state();
            if actual != expected {
                mismatches.push(format!(
                    "context: expected [{}], got [{}]",
                    to_strings(expected).join(", "),
                    to_strings(&actual).join(", ")
                ));
            }
        }
        if let Some(expected) = visible {
            let actual: Vec<String> = self
                .palette
                .visible_commands()
                .iter()
                .map(ToString::to_string)
                .collect();
            if actual != expected {
                mismatches.push(format!(
                    "visible: expected [{}], got [{}]",
                    expected.join(", "),
                    actual.join(", ")
                ));
            }
        }
        if mismatches.is_empty() {
            StepResult::ok(None)
        } else {
            StepResult::failed(mismatches.join("; "))
        }
    }
}

fn to_strings(subjects: &[Subject]) -> Vec<String> {
    subjects.iter().map(ToString::to_string).collect()
}

/// Run `scenario` against a fresh session
///
/// # Errors
/// - Setup errors from [`Runner::new`]; step failures are reported, not
///   returned
pub async fn replay(config: PaletteConfig, scenario: &Scenario) -> Result<RunReport, SimError> {
    let mut runner = Runner::new(config, scenario)?;
    Ok(runner.run(scenario.name.clone(), &scenario.steps).await)
}
