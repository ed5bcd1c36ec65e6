//! Palette session
//!
//! [`Palette`] owns one set of registries for one UI session and is the
//! handle collaborators receive. It is the only place where collaborator
//! failures are caught: everything below it propagates them.

use crate::config::PaletteConfig;
use crate::error::ErrorSurface;
use parking_lot::RwLock;
use std::sync::Arc;
use tally_commands::{
    Command, CommandGuard, CommandKey, CommandRegistry, CommandResolver, ExecuteError, Executor,
    Invocation, ParameterForm, SubmitOutcome,
};
use tally_context::{
    ContextReconciler, ContextStore, ElementId, ElementTree, FocusCallback, InputEventRouter,
    InputSignal, ReconcileReport, RouteOutcome, Subject, Trigger, TriggerGuard, TriggerRegistry,
};
use uuid::Uuid;

/// One command palette session
pub struct Palette {
    id: Uuid,
    config: PaletteConfig,
    triggers: Arc<TriggerRegistry>,
    context: Arc<ContextStore>,
    commands: Arc<CommandRegistry>,
    router: RwLock<InputEventRouter>,
    reconciler: ContextReconciler,
    resolver: CommandResolver,
    executor: Executor,
    errors: ErrorSurface,
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette")
            .field("id", &self.id)
            .field("triggers", &self.triggers.len())
            .field("context", &self.context.len())
            .field("commands", &self.commands.len())
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

impl Palette {
    /// Start a session with fresh registries
    #[must_use]
    pub fn new(config: PaletteConfig) -> Self {
        let id = Uuid::new_v4();
        let triggers = Arc::new(TriggerRegistry::new());
        let context = Arc::new(ContextStore::new());
        let commands = Arc::new(CommandRegistry::with_policy(config.duplicate_commands));

        tracing::info!(
            session = %id,
            duplicate_commands = ?config.duplicate_commands,
            "palette session started"
        );

        Self {
            id,
            router: RwLock::new(InputEventRouter::new(
                Arc::clone(&triggers),
                Arc::clone(&context),
            )),
            reconciler: ContextReconciler::new(Arc::clone(&triggers), Arc::clone(&context)),
            resolver: CommandResolver::new(Arc::clone(&context), Arc::clone(&commands)),
            executor: Executor::new(),
            errors: ErrorSurface::new(),
            config,
            triggers,
            context,
            commands,
        }
    }

    /// With a custom executor (pinned reference time)
    #[must_use]
    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    /// Session identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    /// Shared trigger registry
    #[inline]
    #[must_use]
    pub fn triggers(&self) -> &Arc<TriggerRegistry> {
        &self.triggers
    }

    /// Shared context store
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Arc<ContextStore> {
        &self.context
    }

    /// Shared command registry
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    /// Error boundary
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &ErrorSurface {
        &self.errors
    }

    // Registration

    /// Mount a trigger until the guard is dropped
    pub fn mount_trigger(&self, trigger: Trigger) -> TriggerGuard {
        self.triggers.mount(trigger)
    }

    /// Mount an automatic trigger for `subject`, toggled by `enabled`
    pub fn auto_trigger(&self, subject: Subject, enabled: bool) -> TriggerGuard {
        self.triggers.mount_with(Trigger::automatic(subject), enabled)
    }

    /// Register a command until the guard is dropped
    pub fn register_command(&self, command: Command) -> CommandGuard {
        self.commands.register(command)
    }

    // Input

    /// Set or clear the palette's own root element
    pub fn set_palette_root(&self, root: Option<ElementId>) {
        self.router.write().set_palette_root(root);
    }

    /// Callback fired when a pointer activation brings a subject into context
    pub fn on_context_focus(&self, callback: FocusCallback) {
        self.router.write().set_focus_callback(Some(callback));
    }

    /// Route one input signal
    ///
    /// Runs a reconciliation pass afterwards when
    /// `reconcile_after_signal` is set.
    pub fn dispatch(&self, signal: InputSignal, tree: &dyn ElementTree) -> RouteOutcome {
        let router = self.router.read().clone();
        let outcome = router.route(signal, tree);
        if self.config.reconcile_after_signal && !outcome.ignored {
            self.reconciler.run();
        }
        outcome
    }

    /// Run one reconciliation pass
    pub fn reconcile(&self) -> ReconcileReport {
        self.reconciler.run()
    }

    // Queries

    /// Whether `subject` is in context
    #[must_use]
    pub fn is_in_context(&self, subject: &Subject) -> bool {
        self.context.has_subject(subject)
    }

    /// Most recently added subject of type `kind`
    #[must_use]
    pub fn find_subject_with_type(&self, kind: &str) -> Option<Subject> {
        self.context.find_subject_with_type(kind)
    }

    /// Snapshot of the context
    #[must_use]
    pub fn context_state(&self) -> Vec<Subject> {
        self.context.state()
    }

    /// Commands the palette lists right now
    #[must_use]
    pub fn visible_commands(&self) -> Vec<Command> {
        self.resolver.visible()
    }

    /// Visible commands matching `query`
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Command> {
        self.resolver.search(query)
    }

    /// Whether the command with `key` is listed
    #[must_use]
    pub fn is_visible(&self, key: &CommandKey) -> bool {
        self.resolver.is_visible(key)
    }

    // Execution

    /// Begin invoking `command` without the error boundary
    pub fn invoke(&self, command: Command) -> Invocation {
        self.executor.invoke(command)
    }

    /// Resolve parameters for `command`
    ///
    /// Returns `None` if resolution was cancelled or failed; failures are
    /// recorded on the error surface.
    pub async fn prepare(&self, invocation: Invocation) -> Option<ParameterForm> {
        match invocation.resolve().await {
            Ok(form) => Some(form),
            Err(ExecuteError::Cancelled { command }) => {
                tracing::debug!(session = %self.id, command = %command, "invocation cancelled");
                None
            }
            Err(e) => {
                self.errors.report(&e);
                None
            }
        }
    }

    /// Submit a form behind the error boundary
    ///
    /// Handler failures are recorded on the error surface and returned as
    /// [`SubmitOutcome::Failed`]; registries are left untouched. Submitting
    /// a spent form also yields `Failed` but is not recorded.
    pub async fn submit(&self, form: &mut ParameterForm) -> SubmitOutcome {
        match form.submit().await {
            Ok(outcome) => outcome,
            Err(e) if e.is_collaborator_failure() => {
                let reported = self.errors.report(&e);
                SubmitOutcome::Failed {
                    command: reported.command,
                    message: reported.message,
                }
            }
            Err(e) => {
                tracing::debug!(session = %self.id, error = %e, "submission rejected");
                SubmitOutcome::Failed {
                    command: e.command().to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Resolve, fill in raw inputs and submit in one go
    ///
    /// Input that does not parse blocks the submission like a missing
    /// required value.
    pub async fn execute<'a, I>(&self, command: Command, inputs: I) -> SubmitOutcome
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let label = command.to_string();
        let Some(mut form) = self.prepare(self.invoke(command)).await else {
            return SubmitOutcome::Failed {
                message: self
                    .errors
                    .latest()
                    .filter(|r| r.command == label)
                    .map_or_else(|| "cancelled".to_string(), |r| r.message),
                command: label,
            };
        };

        let errors: Vec<_> = inputs
            .into_iter()
            .filter_map(|(name, raw)| form.set(name, raw).err())
            .collect();
        if !errors.is_empty() {
            return SubmitOutcome::Blocked(errors);
        }

        self.submit(&mut form).await
    }

    /// End the session, dropping every registration
    pub fn close(self) {
        self.triggers.clear();
        self.context.clear();
        self.commands.clear();
        tracing::info!(session = %self.id, errors = self.errors.len(), "palette session closed");
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(PaletteConfig::default())
    }
}
