//! Palette Session Tests
//!
//! End-to-end flows through the session facade.

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tally_commands::CommandKey;
use tally_palette::prelude::*;
use tally_test_utils::{
    delete_entry, describe_entry, entry, log, screen, start_log, FailingHandler, RecordingHandler,
};

fn palette() -> Palette {
    Palette::new(PaletteConfig::default())
}

fn visible(palette: &Palette) -> Vec<String> {
    palette
        .visible_commands()
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn test_click_brings_entry_commands_into_view() {
    let palette = palette();
    let tree = screen();
    let handler = RecordingHandler::new();

    let _row = palette.mount_trigger(Trigger::element(entry("42"), tree.id("row-42")));
    let _delete = palette.register_command(delete_entry("42", handler));
    assert!(visible(&palette).is_empty());

    palette.dispatch(InputSignal::pointer(tree.id("row-42-label")), &tree);

    assert_eq!(palette.context_state(), vec![entry("42")]);
    assert_eq!(visible(&palette), vec!["Entry.delete(42)"]);
    assert!(palette.is_visible(&CommandKey::new(entry("42"), "delete")));
}

#[test]
fn test_click_outside_evicts_entry() {
    let palette = palette();
    let mut tree = screen();
    palette.set_palette_root(Some(tree.id("palette")));

    let _row = palette.mount_trigger(Trigger::element(entry("42"), tree.id("row-42")));
    let _delete = palette.register_command(delete_entry("42", RecordingHandler::new()));

    palette.dispatch(InputSignal::pointer(tree.id("row-42")), &tree);
    assert!(palette.is_in_context(&entry("42")));

    palette.dispatch(InputSignal::pointer(tree.id("palette-input")), &tree);
    assert!(palette.is_in_context(&entry("42")));

    palette.dispatch(InputSignal::pointer(tree.id("sidebar")), &tree);
    assert!(!palette.is_in_context(&entry("42")));
    assert!(visible(&palette).is_empty());

    tree.detach("sidebar").unwrap();
    let outcome = palette.dispatch(InputSignal::pointer(tree.id("sidebar")), &tree);
    assert!(outcome.ignored);
}

#[test]
fn test_pointer_requests_focus_but_focus_does_not() {
    let palette = palette();
    let tree = screen();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    palette.on_context_focus(Arc::new(move |_: &Subject| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let _row = palette.mount_trigger(Trigger::element(entry("7"), tree.id("row-7")));

    palette.dispatch(InputSignal::focus(tree.id("row-7")), &tree);
    assert!(palette.is_in_context(&entry("7")));
    assert_eq!(requests.load(Ordering::SeqCst), 0);

    palette.dispatch(InputSignal::pointer(tree.id("row-7")), &tree);
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[test]
fn test_automatic_trigger_and_unmount() {
    let palette = palette();
    let handler = RecordingHandler::new();
    let _start = palette.register_command(start_log(handler));

    let mut log_trigger = palette.auto_trigger(log(), true);
    palette.reconcile();
    assert_eq!(visible(&palette), vec!["Log.start()"]);

    log_trigger.set_enabled(false);
    palette.reconcile();
    assert!(visible(&palette).is_empty());

    log_trigger.set_enabled(true);
    palette.reconcile();
    drop(log_trigger);
    let report = palette.reconcile();
    assert_eq!(report.evicted, vec![log()]);
    assert!(!palette.is_in_context(&log()));
}

#[test]
fn test_most_recent_subject_of_type() {
    let palette = palette();
    let tree = screen();
    let _a = palette.mount_trigger(Trigger::element(entry("42"), tree.id("row-42")));
    let _b = palette.mount_trigger(Trigger::element(entry("7"), tree.id("list")));

    palette.dispatch(InputSignal::pointer(tree.id("row-42")), &tree);
    assert_eq!(palette.find_subject_with_type("Entry"), Some(entry("7")));
    assert_eq!(palette.find_subject_with_type("Log"), None);
}

#[test]
fn test_unmounting_command_hides_it() {
    let palette = palette();
    let _log = palette.auto_trigger(log(), true);
    palette.reconcile();

    let guard = palette.register_command(start_log(RecordingHandler::new()));
    assert_eq!(palette.search("start").len(), 1);
    drop(guard);
    assert!(palette.search("start").is_empty());
}

#[test]
fn test_remounting_keeps_registrations() {
    let palette = palette();
    let mut log_trigger = palette.auto_trigger(log(), true);
    let mut start = palette.register_command(start_log(RecordingHandler::new()));
    assert!(log_trigger.is_enabled());
    assert_eq!(start.key().to_string(), "Log.start()");

    log_trigger = palette.auto_trigger(log(), true);
    start = palette.register_command(start_log(RecordingHandler::new()));
    assert_eq!(palette.triggers().len(), 1);
    assert_eq!(palette.commands().len(), 1);
    palette.reconcile();
    assert_eq!(visible(&palette), vec!["Log.start()"]);

    drop(log_trigger);
    drop(start);
    assert!(palette.triggers().is_empty());
    assert!(palette.commands().is_empty());
}

#[test]
fn test_replace_policy_picks_up_new_handler() {
    let palette = Palette::new(
        PaletteConfig::default().with_duplicate_commands(DuplicatePolicy::Replace),
    );
    palette.commands().add(delete_entry("1", RecordingHandler::new()).with_description("old"));
    palette.commands().add(delete_entry("1", RecordingHandler::new()).with_description("new"));

    let state = palette.commands().state();
    assert_eq!(state.len(), 1);
    assert_eq!(state[0].description(), "new");
}

#[tokio::test]
async fn test_required_description_flow() {
    let palette = palette();
    let tree = screen();
    let handler = RecordingHandler::new();
    let _row = palette.mount_trigger(Trigger::element(entry("42"), tree.id("row-42")));
    let _describe = palette.register_command(describe_entry("42", handler.clone()));
    palette.dispatch(InputSignal::pointer(tree.id("row-42")), &tree);

    let command = palette.visible_commands().remove(0);
    let mut form = palette.prepare(palette.invoke(command)).await.unwrap();

    let outcome = palette.submit(&mut form).await;
    assert!(matches!(outcome, SubmitOutcome::Blocked(ref errors) if errors.len() == 1));
    assert_eq!(handler.call_count(), 0);

    form.set("description", "fix typo").unwrap();
    assert!(palette.submit(&mut form).await.is_submitted());

    let calls = handler.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].string("description"), Some("fix typo"));
}

#[tokio::test]
async fn test_handler_failure_is_contained() {
    let palette = palette();
    let tree = screen();
    let ok = RecordingHandler::new();

    let _row = palette.mount_trigger(Trigger::element(entry("42"), tree.id("row-42")));
    let _log = palette.auto_trigger(log(), true);
    let _delete = palette.register_command(delete_entry("42", FailingHandler::new("entry is locked")));
    let _start = palette.register_command(start_log(ok.clone()));
    palette.dispatch(InputSignal::pointer(tree.id("row-42")), &tree);

    let before_context = palette.context_state();
    let before_visible = visible(&palette);

    let delete = palette.search("delete").remove(0);
    let outcome = palette.execute(delete, std::iter::empty()).await;
    match outcome {
        SubmitOutcome::Failed { command, message } => {
            assert_eq!(command, "Entry.delete(42)");
            assert!(message.contains("entry is locked"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    assert_eq!(palette.errors().len(), 1);
    assert_eq!(palette.context_state(), before_context);
    assert_eq!(visible(&palette), before_visible);

    let start = palette.search("Log.start").remove(0);
    let outcome = palette
        .execute(start, [("description", "standup"), ("start", "09:00")])
        .await;
    assert!(outcome.is_submitted());
    assert_eq!(ok.call_count(), 1);
}

#[tokio::test]
async fn test_resubmitting_spent_form_is_not_reported() {
    let palette = palette();
    let handler = RecordingHandler::new();
    let mut form = palette
        .prepare(palette.invoke(delete_entry("42", handler.clone())))
        .await
        .unwrap();

    assert!(palette.submit(&mut form).await.is_submitted());
    match palette.submit(&mut form).await {
        SubmitOutcome::Failed { command, .. } => assert_eq!(command, "Entry.delete(42)"),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(handler.call_count(), 1);
    assert!(palette.errors().is_empty());
}

#[tokio::test]
async fn test_invalid_time_blocks_execute() {
    let palette = palette();
    let handler = RecordingHandler::new();
    let outcome = palette
        .execute(start_log(handler.clone()), [("start", "whenever")])
        .await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Blocked(ref errors)
            if matches!(errors[0], ValidationError::InvalidTime { .. })
    ));
    assert_eq!(handler.call_count(), 0);
    assert!(palette.errors().is_empty());
}

#[tokio::test]
async fn test_params_failure_is_reported() {
    let palette = palette();
    let command = Command::new(entry("3"), "move", RecordingHandler::new())
        .with_params_producer(params_fn(|| async {
            Err::<ParamSpec, _>(anyhow::anyhow!("sectors unavailable"))
        }));

    assert!(palette.prepare(palette.invoke(command)).await.is_none());
    let reported = palette.errors().latest().unwrap();
    assert_eq!(reported.command, "Entry.move(3)");
    assert!(reported.message.contains("sectors unavailable"));
}

#[tokio::test]
async fn test_cancelled_prepare_is_not_an_error() {
    let palette = palette();
    let command = Command::new(log(), "start", RecordingHandler::new()).with_params_producer(
        params_fn(|| async {
            tokio::task::yield_now().await;
            Ok::<_, anyhow::Error>(ParamSpec::new())
        }),
    );

    let invocation = palette.invoke(command);
    invocation.canceller().cancel();
    assert!(palette.prepare(invocation).await.is_none());
    assert!(palette.errors().is_empty());
}

#[test]
fn test_close_clears_registries() {
    let palette = palette();
    let triggers = Arc::clone(palette.triggers());
    let commands = Arc::clone(palette.commands());
    let _log = palette.auto_trigger(log(), true);
    let _start = palette.register_command(start_log(RecordingHandler::new()));
    palette.reconcile();

    palette.close();
    assert!(triggers.is_empty());
    assert!(commands.is_empty());
}
