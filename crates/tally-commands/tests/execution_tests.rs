//! Invocation Tests
//!
//! Two-phase execution: parameter resolution then submit.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tally_commands::{
    params_fn, submit_fn, Command, ExecuteError, Executor, ParamData, ParamOptions, ParamSpec,
    SubmitHandler, SubmitOutcome, ValidationError,
};
use tally_context::Subject;

fn recording() -> (Arc<dyn SubmitHandler>, Arc<Mutex<Vec<ParamData>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let handler = submit_fn(move |data| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().push(data);
            Ok::<_, anyhow::Error>(())
        }
    });
    (handler, calls)
}

fn describe_command(handler: Arc<dyn SubmitHandler>) -> Command {
    Command::new(Subject::with_id("Entry", "42"), "describe", handler)
        .with_description("Change the description")
        .with_params(ParamSpec::new().with("description", ParamOptions::string().required()))
}

#[tokio::test]
async fn test_required_param_blocks_then_submits_once() {
    let (handler, calls) = recording();
    let mut form = Executor::new()
        .invoke(describe_command(handler))
        .resolve()
        .await
        .unwrap();

    let outcome = form.submit().await.unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Blocked(vec![ValidationError::MissingRequired {
            param: "description".to_string()
        }])
    );
    assert!(calls.lock().is_empty());

    form.set("description", "fix typo").unwrap();
    let outcome = form.submit().await.unwrap();
    assert!(outcome.is_submitted());

    let calls = calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].string("description"), Some("fix typo"));
    assert_eq!(calls[0].len(), 1);
}

#[tokio::test]
async fn test_second_submit_is_rejected() {
    let (handler, calls) = recording();
    let mut form = Executor::new()
        .invoke(describe_command(handler))
        .resolve()
        .await
        .unwrap();
    form.set("description", "once").unwrap();

    form.submit().await.unwrap();
    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, ExecuteError::AlreadySubmitted { .. }));
    assert_eq!(calls.lock().len(), 1);
}

#[tokio::test]
async fn test_handler_failure_propagates() {
    let handler = submit_fn(|_| async { Err::<(), _>(anyhow::anyhow!("entry is locked")) });
    let mut form = Executor::new()
        .invoke(Command::new(Subject::with_id("Entry", "9"), "delete", handler))
        .resolve()
        .await
        .unwrap();

    let err = form.submit().await.unwrap_err();
    assert!(err.is_collaborator_failure());
    assert_eq!(err.command(), "Entry.delete(9)");
    assert!(err.to_string().contains("entry is locked"));
    assert!(form.is_submitted());
}

#[tokio::test]
async fn test_deferred_params_are_awaited() {
    let (handler, _) = recording();
    let command = Command::new(Subject::new("Log"), "start", handler).with_params_producer(
        params_fn(|| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, anyhow::Error>(
                ParamSpec::new()
                    .with("description", ParamOptions::string_with_default("focus"))
                    .with("start", ParamOptions::time()),
            )
        }),
    );

    let form = Executor::new().invoke(command).resolve().await.unwrap();
    let names: Vec<&str> = form.fields().map(|f| f.name).collect();
    assert_eq!(names, vec!["description", "start"]);
    assert_eq!(form.value("description").unwrap().to_string(), "focus");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_slow_resolution() {
    let (handler, calls) = recording();
    let command = Command::new(Subject::new("Log"), "start", handler).with_params_producer(
        params_fn(|| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, anyhow::Error>(ParamSpec::new())
        }),
    );

    let invocation = Executor::new().invoke(command);
    let canceller = invocation.canceller();
    let pending = tokio::spawn(invocation.resolve());

    tokio::time::sleep(Duration::from_millis(10)).await;
    canceller.cancel();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, ExecuteError::Cancelled { .. }));
    assert!(calls.lock().is_empty());
}

#[tokio::test]
async fn test_producer_failure_surfaces_as_params_error() {
    let (handler, _) = recording();
    let command = Command::new(Subject::with_id("Entry", "3"), "move", handler)
        .with_params_producer(params_fn(|| async {
            Err::<ParamSpec, _>(anyhow::anyhow!("lookup failed"))
        }));

    let err = Executor::new().invoke(command).resolve().await.unwrap_err();
    assert!(matches!(err, ExecuteError::Params { .. }));
    assert!(err.is_collaborator_failure());
}

#[tokio::test]
async fn test_unrelated_invocations_are_independent() {
    let (handler, calls) = recording();
    let executor = Executor::new();

    let slow = Command::new(Subject::new("Log"), "start", Arc::clone(&handler))
        .with_params_producer(params_fn(|| async {
            tokio::task::yield_now().await;
            Ok::<_, anyhow::Error>(ParamSpec::new())
        }));
    let slow_invocation = executor.invoke(slow);
    slow_invocation.canceller().cancel();

    let mut form = executor
        .invoke(describe_command(handler))
        .resolve()
        .await
        .unwrap();
    form.set("description", "still works").unwrap();
    assert!(form.submit().await.unwrap().is_submitted());
    assert!(slow_invocation.resolve().await.is_err());
    assert_eq!(calls.lock().len(), 1);
}
