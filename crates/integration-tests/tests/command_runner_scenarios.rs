//! Command runner scenarios
//!
//! Runner wired the way the CLI wires it: scripted manager behind the notifying
//! decorator, notifications drained from the bounded channel.

use mbyte_core::application::{CommandExecution, CommandPhase, CommandRunner, NotifyingProcessService};
use mbyte_core::domain::{CommandDescriptor, Process, STORE_APP_TYPE};
use mbyte_core::port::process_service::mocks::{ProcessCall, ScriptedProcessService};
use mbyte_core::port::{notification_channel, Notification, ProcessService};
use mbyte_core::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const POLL: Duration = Duration::from_millis(10);

type Manager = NotifyingProcessService<ScriptedProcessService>;

fn manager() -> (Arc<Manager>, mpsc::Receiver<Notification>) {
    let (notifier, notifications) = notification_channel(16);
    let manager = Arc::new(NotifyingProcessService::new(
        ScriptedProcessService::new(),
        Arc::new(notifier),
    ));
    (manager, notifications)
}

fn drain(notifications: &mut mpsc::Receiver<Notification>) -> Vec<String> {
    let mut messages = Vec::new();
    while let Ok(notification) = notifications.try_recv() {
        messages.push(notification.message);
    }
    messages
}

async fn settle(runner: &CommandRunner) -> CommandExecution {
    let mut updates = runner.subscribe();
    let exec = tokio::time::timeout(
        Duration::from_secs(2),
        updates.wait_for(|exec| exec.phase.is_finished()),
    )
    .await
    .expect("runner should settle")
    .expect("runner alive")
    .clone();
    exec
}

/// runCommand("app1", "start") -> p-42, first poll COMPLETED
#[tokio::test]
async fn test_start_command_completes() {
    let (manager, mut notifications) = manager();
    manager.inner().push_start(Ok("p-42".to_string()));
    manager.inner().push_status("p-42", "COMPLETED");

    let runner = CommandRunner::with_poll_interval("app1", manager.clone(), POLL);
    runner.run_command("app1", "start").await;

    let exec = settle(&runner).await;
    assert_eq!(exec.phase, CommandPhase::Completed);
    assert_eq!(exec.tracked_process_id.as_deref(), Some("p-42"));
    assert_eq!(exec.status(), Some("COMPLETED"));
    assert!(drain(&mut notifications).is_empty());
}

/// STARTING -> RUNNING -> COMPLETED, then nothing more
#[tokio::test]
async fn test_poll_sequence_stops_after_terminal() {
    let (manager, _notifications) = manager();
    manager.inner().push_start(Ok("p-1".to_string()));
    manager
        .inner()
        .push_status("p-1", "STARTING")
        .push_status("p-1", "RUNNING")
        .push_status("p-1", "COMPLETED");

    let runner = CommandRunner::with_poll_interval("app1", manager.clone(), POLL);
    runner.run_command("app1", "start").await;
    let exec = settle(&runner).await;

    assert_eq!(exec.phase, CommandPhase::Completed);
    let polls = manager.inner().get_count("p-1");
    tokio::time::sleep(POLL * 10).await;
    assert_eq!(manager.inner().get_count("p-1"), polls);
}

/// The process vanishes while polling: completed, no snapshot, nothing published
#[tokio::test]
async fn test_vanished_process_is_not_an_error() {
    let (manager, mut notifications) = manager();
    manager.inner().push_start(Ok("p-1".to_string()));
    manager
        .inner()
        .push_status("p-1", "RUNNING")
        .push_snapshot("p-1", Err(AppError::not_found("process p-1")));

    let runner = CommandRunner::with_poll_interval("app1", manager.clone(), POLL);
    runner.run_command("app1", "start").await;
    let exec = settle(&runner).await;

    assert_eq!(exec.phase, CommandPhase::Completed);
    assert!(exec.last_snapshot.is_none());
    assert!(exec.last_error.is_none());
    assert!(drain(&mut notifications).is_empty());
}

/// Extra fetch after the terminal status fails: snapshot kept, failure published once
#[tokio::test]
async fn test_final_fetch_failure_is_published_and_absorbed() {
    let (manager, mut notifications) = manager();
    manager.inner().push_start(Ok("p-1".to_string()));
    manager
        .inner()
        .push_status("p-1", "FAILED")
        .push_snapshot("p-1", Err(AppError::remote("HTTP 502: bad gateway")));

    let runner = CommandRunner::with_poll_interval("app1", manager.clone(), POLL);
    runner.run_command("app1", "start").await;
    let exec = settle(&runner).await;

    assert_eq!(exec.phase, CommandPhase::Completed);
    assert_eq!(exec.status(), Some("FAILED"));
    assert_eq!(drain(&mut notifications), vec!["HTTP 502: bad gateway".to_string()]);
}

/// Submission failure: error phase, message stored and published
#[tokio::test]
async fn test_submission_failure() {
    let (manager, mut notifications) = manager();
    manager
        .inner()
        .push_start(Err(AppError::remote("HTTP 409: command not applicable")));

    let runner = CommandRunner::with_poll_interval("app1", manager.clone(), POLL);
    runner.run_command("app1", "stop").await;

    let exec = runner.snapshot();
    assert_eq!(exec.phase, CommandPhase::Error);
    assert_eq!(exec.last_error.as_deref(), Some("HTTP 409: command not applicable"));
    assert!(exec.tracked_process_id.is_none());
    assert_eq!(
        drain(&mut notifications),
        vec!["HTTP 409: command not applicable".to_string()]
    );
}

/// A second command while the first is polling: only the new id is polled afterwards
#[tokio::test]
async fn test_second_command_takes_over() {
    let (manager, _notifications) = manager();
    manager
        .inner()
        .push_start(Ok("p-1".to_string()))
        .push_start(Ok("p-2".to_string()));
    manager.inner().push_status("p-1", "RUNNING");
    manager
        .inner()
        .push_status("p-2", "RUNNING")
        .push_status("p-2", "RUNNING")
        .push_status("p-2", "COMPLETED");

    let runner = CommandRunner::with_poll_interval("app1", manager.clone(), POLL);
    runner.run_command("app1", "start").await;
    assert_eq!(runner.snapshot().phase, CommandPhase::Polling);

    let mut updates = runner.subscribe();
    runner.run_command("app1", "stop").await;
    let p1_polls = manager.inner().get_count("p-1");

    let exec = settle(&runner).await;
    assert!(updates.has_changed().unwrap());
    assert_eq!(exec.tracked_process_id.as_deref(), Some("p-2"));
    assert_eq!(exec.phase, CommandPhase::Completed);
    assert_eq!(manager.inner().get_count("p-1"), p1_polls);

    let starts: Vec<ProcessCall> = manager
        .inner()
        .calls()
        .into_iter()
        .filter(|call| matches!(call, ProcessCall::Start { .. }))
        .collect();
    assert_eq!(starts.len(), 2);
}

/// No active process: idle. One STARTING process: polling with that snapshot.
#[tokio::test]
async fn test_attach_scenarios() {
    let (manager, _notifications) = manager();
    manager.inner().set_listing(Ok(vec![]));
    let runner = CommandRunner::attach("app1", manager.clone(), POLL).await;
    assert_eq!(runner.snapshot().phase, CommandPhase::Idle);

    let starting = Process::with_status("p-9", "STARTING");
    manager.inner().set_listing(Ok(vec![starting.clone()]));
    manager.inner().push_status("p-9", "COMPLETED");
    let runner = CommandRunner::attach("app1", manager.clone(), Duration::from_millis(50)).await;

    let exec = runner.snapshot();
    assert_eq!(exec.phase, CommandPhase::Polling);
    assert_eq!(exec.last_snapshot, Some(starting));

    let exec = settle(&runner).await;
    assert_eq!(exec.status(), Some("COMPLETED"));
}

/// Disposal in the middle of polling: no more fetches, state frozen
#[tokio::test]
async fn test_dispose_while_polling() {
    let (manager, _notifications) = manager();
    manager.inner().push_start(Ok("p-1".to_string()));
    manager.inner().push_status("p-1", "RUNNING");

    let runner = CommandRunner::with_poll_interval("app1", manager.clone(), POLL);
    runner.run_command("app1", "start").await;
    tokio::time::sleep(POLL * 3).await;

    runner.dispose();
    let frozen = runner.snapshot();
    let polls = manager.inner().get_count("p-1");
    tokio::time::sleep(POLL * 10).await;

    assert_eq!(manager.inner().get_count("p-1"), polls);
    assert_eq!(runner.snapshot(), frozen);
}

fn command(name: &str, app_status: &str) -> CommandDescriptor {
    CommandDescriptor {
        app_type: STORE_APP_TYPE.to_string(),
        app_status: Some([app_status.to_string()].into_iter().collect()),
        name: name.to_string(),
        version: None,
        description: None,
    }
}

/// Command buttons: applicable commands are offered only while nothing is in flight
#[tokio::test]
async fn test_commands_offered_only_while_idle() {
    let (manager, _notifications) = manager();
    manager
        .inner()
        .set_commands(vec![command("start", "CREATED"), command("stop", "AVAILABLE")]);
    manager.inner().push_start(Ok("p-1".to_string()));
    manager
        .inner()
        .push_status("p-1", "RUNNING")
        .push_status("p-1", "COMPLETED");

    let runner = CommandRunner::with_poll_interval("app1", manager.clone(), POLL);
    let commands = manager.list_commands("app1").await.unwrap();
    let offered = |runner: &CommandRunner| -> Vec<String> {
        commands
            .iter()
            .filter(|command| runner.can_run(command, Some("CREATED")))
            .map(|command| command.name.clone())
            .collect()
    };

    assert_eq!(offered(&runner), vec!["start".to_string()]);
    runner.run_command("app1", "start").await;
    assert!(offered(&runner).is_empty());

    settle(&runner).await;
    assert_eq!(offered(&runner), vec!["start".to_string()]);
}
