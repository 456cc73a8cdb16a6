//! CommandRunner - Tracks one remote command from submission to terminal outcome
//!
//! Phases: idle -> running -> polling -> completed | error
//! - A non-terminal snapshot schedules the next poll after the poll interval
//! - A terminal snapshot triggers exactly one extra fetch for the final state
//! - A process that vanished (not found) counts as completed, not as an error
//! - Disposal cancels the pending poll; no state change happens afterwards

pub mod constants;
mod state;

pub use state::{CommandExecution, CommandPhase};

use crate::application::cancel::{cancel_pair, CancelHandle, CancelToken};
use crate::domain::{CommandDescriptor, Process, ProcessId};
use crate::error::AppError;
use crate::port::ProcessService;
use constants::DEFAULT_POLL_INTERVAL;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    /// Process still running, poll again later
    Pending,
    /// Terminal phase reached, stop polling
    Finished,
}

/// Process followed by the current session
#[derive(Debug, Clone)]
struct Tracked {
    target: String,
    process_id: ProcessId,
}

/// One polling session, replaced on every new command
struct Session {
    cancel: CancelHandle,
    token: CancelToken,
    tracked: Option<Tracked>,
    task: Option<JoinHandle<()>>,
}

/// State shared with the background poll task
struct Shared {
    processes: Arc<dyn ProcessService>,
    state: watch::Sender<CommandExecution>,
    poll_interval: Duration,
}

impl Shared {
    /// Apply `change` unless the session was cancelled
    fn commit(&self, token: &CancelToken, change: impl FnOnce(&mut CommandExecution)) -> bool {
        self.state.send_if_modified(|exec| {
            if token.is_cancelled() {
                return false;
            }
            change(exec);
            true
        })
    }

    /// Cancel under the state lock so that no commit can slip in afterwards
    fn cancel(&self, session: &Session) {
        self.state.send_if_modified(|_| {
            session.cancel.cancel();
            false
        });
        if let Some(task) = &session.task {
            task.abort();
        }
    }

    async fn poll_once(&self, tracked: &Tracked, token: &CancelToken) -> PollOutcome {
        let fetched = self
            .processes
            .get_process(&tracked.target, &tracked.process_id)
            .await;

        match fetched {
            Ok(process) if !process.is_terminal() => {
                debug!(
                    process_id = %tracked.process_id,
                    status = ?process.status,
                    "Process not terminal yet"
                );
                self.commit(token, |exec| {
                    exec.phase = CommandPhase::Polling;
                    exec.last_snapshot = Some(process);
                });
                PollOutcome::Pending
            }
            Ok(process) => {
                let final_snapshot = self.final_snapshot(tracked, process).await;
                info!(
                    process_id = %tracked.process_id,
                    status = ?final_snapshot.as_ref().and_then(|p| p.status.as_deref()),
                    "Command completed"
                );
                self.commit(token, |exec| {
                    exec.phase = CommandPhase::Completed;
                    exec.last_snapshot = final_snapshot;
                });
                PollOutcome::Finished
            }
            Err(AppError::NotFound(_)) => {
                debug!(
                    process_id = %tracked.process_id,
                    "Process not found, treating as completed"
                );
                self.commit(token, |exec| {
                    exec.phase = CommandPhase::Completed;
                    exec.last_snapshot = None;
                });
                PollOutcome::Finished
            }
            Err(e) => {
                warn!(process_id = %tracked.process_id, error = %e, "Polling failed");
                self.commit(token, |exec| {
                    exec.phase = CommandPhase::Error;
                    exec.last_error = Some(e.to_string());
                });
                PollOutcome::Finished
            }
        }
    }

    /// Extra fetch after a terminal status (not retried)
    async fn final_snapshot(&self, tracked: &Tracked, terminal: Process) -> Option<Process> {
        match self
            .processes
            .get_process(&tracked.target, &tracked.process_id)
            .await
        {
            Ok(latest) => Some(latest),
            Err(AppError::NotFound(_)) => {
                debug!(
                    process_id = %tracked.process_id,
                    "Final fetch returned not found, clearing snapshot"
                );
                None
            }
            Err(e) => {
                debug!(
                    process_id = %tracked.process_id,
                    error = %e,
                    "Final fetch failed, keeping last snapshot"
                );
                Some(terminal)
            }
        }
    }

    /// Background loop: wait, poll, repeat until a terminal phase or cancellation
    async fn poll_loop(self: Arc<Self>, tracked: Tracked, mut token: CancelToken) {
        loop {
            tokio::select! {
                _ = sleep(self.poll_interval) => {},
                _ = token.cancelled() => {
                    debug!(process_id = %tracked.process_id, "Polling cancelled");
                    return;
                }
            }
            if self.poll_once(&tracked, &token).await == PollOutcome::Finished {
                return;
            }
        }
    }
}

/// Runs commands against one target application and follows the resulting process
pub struct CommandRunner {
    target: String,
    shared: Arc<Shared>,
    session: Mutex<Option<Session>>,
    disposed: AtomicBool,
}

impl CommandRunner {
    /// Create an idle runner with the default poll interval (2s)
    pub fn new(target: impl Into<String>, processes: Arc<dyn ProcessService>) -> Self {
        Self::with_poll_interval(target, processes, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(
        target: impl Into<String>,
        processes: Arc<dyn ProcessService>,
        poll_interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(CommandExecution::default());
        Self {
            target: target.into(),
            shared: Arc::new(Shared {
                processes,
                state,
                poll_interval,
            }),
            session: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// Create a runner and adopt the target's active process, if any
    pub async fn attach(
        target: impl Into<String>,
        processes: Arc<dyn ProcessService>,
        poll_interval: Duration,
    ) -> Self {
        let runner = Self::with_poll_interval(target, processes, poll_interval);
        runner.initialize().await;
        runner
    }

    /// Current state
    pub fn snapshot(&self) -> CommandExecution {
        self.shared.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<CommandExecution> {
        self.shared.state.subscribe()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// A command may be offered when nothing is in flight and the app status allows it
    pub fn can_run(&self, descriptor: &CommandDescriptor, app_status: Option<&str>) -> bool {
        !self.is_disposed()
            && !self.shared.state.borrow().phase.is_busy()
            && descriptor.is_applicable_to(app_status)
    }

    /// Adopt the first active process of the target without submitting anything
    ///
    /// Listing failures are only logged. When nothing is adopted the current session
    /// (if any) keeps running untouched. A non-terminal process is first fetched one
    /// poll interval after adoption, not right away.
    pub async fn initialize(&self) {
        if self.is_disposed() {
            return;
        }

        let processes = match self
            .shared
            .processes
            .list_processes(&self.target, true)
            .await
        {
            Ok(processes) => processes,
            Err(e) => {
                debug!(target = %self.target, error = %e, "Initial load of active processes failed");
                return;
            }
        };

        let mut active = processes.into_iter();
        let Some(process) = active.next() else {
            debug!(target = %self.target, "No active process");
            return;
        };
        let ignored = active.count();
        if ignored > 0 {
            warn!(
                target = %self.target,
                process_id = %process.id,
                ignored,
                "Several active processes, following the first one"
            );
        }

        let Some(token) = self.begin_session() else {
            return;
        };
        let tracked = Tracked {
            target: self.target.clone(),
            process_id: process.id.clone(),
        };
        self.track(&token, tracked.clone());

        let terminal = process.is_terminal();
        info!(
            target = %self.target,
            process_id = %process.id,
            status = ?process.status,
            "Adopted active process"
        );
        self.shared.commit(&token, |exec| {
            exec.phase = if terminal {
                CommandPhase::Completed
            } else {
                CommandPhase::Polling
            };
            exec.tracked_process_id = Some(process.id.clone());
            exec.last_snapshot = Some(process);
            exec.last_error = None;
        });

        if !terminal {
            self.follow(tracked, token, false).await;
        }
    }

    /// Submit `command` on `target` and follow the created process
    ///
    /// Replaces whatever was tracked before. Failures end in the `error` phase and are
    /// never returned to the caller.
    pub async fn run_command(&self, target: &str, command: &str) {
        let Some(token) = self.begin_session() else {
            warn!(target = %target, command = %command, "Runner disposed, command ignored");
            return;
        };

        self.shared.commit(&token, |exec| {
            *exec = CommandExecution {
                phase: CommandPhase::Running,
                ..CommandExecution::default()
            };
        });

        info!(target = %target, command = %command, "Submitting command");
        let process_id = match self.shared.processes.start_command(target, command).await {
            Ok(process_id) => process_id,
            Err(e) => {
                warn!(target = %target, command = %command, error = %e, "Command submission failed");
                self.shared.commit(&token, |exec| {
                    exec.phase = CommandPhase::Error;
                    exec.last_error = Some(e.to_string());
                });
                return;
            }
        };

        let tracked = Tracked {
            target: target.to_string(),
            process_id: process_id.clone(),
        };
        self.track(&token, tracked.clone());
        self.shared.commit(&token, |exec| {
            exec.phase = CommandPhase::Polling;
            exec.tracked_process_id = Some(process_id);
        });

        self.follow(tracked, token, true).await;
    }

    /// Re-fetch the tracked process. Only the snapshot (or error) changes, never the phase.
    pub async fn refresh(&self) {
        let current = {
            let sessions = self.sessions();
            sessions
                .as_ref()
                .and_then(|s| s.tracked.clone().map(|tracked| (tracked, s.token.clone())))
        };
        let Some((tracked, token)) = current else {
            debug!(target = %self.target, "Nothing tracked, refresh skipped");
            return;
        };

        match self
            .shared
            .processes
            .get_process(&tracked.target, &tracked.process_id)
            .await
        {
            Ok(process) => {
                self.shared
                    .commit(&token, |exec| exec.last_snapshot = Some(process));
            }
            Err(AppError::NotFound(_)) => {
                self.shared.commit(&token, |exec| exec.last_snapshot = None);
            }
            Err(e) => {
                warn!(process_id = %tracked.process_id, error = %e, "Refresh failed");
                self.shared
                    .commit(&token, |exec| exec.last_error = Some(e.to_string()));
            }
        }
    }

    /// Cancel the pending poll and freeze the state. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(session) = self.sessions().take() {
            self.shared.cancel(&session);
        }
        debug!(target = %self.target, "Command runner disposed");
    }

    fn sessions(&self) -> MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cancel the previous session and open a new one (None once disposed)
    fn begin_session(&self) -> Option<CancelToken> {
        let mut sessions = self.sessions();
        if self.is_disposed() {
            return None;
        }
        if let Some(previous) = sessions.take() {
            self.shared.cancel(&previous);
        }
        let (cancel, token) = cancel_pair();
        *sessions = Some(Session {
            cancel,
            token: token.clone(),
            tracked: None,
            task: None,
        });
        Some(token)
    }

    fn track(&self, token: &CancelToken, tracked: Tracked) {
        let mut sessions = self.sessions();
        if token.is_cancelled() {
            return;
        }
        if let Some(session) = sessions.as_mut() {
            session.tracked = Some(tracked);
        }
    }

    /// Poll now (optionally), then hand the loop over to a background task
    async fn follow(&self, tracked: Tracked, token: CancelToken, poll_now: bool) {
        if poll_now && self.shared.poll_once(&tracked, &token).await == PollOutcome::Finished {
            return;
        }

        let mut sessions = self.sessions();
        if token.is_cancelled() {
            return;
        }
        if let Some(session) = sessions.as_mut() {
            debug!(
                process_id = %tracked.process_id,
                interval_ms = self.shared.poll_interval.as_millis() as u64,
                "Scheduling next poll"
            );
            let shared = Arc::clone(&self.shared);
            session.task = Some(tokio::spawn(shared.poll_loop(tracked, token)));
        }
    }
}

impl Drop for CommandRunner {
    fn drop(&mut self) {
        self.dispose();
    }
}
