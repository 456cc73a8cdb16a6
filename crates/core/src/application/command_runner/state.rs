// Command execution state (what the UI renders)

use crate::domain::{Process, ProcessId};
use serde::Serialize;

/// Phase of the tracked command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandPhase {
    #[default]
    Idle,
    /// Submission in flight
    Running,
    /// Waiting for the process to reach a terminal status
    Polling,
    Completed,
    Error,
}

impl CommandPhase {
    /// A command is in flight: new commands should not be offered
    pub fn is_busy(self) -> bool {
        matches!(self, CommandPhase::Running | CommandPhase::Polling)
    }

    pub fn is_finished(self) -> bool {
        matches!(self, CommandPhase::Completed | CommandPhase::Error)
    }
}

impl std::fmt::Display for CommandPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandPhase::Idle => write!(f, "idle"),
            CommandPhase::Running => write!(f, "running"),
            CommandPhase::Polling => write!(f, "polling"),
            CommandPhase::Completed => write!(f, "completed"),
            CommandPhase::Error => write!(f, "error"),
        }
    }
}

/// Snapshot of the runner state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandExecution {
    pub phase: CommandPhase,
    pub tracked_process_id: Option<ProcessId>,
    pub last_snapshot: Option<Process>,
    pub last_error: Option<String>,
}

impl CommandExecution {
    /// Status of the last observed snapshot, if any
    pub fn status(&self) -> Option<&str> {
        self.last_snapshot
            .as_ref()
            .and_then(|process| process.status.as_deref())
    }
}
