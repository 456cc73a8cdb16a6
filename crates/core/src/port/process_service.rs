// Process Service Port (manager API)

use crate::domain::{CommandDescriptor, Process, ProcessId};
use crate::error::Result;
use async_trait::async_trait;

/// Remote service that runs commands against applications
///
/// Every call is a suspension point with network semantics (may fail, may be slow).
#[async_trait]
pub trait ProcessService: Send + Sync {
    /// Start `command` on `target`, returns the id of the created process
    async fn start_command(&self, target: &str, command: &str) -> Result<ProcessId>;

    /// Get a process snapshot
    ///
    /// # Errors
    /// - `AppError::NotFound` once the process no longer exists
    /// - `AppError::Remote` for any other failure
    async fn get_process(&self, target: &str, process_id: &str) -> Result<Process>;

    /// List processes of `target`, optionally only the active ones
    async fn list_processes(&self, target: &str, active_only: bool) -> Result<Vec<Process>>;

    /// List the commands available for `target`
    async fn list_commands(&self, target: &str) -> Result<Vec<CommandDescriptor>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Recorded call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProcessCall {
        Start { target: String, command: String },
        Get { target: String, process_id: String },
        List { target: String, active_only: bool },
        Commands { target: String },
    }

    /// Scripted Process Service for testing
    ///
    /// `get_process` answers from a per-id script. The last scripted answer repeats
    /// forever; an id without a script is reported as not found.
    #[derive(Default)]
    pub struct ScriptedProcessService {
        starts: Mutex<VecDeque<Result<ProcessId>>>,
        snapshots: Mutex<HashMap<ProcessId, VecDeque<Result<Process>>>>,
        listing: Mutex<Option<Result<Vec<Process>>>>,
        commands: Mutex<Vec<CommandDescriptor>>,
        calls: Mutex<Vec<ProcessCall>>,
    }

    impl ScriptedProcessService {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the answer of the next `start_command`
        pub fn push_start(&self, result: Result<ProcessId>) -> &Self {
            self.starts.lock().unwrap().push_back(result);
            self
        }

        /// Queue the next answer of `get_process` for `process_id`
        pub fn push_snapshot(&self, process_id: &str, result: Result<Process>) -> &Self {
            self.snapshots
                .lock()
                .unwrap()
                .entry(process_id.to_string())
                .or_default()
                .push_back(result);
            self
        }

        /// Queue a successful snapshot with `status`
        pub fn push_status(&self, process_id: &str, status: &str) -> &Self {
            self.push_snapshot(process_id, Ok(Process::with_status(process_id, status)))
        }

        pub fn set_listing(&self, result: Result<Vec<Process>>) -> &Self {
            *self.listing.lock().unwrap() = Some(result);
            self
        }

        pub fn set_commands(&self, commands: Vec<CommandDescriptor>) -> &Self {
            *self.commands.lock().unwrap() = commands;
            self
        }

        pub fn calls(&self) -> Vec<ProcessCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Number of `get_process` calls for one id
        pub fn get_count(&self, process_id: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| {
                    matches!(call, ProcessCall::Get { process_id: id, .. } if id == process_id)
                })
                .count()
        }

        fn record(&self, call: ProcessCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl ProcessService for ScriptedProcessService {
        async fn start_command(&self, target: &str, command: &str) -> Result<ProcessId> {
            self.record(ProcessCall::Start {
                target: target.to_string(),
                command: command.to_string(),
            });
            self.starts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::remote("HTTP 500: no scripted start")))
        }

        async fn get_process(&self, target: &str, process_id: &str) -> Result<Process> {
            self.record(ProcessCall::Get {
                target: target.to_string(),
                process_id: process_id.to_string(),
            });
            let mut snapshots = self.snapshots.lock().unwrap();
            match snapshots.get_mut(process_id) {
                Some(script) if script.len() > 1 => script.pop_front().unwrap(),
                Some(script) if !script.is_empty() => script[0].clone(),
                _ => Err(AppError::not_found(format!("process {}", process_id))),
            }
        }

        async fn list_processes(&self, target: &str, active_only: bool) -> Result<Vec<Process>> {
            self.record(ProcessCall::List {
                target: target.to_string(),
                active_only,
            });
            self.listing.lock().unwrap().clone().unwrap_or(Ok(Vec::new()))
        }

        async fn list_commands(&self, target: &str) -> Result<Vec<CommandDescriptor>> {
            self.record(ProcessCall::Commands {
                target: target.to_string(),
            });
            Ok(self.commands.lock().unwrap().clone())
        }
    }
}
