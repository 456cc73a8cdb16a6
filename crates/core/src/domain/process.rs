// Process Domain Model

use serde::{Deserialize, Deserializer, Serialize};

/// Process ID (opaque, assigned by the manager)
pub type ProcessId = String;

/// Statuses after which a process is not expected to change anymore
pub const TERMINAL_STATUSES: [&str; 3] = ["COMPLETED", "FAILED", "ROLLED_BACK"];

/// Returns true for `COMPLETED`, `FAILED` and `ROLLED_BACK`
pub fn is_terminal_status(status: &str) -> bool {
    TERMINAL_STATUSES.contains(&status)
}

/// Snapshot of one remote command invocation
///
/// The client never mutates a process, it only observes successive snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,

    /// Open-ended status string (STARTING, RUNNING, COMPLETED, ...)
    #[serde(default)]
    pub status: Option<String>,

    /// Name of the command this process runs
    #[serde(default)]
    pub name: Option<String>,

    /// Owning application id
    #[serde(default)]
    pub app: Option<String>,

    /// Creation time as sent by the manager (epoch millis or text)
    #[serde(default, deserialize_with = "text_or_number")]
    pub creation: Option<String>,

    #[serde(default)]
    pub log: Option<String>,
}

impl Process {
    pub fn new(id: impl Into<String>, status: Option<&str>) -> Self {
        Self {
            id: id.into(),
            status: status.map(str::to_string),
            name: None,
            app: None,
            creation: None,
            log: None,
        }
    }

    /// Shorthand for a process with a known status
    pub fn with_status(id: impl Into<String>, status: &str) -> Self {
        Self::new(id, Some(status))
    }

    /// A missing status is non-terminal
    pub fn is_terminal(&self) -> bool {
        self.status.as_deref().is_some_and(is_terminal_status)
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        for status in ["COMPLETED", "FAILED", "ROLLED_BACK"] {
            assert!(Process::with_status("p-1", status).is_terminal(), "{status}");
        }
        for status in ["STARTING", "RUNNING", "completed", ""] {
            assert!(!Process::with_status("p-1", status).is_terminal(), "{status}");
        }
    }

    #[test]
    fn test_absent_status_is_not_terminal() {
        assert!(!Process::new("p-1", None).is_terminal());
    }

    #[test]
    fn test_process_decodes_with_unknown_fields() {
        let process: Process = serde_json::from_value(serde_json::json!({
            "id": "p-42",
            "status": "RUNNING",
            "name": "start",
            "tasks": []
        }))
        .unwrap();

        assert_eq!(process.id, "p-42");
        assert_eq!(process.status.as_deref(), Some("RUNNING"));
        assert_eq!(process.name.as_deref(), Some("start"));
        assert!(process.app.is_none());
    }

    #[test]
    fn test_numeric_creation_is_kept_as_text() {
        let process: Process = serde_json::from_value(serde_json::json!({
            "id": "p-42",
            "creation": 1735689600000_i64
        }))
        .unwrap();

        assert_eq!(process.creation.as_deref(), Some("1735689600000"));
        assert!(process.status.is_none());
    }
}
