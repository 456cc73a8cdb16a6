// Terminal rendering

use colored::Colorize;
use mbyte_core::application::{CommandExecution, CommandPhase};
use mbyte_core::domain::{CommandDescriptor, Node, Process};
use tabled::{Table, Tabled};

const NONE: &str = "-";

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "COMMAND")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CREATED")]
    creation: String,
}

#[derive(Tabled)]
struct CommandRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "APP TYPE")]
    app_type: String,
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "APPLICABLE")]
    applicable: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SIZE")]
    size: String,
    #[tabled(rename = "MODIFIED")]
    modified: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn or_none(value: Option<&str>) -> String {
    value.unwrap_or(NONE).to_string()
}

pub fn processes_table(processes: &[Process]) -> String {
    let rows: Vec<ProcessRow> = processes
        .iter()
        .map(|process| ProcessRow {
            id: process.id.clone(),
            name: or_none(process.name.as_deref()),
            status: or_none(process.status.as_deref()),
            creation: or_none(process.creation.as_deref()),
        })
        .collect();
    Table::new(rows).to_string()
}

/// Applicability is only shown when the application status is known
pub fn commands_table(commands: &[CommandDescriptor], app_status: Option<&str>) -> String {
    let rows: Vec<CommandRow> = commands
        .iter()
        .map(|command| CommandRow {
            name: command.name.clone(),
            app_type: command.app_type.clone(),
            version: or_none(command.version.as_deref()),
            applicable: match app_status {
                None => NONE.to_string(),
                Some(_) if command.is_applicable_to(app_status) => "yes".to_string(),
                Some(_) => "no".to_string(),
            },
            description: or_none(command.description.as_deref()),
        })
        .collect();
    Table::new(rows).to_string()
}

pub fn nodes_table(nodes: &[Node]) -> String {
    let rows: Vec<NodeRow> = nodes
        .iter()
        .map(|node| NodeRow {
            kind: node.kind.to_string(),
            name: node.name.clone(),
            size: if node.is_folder() {
                NONE.to_string()
            } else {
                format_size(node.size)
            },
            modified: node
                .modification
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| NONE.to_string()),
            id: node.id.clone(),
        })
        .collect();
    Table::new(rows).to_string()
}

/// Human readable size (1024 based)
pub fn format_size(size: Option<u64>) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let Some(bytes) = size else {
        return NONE.to_string();
    };
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// One line per runner state change
pub fn execution_line(exec: &CommandExecution) -> String {
    let phase = match exec.phase {
        CommandPhase::Idle => exec.phase.to_string().dimmed(),
        CommandPhase::Running | CommandPhase::Polling => exec.phase.to_string().cyan(),
        CommandPhase::Completed => exec.phase.to_string().green().bold(),
        CommandPhase::Error => exec.phase.to_string().red().bold(),
    };

    let mut line = format!("[{}]", phase);
    if let Some(id) = &exec.tracked_process_id {
        line.push_str(&format!(" process {}", id));
    }
    if let Some(status) = exec.status() {
        line.push_str(&format!(" status {}", status.bold()));
    }
    if let Some(error) = &exec.last_error {
        line.push_str(&format!(" {}", error.red()));
    }
    line
}
