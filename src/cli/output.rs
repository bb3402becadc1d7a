//! Output formatting helpers for CLI commands

use crate::factory::EntryStatus;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

/// Connection state of one entry after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Connected,
    /// The entry the sweep stopped at.
    Failed,
    /// Not attempted because an earlier entry failed.
    Pending,
}

/// View model for entry display
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub name: String,
    pub backend_type: String,
    pub state: EntryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
}

impl EntryView {
    /// Build the view for `status`; `failed` names the entry that failed, if any.
    pub fn new(status: &EntryStatus, failed: Option<&str>) -> Self {
        let state = if status.connected {
            EntryState::Connected
        } else if failed == Some(status.name.as_str()) {
            EntryState::Failed
        } else {
            EntryState::Pending
        };

        Self {
            name: status.name.clone(),
            backend_type: status.backend_type.to_string(),
            state,
            connected_at: status.connected_at,
        }
    }
}

/// View model for backend type display
#[derive(Debug, Clone, Serialize)]
pub struct TypeView {
    pub backend_type: String,
    pub description: String,
}

/// Format entries as a table
pub fn format_entries_table(entries: &[EntryView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Type", "State", "Connected At"]);

    for e in entries {
        let state_str = match e.state {
            EntryState::Connected => "Connected".green().to_string(),
            EntryState::Failed => "Failed".red().to_string(),
            EntryState::Pending => "Pending".yellow().to_string(),
        };
        let connected_at = e
            .connected_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(&e.name),
            Cell::new(&e.backend_type),
            Cell::new(state_str),
            Cell::new(connected_at),
        ]);
    }

    table.to_string()
}

/// Format entries as JSON
pub fn format_entries_json(
    entries: &[EntryView],
    error: Option<&str>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({
        "databases": entries,
        "error": error,
    }))
}

/// Format backend types as a table
pub fn format_types_table(types: &[TypeView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Type", "Description"]);

    for t in types {
        table.add_row(vec![Cell::new(&t.backend_type), Cell::new(&t.description)]);
    }

    table.to_string()
}

/// Format backend types as JSON
pub fn format_types_json(types: &[TypeView]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({
        "types": types
    }))
}
