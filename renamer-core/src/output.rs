use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

use crate::plan::{ExecuteResult, FileEntry, PlanResult};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

/// Result of listing a directory
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResult {
    pub directory: PathBuf,
    pub entries: Vec<FileEntry>,
}

/// Result of a version command
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResult {
    pub name: String,
    pub version: String,
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }

    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

impl OutputFormatter for PlanResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": !self.has_conflicts(),
            "operation": "plan",
            "summary": {
                "operations": self.operations.len(),
                "conflicts": self.conflicts.len(),
            },
            "plan": self,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        if self.is_empty() {
            output.push_str("Nothing to rename\n");
            return output;
        }

        writeln!(output, "Renames: {} files", self.operations.len()).unwrap();

        if self.has_conflicts() {
            writeln!(output, "Conflicts: {} files", self.conflicts.len()).unwrap();
            for conflict in &self.conflicts {
                writeln!(
                    output,
                    "  {} -> {}: {}",
                    conflict.target_name, conflict.new_name, conflict.reason
                )
                .unwrap();
            }
        }

        output
    }
}

impl OutputFormatter for ExecuteResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.is_clean(),
            "operation": "execute",
            "summary": {
                "renamed": self.success,
                "errors": self.errors.len(),
            },
            "errors": self.errors,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        if self.is_clean() {
            writeln!(output, "✓ Renamed {} files", self.success).unwrap();
        } else {
            writeln!(
                output,
                "Renamed {} files, {} errors:",
                self.success,
                self.errors.len()
            )
            .unwrap();
            for error in &self.errors {
                writeln!(output, "  ✗ {}", error).unwrap();
            }
        }

        output
    }
}

impl OutputFormatter for ListResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "list",
            "directory": self.directory,
            "entries": self.entries,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        for entry in &self.entries {
            writeln!(output, "{}", entry.name).unwrap();
        }
        output
    }
}

impl OutputFormatter for VersionResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "name": self.name,
            "version": self.version,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}
