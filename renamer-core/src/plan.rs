use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::path::is_plain_file_name;

/// Label shown as the "source" of conflicts produced by batch rules.
pub const BATCH_SOURCE_LABEL: &str = "[Batch processing]";

/// A file present in the target directory at listing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
}

/// One validated rename that has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOp {
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub old_name: String,
    pub new_name: String,
    /// The name the new base was taken from (pair plans only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

impl RenameOp {
    /// Both names are plain file names, the paths end in those names and
    /// share one parent directory.
    pub fn stays_in_directory(&self) -> bool {
        is_plain_file_name(&self.old_name)
            && is_plain_file_name(&self.new_name)
            && self.old_path.file_name().is_some_and(|name| name == self.old_name.as_str())
            && self.new_path.file_name().is_some_and(|name| name == self.new_name.as_str())
            && self.old_path.parent() == self.new_path.parent()
    }
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConflictKind {
    /// An earlier candidate already claimed the same destination
    DuplicateDestination { previous: String },
    /// Old and new path name the same file slot
    IdenticalNames,
    /// The destination is taken by a file that is not part of this batch
    DestinationExists,
    /// The old or new name is not a plain file name inside the target folder
    InvalidName,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateDestination { previous } => {
                write!(f, "name conflict with «{}»", previous)
            },
            Self::IdenticalNames => write!(f, "source and destination names are identical"),
            Self::DestinationExists => {
                write!(f, "a file with this name already exists in the target folder")
            },
            Self::InvalidName => {
                write!(f, "names must refer to a file directly inside the target folder")
            },
        }
    }
}

/// A candidate rename rejected before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub target_name: String,
    pub source_name: String,
    pub new_name: String,
    pub reason: String,
    pub kind: ConflictKind,
}

impl Conflict {
    pub fn new(
        target_name: impl Into<String>,
        source_name: impl Into<String>,
        new_name: impl Into<String>,
        kind: ConflictKind,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            source_name: source_name.into(),
            new_name: new_name.into(),
            reason: kind.to_string(),
            kind,
        }
    }
}

/// The exhaustive partition of candidates into accepted operations and
/// rejected conflicts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
    #[serde(default)]
    pub operations: Vec<RenameOp>,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
}

impl PlanResult {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.conflicts.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Outcome of applying a plan's operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub success: usize,
    pub errors: Vec<String>,
}

impl ExecuteResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conflict_reason_messages() {
        let conflict = Conflict::new(
            "b.txt",
            "a.png",
            "a.txt",
            ConflictKind::DuplicateDestination {
                previous: "c.txt".to_string(),
            },
        );
        assert_eq!(conflict.reason, "name conflict with «c.txt»");
        assert_eq!(
            ConflictKind::IdenticalNames.to_string(),
            "source and destination names are identical"
        );
        assert_eq!(
            ConflictKind::DestinationExists.to_string(),
            "a file with this name already exists in the target folder"
        );
        assert_eq!(
            ConflictKind::InvalidName.to_string(),
            "names must refer to a file directly inside the target folder"
        );
    }

    #[test]
    fn test_rename_op_uses_camel_case_and_omits_missing_source() {
        let op = RenameOp {
            old_path: PathBuf::from("dir/a.txt"),
            new_path: PathBuf::from("dir/b.txt"),
            old_name: "a.txt".to_string(),
            new_name: "b.txt".to_string(),
            source_name: None,
        };

        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(
            value,
            json!({
                "oldPath": "dir/a.txt",
                "newPath": "dir/b.txt",
                "oldName": "a.txt",
                "newName": "b.txt",
            })
        );
    }

    #[test]
    fn test_plan_result_accepts_operations_only_json() {
        let plan: PlanResult = serde_json::from_str(
            r#"{"operations":[{"oldPath":"x/1.txt","newPath":"x/2.txt","oldName":"1.txt","newName":"2.txt","sourceName":"2.png"}]}"#,
        )
        .unwrap();

        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.operations[0].source_name.as_deref(), Some("2.png"));
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn test_rename_op_stays_in_directory() {
        let op = |old_path: &str, new_path: &str, old_name: &str, new_name: &str| RenameOp {
            old_path: PathBuf::from(old_path),
            new_path: PathBuf::from(new_path),
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            source_name: None,
        };

        assert!(op("/d/a.txt", "/d/b.txt", "a.txt", "b.txt").stays_in_directory());
        assert!(!op("/etc/hosts", "/d/x", "/etc/hosts", "x").stays_in_directory());
        assert!(!op("/d/a.txt", "/tmp/b.txt", "a.txt", "b.txt").stays_in_directory());
        assert!(!op("/d/a.txt", "/d/sub/b.txt", "a.txt", "sub/b.txt").stays_in_directory());
        assert!(!op("/d/a.txt", "/d/b.txt", "a.txt", "c.txt").stays_in_directory());
    }

    #[test]
    fn test_conflict_kind_is_tagged() {
        let value = serde_json::to_value(ConflictKind::DuplicateDestination {
            previous: "a.txt".to_string(),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"type": "duplicate_destination", "previous": "a.txt"})
        );
    }
}
