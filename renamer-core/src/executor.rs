use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::plan::{ExecuteResult, RenameOp};

/// Marker inserted between a file's path and the run-unique staging token
const STAGING_MARKER: &str = ".~renametmp~";

/// Options for executing a plan
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Append a timestamped line per step to this file
    pub log_file: Option<PathBuf>,
}

/// Where a single rename is in the two-phase protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepState {
    /// Not touched yet
    Pending,
    /// Moved away from its original path to a staging path
    Staged { staging_path: PathBuf },
    /// Moved to its final destination
    Committed,
    /// Moved back to its original path after phase 1 was aborted
    RolledBack,
    /// Phase 2 failed and the file is back at its original path
    Failed,
    /// Phase 2 failed and the file could not be put back; it stays at the
    /// staging path
    Stranded { staging_path: PathBuf },
}

impl StepState {
    fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Staged { .. } => "staged",
            Self::Committed => "committed",
            Self::RolledBack => "rolled back",
            Self::Failed => "failed",
            Self::Stranded { .. } => "stranded",
        }
    }
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("phase 1: {} -> {}: {source}", .from.display(), .to.display())]
    Stage {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("phase 2: {} -> {}: {source}", .from.display(), .to.display())]
    Commit {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("phase 2: {} -> {}: destination already exists", .from.display(), .to.display())]
    DestinationTaken { from: PathBuf, to: PathBuf },

    #[error("rollback: {} -> {}: {source}", .from.display(), .to.display())]
    Rollback {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("{source}; file kept at {}", .staging_path.display())]
    Stranded {
        source: Box<StepError>,
        staging_path: PathBuf,
    },

    #[error("cannot {action} a rename that is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

/// One operation moving through `Pending -> Staged -> Committed`, or
/// `Staged -> RolledBack`, `Staged -> Failed` or `Staged -> Stranded` when
/// something goes wrong.
#[derive(Debug)]
pub struct RenameStep {
    op: RenameOp,
    state: StepState,
}

impl RenameStep {
    pub fn new(op: RenameOp) -> Self {
        Self {
            op,
            state: StepState::Pending,
        }
    }

    pub fn op(&self) -> &RenameOp {
        &self.op
    }

    pub fn state(&self) -> &StepState {
        &self.state
    }

    /// Phase 1: move the file to a free staging path derived from `token`.
    pub fn stage(&mut self, token: &str) -> Result<PathBuf, StepError> {
        if self.state != StepState::Pending {
            return Err(self.invalid("stage"));
        }

        let staging_path = free_staging_path(&self.op.old_path, token);
        fs::rename(&self.op.old_path, &staging_path).map_err(|source| StepError::Stage {
            from: self.op.old_path.clone(),
            to: staging_path.clone(),
            source,
        })?;

        self.state = StepState::Staged {
            staging_path: staging_path.clone(),
        };
        Ok(staging_path)
    }

    /// Undo phase 1 by moving the staged file back to its original path.
    pub fn roll_back(&mut self) -> Result<(), StepError> {
        let staging_path = self.staging_path("roll back")?;

        fs::rename(&staging_path, &self.op.old_path).map_err(|source| StepError::Rollback {
            from: staging_path.clone(),
            to: self.op.old_path.clone(),
            source,
        })?;

        self.state = StepState::RolledBack;
        Ok(())
    }

    /// Phase 2: move the staged file to its destination.
    ///
    /// Never replaces an existing entry. On failure the file is moved back to
    /// its original path and the step ends up `Failed`. When that path has
    /// been taken in the meantime, or the move back fails, the file stays at
    /// its staging path and the step ends up `Stranded`.
    pub fn commit(&mut self) -> Result<(), StepError> {
        let staging_path = self.staging_path("commit")?;
        let destination = &self.op.new_path;

        let outcome = if path_exists(destination) {
            Err(StepError::DestinationTaken {
                from: staging_path.clone(),
                to: destination.clone(),
            })
        } else {
            fs::rename(&staging_path, destination).map_err(|source| StepError::Commit {
                from: staging_path.clone(),
                to: destination.clone(),
                source,
            })
        };

        match outcome {
            Ok(()) => {
                self.state = StepState::Committed;
                Ok(())
            },
            Err(error) => {
                if self.repair(&staging_path) {
                    self.state = StepState::Failed;
                    Err(error)
                } else {
                    self.state = StepState::Stranded {
                        staging_path: staging_path.clone(),
                    };
                    Err(StepError::Stranded {
                        source: Box::new(error),
                        staging_path,
                    })
                }
            },
        }
    }

    /// Move a staged file back to its original path without replacing
    /// anything there. Returns whether the file is back.
    fn repair(&self, staging_path: &Path) -> bool {
        let original = &self.op.old_path;

        if path_exists(original) {
            warn!(
                staging = %staging_path.display(),
                original = %original.display(),
                "Original name is taken, leaving file at its staging path"
            );
            return false;
        }

        match fs::rename(staging_path, original) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    staging = %staging_path.display(),
                    original = %original.display(),
                    error = %e,
                    "Could not move file back to its original name"
                );
                false
            },
        }
    }

    fn staging_path(&self, action: &'static str) -> Result<PathBuf, StepError> {
        match &self.state {
            StepState::Staged { staging_path } => Ok(staging_path.clone()),
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &'static str) -> StepError {
        StepError::InvalidTransition {
            action,
            state: self.state.label(),
        }
    }
}

/// Optional timestamped execution log
struct ExecutionLog {
    file: Option<File>,
}

impl ExecutionLog {
    fn disabled() -> Self {
        Self { file: None }
    }

    fn open(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::disabled());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        Ok(Self { file: Some(file) })
    }

    /// Write failures are reported but never interrupt a running phase.
    fn log(&mut self, message: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        let written = writeln!(
            file,
            "[{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        )
        .and_then(|()| file.flush());

        if let Err(e) = written {
            warn!(error = %e, "Failed to write execution log");
        }
    }
}

/// Apply conflict-free operations with the two-phase protocol.
///
/// Phase 1 moves every file to a staging path; if any move fails, everything
/// staged so far is moved back and nothing is reported as renamed. Phase 2
/// moves each staged file to its destination independently.
pub fn execute_rename(operations: Vec<RenameOp>) -> ExecuteResult {
    run(operations, ExecutionLog::disabled())
}

/// Like [`execute_rename`], with an optional execution log.
///
/// Only fails when the log file cannot be opened, before any file is touched.
pub fn execute_rename_with_options(
    operations: Vec<RenameOp>,
    options: &ExecuteOptions,
) -> Result<ExecuteResult> {
    if operations.is_empty() {
        return Ok(ExecuteResult::default());
    }

    let log = ExecutionLog::open(options.log_file.as_deref())?;
    Ok(run(operations, log))
}

fn run(operations: Vec<RenameOp>, mut log: ExecutionLog) -> ExecuteResult {
    if operations.is_empty() {
        return ExecuteResult::default();
    }

    let token = staging_token();
    let mut steps: Vec<RenameStep> = operations.into_iter().map(RenameStep::new).collect();

    info!(operations = steps.len(), "Staging renames");
    log.log(&format!("Starting execution of {} renames", steps.len()));

    for index in 0..steps.len() {
        match steps[index].stage(&token) {
            Ok(staging_path) => {
                let message = format!(
                    "Staged {} -> {}",
                    steps[index].op().old_path.display(),
                    staging_path.display()
                );
                debug!("{}", message);
                log.log(&message);
            },
            Err(error) => {
                warn!(error = %error, "Staging failed, rolling back");
                log.log(&format!("Error: {}", error));
                roll_back(&mut steps[..index], &mut log);
                return ExecuteResult {
                    success: 0,
                    errors: vec![error.to_string()],
                };
            },
        }
    }

    let mut result = ExecuteResult::default();

    for step in &mut steps {
        match step.commit() {
            Ok(()) => {
                result.success += 1;
                log.log(&format!(
                    "Renamed {} -> {}",
                    step.op().old_path.display(),
                    step.op().new_path.display()
                ));
            },
            Err(error) => {
                warn!(error = %error, "Rename failed");
                log.log(&format!("Error: {}", error));
                result.errors.push(error.to_string());
            },
        }
    }

    info!(
        success = result.success,
        errors = result.errors.len(),
        "Execution finished"
    );
    log.log(&format!(
        "Finished: {} renamed, {} errors",
        result.success,
        result.errors.len()
    ));

    result
}

/// Move staged files back, most recent first. Failures are logged only.
fn roll_back(staged: &mut [RenameStep], log: &mut ExecutionLog) {
    for step in staged.iter_mut().rev() {
        match step.roll_back() {
            Ok(()) => log.log(&format!("Restored {}", step.op().old_path.display())),
            Err(error) => {
                warn!(error = %error, "Rollback step failed");
                log.log(&format!("Error: {}", error));
            },
        }
    }
}

/// Token shared by every staging path of one execution.
fn staging_token() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    format!("{}{}", STAGING_MARKER, nanos)
}

/// `original + token`, with `0`, `1`, ... appended while that path is taken.
fn free_staging_path(original: &Path, token: &str) -> PathBuf {
    let mut base = OsString::from(original.as_os_str());
    base.push(token);

    let mut candidate = PathBuf::from(&base);
    let mut index = 0usize;
    while path_exists(&candidate) {
        let mut numbered = base.clone();
        numbered.push(index.to_string());
        candidate = PathBuf::from(numbered);
        index += 1;
    }

    candidate
}

fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
