use anyhow::{bail, Context as _, Result};
use renamer_core::{OutputFormatter, PlanResult};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::plan::execute_plan;
use crate::{Context, Outcome};

/// Execute the operations stored in a plan file.
///
/// Conflicts recorded in the file are shown but never executed.
pub fn handle_apply(ctx: &Context, plan_path: &Path, log_file: Option<PathBuf>) -> Result<Outcome> {
    let plan = read_plan(plan_path)?;

    let Some(result) = execute_plan(ctx, &plan, log_file)? else {
        return Ok(Outcome::Success);
    };

    match ctx.output {
        OutputFormat::Json => println!("{}", result.format_json()),
        OutputFormat::Summary => {
            if !ctx.quiet {
                print!("{}", result.format_summary());
            }
        },
    }

    Ok(Outcome::Success.and(&result))
}

fn read_plan(path: &Path) -> Result<PlanResult> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    let plan: PlanResult = serde_json::from_str(&content)
        .with_context(|| format!("Invalid plan file {}", path.display()))?;

    if let Some(op) = plan.operations.iter().find(|op| !op.stays_in_directory()) {
        bail!(
            "Invalid plan file {}: {} -> {} does not stay inside one folder",
            path.display(),
            op.old_path.display(),
            op.new_path.display()
        );
    }

    Ok(plan)
}
