use anyhow::{Context as _, Result};
use renamer_core::{
    execute_rename_with_options, render_plan, ExecuteOptions, ExecuteResult, OutputFormatter,
    PlanResult,
};
use serde_json::json;
use std::fs;

use crate::cli::{OutputFormat, PlanArgs};
use crate::interrupt::confirm;
use crate::{Context, Outcome};

/// Show a freshly built plan, optionally save it and optionally execute it.
pub fn handle_plan(ctx: &Context, plan: &PlanResult, args: &PlanArgs) -> Result<Outcome> {
    if let Some(path) = &args.plan_out {
        let content = serde_json::to_string_pretty(plan)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write plan to {}", path.display()))?;
    }

    let planned = if plan.has_conflicts() {
        Outcome::Problems
    } else {
        Outcome::Success
    };

    if !args.apply {
        match ctx.output {
            OutputFormat::Json => println!("{}", plan.format_json()),
            OutputFormat::Summary => {
                if !ctx.quiet {
                    print!("{}", render_plan(plan, ctx.preview, ctx.use_color));
                }
            },
        }
        return Ok(planned);
    }

    let Some(result) = execute_plan(ctx, plan, args.log_file.clone())? else {
        return Ok(planned);
    };

    match ctx.output {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&json!({
                "success": plan.conflicts.is_empty() && result.is_clean(),
                "operation": "apply",
                "plan": plan,
                "execution": result,
            }))?
        ),
        OutputFormat::Summary => {
            if !ctx.quiet {
                print!("{}", result.format_summary());
            }
        },
    }

    Ok(planned.and(&result))
}

/// Preview, confirm and execute the operations of `plan`.
///
/// Returns `None` when there is nothing to do or the user declines.
pub fn execute_plan(
    ctx: &Context,
    plan: &PlanResult,
    log_file: Option<std::path::PathBuf>,
) -> Result<Option<ExecuteResult>> {
    let summary = ctx.output == OutputFormat::Summary && !ctx.quiet;

    if summary {
        print!("{}", render_plan(plan, ctx.preview, ctx.use_color));
    }

    if plan.operations.is_empty() {
        if summary {
            println!("No renames to apply.");
        }
        return Ok(None);
    }

    if !ctx.yes {
        let mut question = format!("Rename {} files?", plan.operations.len());
        if plan.has_conflicts() {
            question.push_str(&format!(
                " ({} conflicting files will be left alone)",
                plan.conflicts.len()
            ));
        }

        if !confirm(&question)? {
            if summary {
                println!("Operation cancelled.");
            }
            return Ok(None);
        }
    }

    let options = ExecuteOptions { log_file };
    let result = execute_rename_with_options(plan.operations.clone(), &options)?;
    Ok(Some(result))
}
