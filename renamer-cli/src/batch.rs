use anyhow::Result;
use renamer_core::{build_plan_from_batch, list_entries, BatchParams, NumberPosition};
use std::path::Path;

use crate::cli::{BatchArgs, PlanArgs};
use crate::config::BatchConfig;
use crate::plan::handle_plan;
use crate::{Context, Outcome};

const DEFAULT_NUMBER_FORMAT: &str = "000";
const DEFAULT_NUMBER_START: i64 = 1;
const DEFAULT_NUMBER_SEPARATOR: &str = "_";

/// Combine command-line rules with configured numbering defaults.
pub fn batch_params(rules: BatchArgs, defaults: &BatchConfig) -> BatchParams {
    let number_position = rules.number_position.map_or_else(
        || {
            defaults
                .number_position
                .as_deref()
                .map_or(NumberPosition::Suffix, NumberPosition::from)
        },
        NumberPosition::from,
    );

    BatchParams {
        find: rules.find,
        replace: rules.replace,
        prefix: rules.prefix,
        suffix: rules.suffix,
        remove_from_start: rules.remove_start,
        remove_from_end: rules.remove_end,
        numbering: rules.number,
        number_position,
        number_format: rules
            .number_format
            .or_else(|| defaults.number_format.clone())
            .unwrap_or_else(|| DEFAULT_NUMBER_FORMAT.to_string()),
        number_start: rules
            .number_start
            .or(defaults.number_start)
            .unwrap_or(DEFAULT_NUMBER_START),
        number_separator: rules
            .number_separator
            .or_else(|| defaults.number_separator.clone())
            .unwrap_or_else(|| DEFAULT_NUMBER_SEPARATOR.to_string()),
    }
}

pub fn handle_batch(
    ctx: &Context,
    directory: &Path,
    params: &BatchParams,
    files: Vec<String>,
    args: &PlanArgs,
) -> Result<Outcome> {
    let files = if files.is_empty() {
        list_entries(directory)?
            .into_iter()
            .map(|entry| entry.name)
            .collect()
    } else {
        files
    };

    let policy = ctx.case_policy.resolve(directory);
    let plan = build_plan_from_batch(directory, &files, params, policy);

    handle_plan(ctx, &plan, args)
}
