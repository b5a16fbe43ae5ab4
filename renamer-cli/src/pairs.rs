use anyhow::{Context as _, Result};
use renamer_core::{build_plan_from_pairs, list_entries, pair_by_position, PairMapping};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::PlanArgs;
use crate::plan::handle_plan;
use crate::{Context, Outcome};

pub fn handle_pairs(
    ctx: &Context,
    directory: &Path,
    pairs: Vec<(String, String)>,
    source_dir: Option<PathBuf>,
    args: &PlanArgs,
) -> Result<Outcome> {
    let mapping = match source_dir {
        Some(source_dir) => {
            let targets = list_entries(directory)?;
            let sources = list_entries(&source_dir)
                .with_context(|| format!("Cannot pair with {}", source_dir.display()))?;
            debug!(
                targets = targets.len(),
                sources = sources.len(),
                "Pairing files by position"
            );
            pair_by_position(&targets, &sources)
        },
        None => pairs.into_iter().collect::<PairMapping>(),
    };

    let policy = ctx.case_policy.resolve(directory);
    let plan = build_plan_from_pairs(directory, &mapping, policy);

    handle_plan(ctx, &plan, args)
}
