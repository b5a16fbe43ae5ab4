use anyhow::Result;
use renamer_core::{list_entries, ListResult, OutputFormatter};
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::{Context, Outcome};

pub fn handle_list(ctx: &Context, directory: PathBuf) -> Result<Outcome> {
    let entries = list_entries(&directory)?;
    let result = ListResult { directory, entries };

    match ctx.output {
        OutputFormat::Json => println!("{}", result.format_json()),
        OutputFormat::Summary => {
            if !ctx.quiet {
                print!("{}", result.format_summary());
            }
        },
    }

    Ok(Outcome::Success)
}
