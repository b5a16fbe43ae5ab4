use anyhow::{anyhow, bail, Result};
use clap::{CommandFactory, Parser};
use renamer_core::{ExecuteResult, OutputFormatter, Preview, VersionResult};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

mod apply;
mod batch;
mod chooser;
mod cli;
mod config;
mod interrupt;
mod list;
mod pairs;
mod plan;

use chooser::{start_folder, FolderChooser, PromptChooser};
use cli::{CasePolicyArg, Cli, Commands, OutputFormat, PreviewArg};
use config::Config;

/// Environment variable holding the log filter
const LOG_ENV: &str = "RENAMER_LOG";

/// Exit status for invalid input: bad arguments, unreadable directory or plan
const INVALID_INPUT_EXIT_CODE: i32 = 2;

/// Settings shared by every command, resolved from flags and config
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputFormat,
    pub quiet: bool,
    pub yes: bool,
    /// `None` means auto-detect
    pub use_color: Option<bool>,
    pub preview: Preview,
    pub case_policy: CasePolicyArg,
}

/// How a command ended when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The plan had conflicts or execution reported errors
    Problems,
}

impl Outcome {
    pub fn and(self, result: &ExecuteResult) -> Self {
        if result.is_clean() {
            self
        } else {
            Self::Problems
        }
    }

    fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Problems => 1,
        }
    }
}

fn main() {
    let interrupted = interrupt::install_handlers().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        process::exit(INVALID_INPUT_EXIT_CODE);
    });

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            INVALID_INPUT_EXIT_CODE
        },
    };

    // Signals during execution are only acted on once the executor is done
    if interrupted.load(Ordering::SeqCst) {
        eprintln!("Operation interrupted.");
        process::exit(interrupt::INTERRUPTED_EXIT_CODE);
    }

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<Outcome> {
    let config = Config::load()?;
    let mut ctx = build_context(&cli, &config)?;

    match cli.command {
        Commands::List { dir } => match resolve_directory(dir)? {
            Some(dir) => list::handle_list(&ctx, dir),
            None => Ok(Outcome::Success),
        },

        Commands::Pairs {
            dir,
            pairs,
            source_dir,
            plan,
        } => {
            let Some(dir) = resolve_directory(dir)? else {
                return Ok(Outcome::Success);
            };
            if let Some(preview) = plan.preview {
                ctx.preview = preview.into();
            }
            pairs::handle_pairs(&ctx, &dir, pairs, source_dir, &plan)
        },

        Commands::Batch {
            dir,
            rules,
            files,
            plan,
        } => {
            let Some(dir) = resolve_directory(dir)? else {
                return Ok(Outcome::Success);
            };
            if let Some(preview) = plan.preview {
                ctx.preview = preview.into();
            }
            let params = batch::batch_params(rules, &config.batch);
            batch::handle_batch(&ctx, &dir, &params, files, &plan)
        },

        Commands::Apply { plan, log_file } => apply::handle_apply(&ctx, &plan, log_file),

        Commands::Choose { start } => handle_choose(&ctx, start),

        Commands::Completions { shell, out_dir } => {
            let mut cmd = Cli::command();
            match out_dir {
                Some(out_dir) => generate_completions(shell, &mut cmd, "renamer", &out_dir)?,
                None => clap_complete::generate(shell, &mut cmd, "renamer", &mut io::stdout()),
            }
            Ok(Outcome::Success)
        },

        Commands::Version => {
            handle_version(ctx.output);
            Ok(Outcome::Success)
        },
    }
}

fn build_context(cli: &Cli, config: &Config) -> Result<Context> {
    let preview = PreviewArg::from_str(&config.defaults.preview_format).ok_or_else(|| {
        anyhow!(
            "invalid preview_format in config: {}",
            config.defaults.preview_format
        )
    })?;

    let case_policy = match cli.case_policy {
        Some(policy) => policy,
        None => CasePolicyArg::from_str(&config.defaults.case_policy).ok_or_else(|| {
            anyhow!(
                "invalid case_policy in config: {}",
                config.defaults.case_policy
            )
        })?,
    };

    let use_color = if cli.no_color {
        Some(false)
    } else {
        config.defaults.use_color
    };

    Ok(Context {
        output: cli.output,
        quiet: cli.quiet,
        yes: cli.yes,
        use_color,
        preview: preview.into(),
        case_policy,
    })
}

/// The directory given on the command line, or one picked interactively.
/// `None` when the user cancels the chooser.
fn resolve_directory(dir: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(dir) = dir {
        return Ok(Some(dir));
    }

    if !io::stdin().is_terminal() {
        bail!("No directory given and stdin is not a terminal");
    }

    PromptChooser::terminal().choose_folder(&start_folder(None))
}

fn handle_choose(ctx: &Context, start: Option<PathBuf>) -> Result<Outcome> {
    let chosen = PromptChooser::terminal().choose_folder(&start_folder(start))?;

    if let Some(path) = chosen {
        match ctx.output {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string(&serde_json::json!({ "path": path }))?
            ),
            OutputFormat::Summary => println!("{}", path.display()),
        }
    }

    Ok(Outcome::Success)
}

// Generate shell completions
pub fn generate_completions<G: clap_complete::Generator>(
    gen: G,
    cmd: &mut clap::Command,
    name: &str,
    out_dir: &std::path::Path,
) -> Result<()> {
    use clap_complete::generate_to;
    use std::fs;

    fs::create_dir_all(out_dir)?;
    let path = generate_to(gen, cmd, name, out_dir)?;
    println!("Generated completion file: {}", path.display());
    Ok(())
}

fn handle_version(output: OutputFormat) {
    let version_result = VersionResult {
        name: "renamer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("{}", version_result.format(output.into()));
}
