use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::types::{CasePolicyArg, NumberPositionArg, OutputFormat, PreviewArg};

/// Plan and apply bulk file renames without ever overwriting a file
#[derive(Parser, Debug)]
#[command(name = "renamer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for machine consumption
    #[arg(long, global = true, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Suppress all non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Assume yes for all prompts
    #[arg(short = 'y', long = "yes", global = true, env = "RENAMER_YES")]
    pub yes: bool,

    /// How names are compared in the target directory (default from config, else host)
    #[arg(long, global = true, value_enum)]
    pub case_policy: Option<CasePolicyArg>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by the commands that build a plan
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    /// Preview format (default from config, else table)
    #[arg(long, value_enum)]
    pub preview: Option<PreviewArg>,

    /// Write the plan as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub plan_out: Option<PathBuf>,

    /// Execute the plan after confirmation
    #[arg(long)]
    pub apply: bool,

    /// Append a timestamped execution log to this file
    #[arg(long, value_name = "FILE", requires = "apply")]
    pub log_file: Option<PathBuf>,
}

/// Batch transformation rules, applied in this order: find/replace, trim,
/// numbering, prefix/suffix
#[derive(Args, Debug, Clone, Default)]
pub struct BatchArgs {
    /// Literal text to find (case-sensitive, every occurrence)
    #[arg(long, default_value = "")]
    pub find: String,

    /// Replacement for --find
    #[arg(long, default_value = "")]
    pub replace: String,

    /// Text put in front of the name
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Text appended to the name, before the extension
    #[arg(long, default_value = "")]
    pub suffix: String,

    /// Characters to drop from the start of the name
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub remove_start: usize,

    /// Characters to drop from the end of the name (extension excluded)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub remove_end: usize,

    /// Add a sequential number
    #[arg(long)]
    pub number: bool,

    /// Where the number goes
    #[arg(long, value_enum)]
    pub number_position: Option<NumberPositionArg>,

    /// Zero padding, e.g. "000"
    #[arg(long, value_name = "ZEROS")]
    pub number_format: Option<String>,

    /// First number of the sequence
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub number_start: Option<i64>,

    /// Accepted and stored in the plan parameters; the joiner is always "_"
    #[arg(long, value_name = "SEP")]
    pub number_separator: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the files of a directory in natural order
    List {
        /// Directory to list (prompted for when omitted on a terminal)
        dir: Option<PathBuf>,
    },

    /// Rename files to the base names of other files, keeping their extensions
    Pairs {
        /// Directory holding the files to rename
        dir: Option<PathBuf>,

        /// TARGET=SOURCE: rename TARGET to SOURCE's base name (repeatable)
        #[arg(long = "pair", value_name = "TARGET=SOURCE", value_parser = parse_pair, required_unless_present = "source_dir")]
        pairs: Vec<(String, String)>,

        /// Pair the directory's files with this directory's files by position
        #[arg(long, value_name = "DIR", conflicts_with = "pairs")]
        source_dir: Option<PathBuf>,

        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Rename files with find/replace, trimming, prefix/suffix and numbering rules
    Batch {
        /// Directory holding the files to rename
        dir: Option<PathBuf>,

        #[command(flatten)]
        rules: BatchArgs,

        /// Only these files, in this order (default: every file, natural order)
        #[arg(long, value_name = "NAME", num_args = 1..)]
        files: Vec<String>,

        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Execute the operations of a plan written with --plan-out
    Apply {
        /// Plan file
        plan: PathBuf,

        /// Append a timestamped execution log to this file
        #[arg(long, value_name = "FILE")]
        log_file: Option<PathBuf>,
    },

    /// Pick a folder interactively and print its path
    Choose {
        /// Folder to start from (default: home directory)
        start: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,

        /// Write the completion file into this directory instead of stdout
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn parse_pair(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((target, source)) if !target.is_empty() && !source.is_empty() => {
            Ok((target.to_string(), source.to_string()))
        },
        _ => Err(format!("expected TARGET=SOURCE, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("IMG_1.jpg=beach.png").unwrap(),
            ("IMG_1.jpg".to_string(), "beach.png".to_string())
        );
        assert_eq!(
            parse_pair("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_pair("missing-separator").is_err());
        assert!(parse_pair("=source").is_err());
        assert!(parse_pair("target=").is_err());
    }

    #[test]
    fn test_batch_arguments() {
        let cli = Cli::parse_from([
            "renamer",
            "batch",
            "/photos",
            "--find",
            "IMG",
            "--replace",
            "trip",
            "--number",
            "--number-position",
            "prefix",
            "--number-start",
            "-3",
            "--files",
            "b.jpg",
            "a.jpg",
        ]);

        let Commands::Batch { dir, rules, files, plan } = cli.command else {
            panic!("expected batch command");
        };
        assert_eq!(dir, Some(PathBuf::from("/photos")));
        assert_eq!(rules.find, "IMG");
        assert!(rules.number);
        assert_eq!(rules.number_position, Some(NumberPositionArg::Prefix));
        assert_eq!(rules.number_start, Some(-3));
        assert_eq!(files, vec!["b.jpg", "a.jpg"]);
        assert!(!plan.apply);
    }

    #[test]
    fn test_pairs_requires_pair_or_source_dir() {
        assert!(Cli::try_parse_from(["renamer", "pairs", "/d"]).is_err());
        assert!(Cli::try_parse_from(["renamer", "pairs", "/d", "--source-dir", "/s"]).is_ok());
        assert!(Cli::try_parse_from([
            "renamer",
            "pairs",
            "/d",
            "--pair",
            "a=b",
            "--source-dir",
            "/s"
        ])
        .is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "renamer",
            "list",
            "/d",
            "--output",
            "json",
            "--case-policy",
            "insensitive",
        ]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.case_policy, Some(CasePolicyArg::Insensitive));
    }
}
