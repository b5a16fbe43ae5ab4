#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod batch;
pub mod conflict;
pub mod executor;
pub mod listing;
pub mod natural;
pub mod output;
pub mod pairs;
pub mod path;
pub mod plan;
pub mod preview;

pub use batch::{
    build_plan_from_batch, build_plan_from_batch_with_probe, BatchParams, BatchRenamer,
    NumberPosition,
};
pub use conflict::{detect_conflicts, Candidate, CandidateSource, DiskProbe, FileProbe};
pub use executor::{
    execute_rename, execute_rename_with_options, ExecuteOptions, RenameStep, StepError, StepState,
};
pub use listing::{list_entries, ListError};
pub use natural::{natural_cmp, natural_less, natural_sort_by_key};
pub use output::{ListResult, OutputFormat, OutputFormatter, VersionResult};
pub use pairs::{
    build_plan_from_pairs, build_plan_from_pairs_with_probe, compute_new_name, pair_by_position,
    Pair, PairMapping,
};
pub use path::{
    clean_path, is_plain_file_name, normalize_for_comparison, same_path_relaxed, CasePolicy,
};
pub use plan::{
    Conflict, ConflictKind, ExecuteResult, FileEntry, PlanResult, RenameOp, BATCH_SOURCE_LABEL,
};
pub use preview::{render_plan, Preview};
