pub mod args;
pub mod types;

pub use args::{BatchArgs, Cli, Commands, PlanArgs};
pub use types::{CasePolicyArg, OutputFormat, PreviewArg};
