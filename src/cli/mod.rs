//! Command line surface
//!
//! - `args`: the `clap` argument model
//! - `runner`: the run state machine behind each subcommand

pub mod args;
pub mod runner;

pub use args::{
    get_args, get_log_level_from_verbose, AnswerArgs, Cli, Commands, CopyArgs, HooksArgs,
    UpdateArgs,
};
pub use runner::{collect_overrides, RunSummary, Runner, Stage};
