use crate::constants::{exit_codes, verbosity};
use crate::template::ConflictPolicy;
use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// CLI arguments for Stencil.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate a new project from a template.
    Copy(CopyArgs),
    /// Re-apply the template to a previously generated project.
    Update(UpdateArgs),
    /// Re-run the post-generation hooks of a generated project.
    Hooks(HooksArgs),
}

/// How answers are supplied and what happens after rendering.
#[derive(Args, Debug, Clone, Default)]
pub struct AnswerArgs {
    /// Accept every default without prompting.
    #[arg(long)]
    pub defaults: bool,

    /// Answer a question as `key=value`; may be repeated.
    #[arg(short = 'd', long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,

    /// Predefined answers as JSON string or `-` to read from stdin.
    #[arg(short, long)]
    pub answers: Option<String>,

    /// Predefined answers from a YAML or JSON file.
    #[arg(long = "answers-file", value_name = "PATH")]
    pub answers_file: Option<PathBuf>,

    /// Run post-generation hooks without asking.
    #[arg(long)]
    pub trust: bool,

    /// Preview actions without touching the filesystem.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CopyArgs {
    /// Template directory.
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Destination directory for generated files.
    #[arg(value_name = "DESTINATION")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub answers: AnswerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Previously generated project.
    #[arg(value_name = "DESTINATION")]
    pub output_dir: PathBuf,

    /// Template directory; defaults to the one recorded in the answers file.
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// What to do with files edited locally that the template also changed.
    #[arg(long, value_enum, default_value_t = ConflictPolicy::Keep)]
    pub conflict: ConflictPolicy,

    #[command(flatten)]
    pub answers: AnswerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct HooksArgs {
    /// Previously generated project.
    #[arg(value_name = "DESTINATION")]
    pub output_dir: PathBuf,

    /// Template directory; defaults to the one recorded in the answers file.
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Run the hooks without asking.
    #[arg(long)]
    pub trust: bool,
}

/// Parse command line arguments with custom handling for missing required inputs.
pub fn get_args() -> Cli {
    Cli::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::MissingRequiredArgument
            || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        {
            let mut command = Cli::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_verbose_flags_to_log_filters() {
        assert_eq!(get_log_level_from_verbose(verbosity::OFF), LevelFilter::Error);
        assert_eq!(get_log_level_from_verbose(verbosity::INFO), LevelFilter::Info);
        assert_eq!(get_log_level_from_verbose(verbosity::DEBUG), LevelFilter::Debug);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE), LevelFilter::Trace);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE + 1), LevelFilter::Trace);
    }

    #[test]
    fn parses_minimal_copy() {
        let cli = Cli::parse_from(["stencil", "copy", "template_dir", "output_dir"]);
        let Commands::Copy(args) = cli.command else { panic!("expected copy") };
        assert_eq!(args.template, PathBuf::from("template_dir"));
        assert_eq!(args.output_dir, PathBuf::from("output_dir"));
        assert!(!args.answers.defaults);
        assert!(args.answers.data.is_empty());
    }

    #[test]
    fn parses_full_copy() {
        let cli = Cli::parse_from([
            "stencil",
            "copy",
            "template_dir",
            "output_dir",
            "-vvv",
            "--defaults",
            "--trust",
            "-d",
            "project_slug=my-app",
            "--data",
            "include_docs=yes",
            "--answers",
            "{\"license\":\"MIT\"}",
            "--answers-file",
            "answers.yml",
            "--dry-run",
        ]);
        assert_eq!(cli.verbose, 3);
        let Commands::Copy(args) = cli.command else { panic!("expected copy") };
        assert!(args.answers.defaults);
        assert!(args.answers.trust);
        assert!(args.answers.dry_run);
        assert_eq!(args.answers.data, vec!["project_slug=my-app", "include_docs=yes"]);
        assert_eq!(args.answers.answers.as_deref(), Some("{\"license\":\"MIT\"}"));
        assert_eq!(args.answers.answers_file, Some(PathBuf::from("answers.yml")));
    }

    #[test]
    fn parses_update_with_conflict_policy() {
        let cli = Cli::parse_from(["stencil", "update", "out", "--conflict", "overwrite"]);
        let Commands::Update(args) = cli.command else { panic!("expected update") };
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.conflict, ConflictPolicy::Overwrite);
        assert_eq!(args.template, None);

        let cli = Cli::parse_from(["stencil", "update", "out", "--template", "tpl"]);
        let Commands::Update(args) = cli.command else { panic!("expected update") };
        assert_eq!(args.conflict, ConflictPolicy::Keep);
        assert_eq!(args.template, Some(PathBuf::from("tpl")));
    }

    #[test]
    fn parses_hooks() {
        let cli = Cli::parse_from(["stencil", "hooks", "out", "--trust"]);
        let Commands::Hooks(args) = cli.command else { panic!("expected hooks") };
        assert!(args.trust);
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
