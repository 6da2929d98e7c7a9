use std::process::ExitStatus;
use thiserror::Error;

use crate::constants::exit_codes;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}.")]
    JSONParseError(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}.")]
    YAMLParseError(#[from] serde_yaml::Error),

    #[error("Failed to parse .stencilignore file. Original error: {0}")]
    GlobSetParseError(#[from] globset::Error),

    #[error("Failed to walk the template directory: {0}")]
    WalkDirError(#[from] walkdir::Error),

    #[error("Failed to render. Original error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Prompt failed: {0}")]
    DialoguerError(#[from] dialoguer::Error),

    #[error("Failed to persist file: {0}")]
    PersistError(#[from] tempfile::PersistError),

    #[error("No configuration file found in '{template_dir}'. Tried: {config_files}.")]
    ConfigNotFound { template_dir: String, config_files: String },

    #[error("Configuration validation failed: {0}.")]
    ConfigValidation(String),

    /// A question's `default` or `ask_if` cannot be evaluated statically.
    #[error("Schema error in question '{question}': {reason}.")]
    SchemaError { question: String, reason: String },

    /// The questions' `default`/`ask_if` references form a cycle.
    #[error("Schema error: questions depend on each other in a cycle: {questions}.")]
    DependencyCycle { questions: String },

    /// An override was rejected by the question's validator.
    #[error("Configuration error: value supplied for '{question}' was rejected: {reason}.")]
    OverrideRejected { question: String, reason: String },

    /// A default accepted without prompting was rejected by the validator.
    #[error("Validation error for '{question}': {reason}.")]
    ValidationError { question: String, reason: String },

    /// The validator itself failed, independent of the candidate value.
    #[error("Validator for '{question}' failed: {reason}.")]
    ValidatorFailed { question: String, reason: String },

    #[error("Invalid override '{entry}': expected KEY=VALUE.")]
    InvalidOverride { entry: String },

    #[error("Cannot coerce value for '{question}': {reason}.")]
    OverrideCoercion { question: String, reason: String },

    #[error("Path collision: '{first}' and '{second}' both resolve to '{destination}'.")]
    PathCollision { destination: String, first: String, second: String },

    #[error("Path '{path}' references '{name}', which is not a known answer.")]
    UnknownGuardReference { path: String, name: String },

    #[error("Failed to render '{path}': '{binding}' is undefined.")]
    RenderError { path: String, binding: String },

    /// A post-generation hook ran but reported failure.
    #[error("Project was generated, but post-generation hook `{command}` failed with status: {status}.")]
    HookExecutionError { command: String, status: ExitStatus },

    /// A post-generation hook could not be rendered or started.
    #[error("Project was generated, but post-generation hook `{command}` could not be run: {reason}.")]
    HookLaunchError { command: String, reason: String },

    #[error("Cannot proceed: destination '{output_dir}' exists and is not a directory.")]
    OutputDirectoryInvalid { output_dir: String },

    #[error("Cannot proceed: template directory '{template_dir}' does not exist.")]
    TemplateDoesNotExistsError { template_dir: String },

    #[error("No answers file found in '{output_dir}'; was it generated by stencil?")]
    AnswersFileNotFound { output_dir: String },

    #[error("Cannot process the source path: '{source_path}'. Original error: {e}")]
    ProcessError { source_path: String, e: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias for Results with Stencil's Error as the error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
/// * `E` - The error type, `Error` unless stated otherwise
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(exit_codes::FAILURE);
}
