//! Constants used throughout the Stencil application

/// Configuration file names in order of preference
pub const CONFIG_FILENAMES: &[&str] = &["stencil.json", "stencil.yaml", "stencil.yml"];

/// Default template file suffix
pub const DEFAULT_TEMPLATE_SUFFIX: &str = ".stencil.j2";

/// Ignore file name
pub const IGNORE_FILE: &str = ".stencilignore";

/// Answers file written to the destination root after a successful run
pub const ANSWERS_FILE: &str = ".stencil-answers.yml";

/// Render manifest written next to the answers file
pub const MANIFEST_FILE: &str = ".stencil-manifest.json";

/// STDIN indicator for CLI arguments
pub const STDIN_INDICATOR: &str = "-";

/// Names that template expressions may reference without being questions.
///
/// `platform` is injected by the renderer; the rest are MiniJinja globals.
pub const BUILTIN_NAMES: &[&str] = &[
    "platform",
    "range",
    "dict",
    "debug",
    "namespace",
    "lipsum",
    "cycler",
    "joiner",
    "loop",
];

/// Name under which a validation condition sees the candidate answer
pub const VALIDATION_VALUE: &str = "value";

/// JSON Schema validation messages
pub mod validation {
    pub const INVALID_ANSWER: &str = "Invalid answer";
    pub const PASSWORDS_MISMATCH: &str = "Passwords do not match";
    pub const DEFAULT_CONDITION: &str = "true";
}

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
