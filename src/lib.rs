/// Answer schema evaluation: ordering, overrides, validation and resolution.
pub mod answers;

/// Handles argument parsing and runs the subcommands.
pub mod cli;

/// Schema document loading and validation.
pub mod config;

/// Names, defaults and exit codes shared across the crate.
pub mod constants;

/// Defines custom error types.
pub mod error;

/// Extension traits for standard library types.
pub mod ext;

/// Post-generation hook execution.
pub mod hooks;

/// Processes .stencilignore files to exclude specific paths.
pub mod ignore;

/// Registration of shared templates for include and import.
pub mod import;

/// A set of helpers for working with the file system.
pub mod ioutils;

/// Answers file and render manifest kept in the destination.
pub mod metadata;

/// User input and interaction handling.
pub mod prompt;

/// Template parsing and rendering functionality.
pub mod renderer;

/// Conditional path resolution and the render/copy dispatcher.
pub mod template;
