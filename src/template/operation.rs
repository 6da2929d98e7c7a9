use std::path::PathBuf;

/// What to do with a destination file whose local content differs from both
/// the previous and the new render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConflictPolicy {
    /// Leave the local file alone and report it.
    #[default]
    Keep,
    /// Replace the local file with the new render and report it.
    Overwrite,
}

/// Planned outcome for one destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Create,
    Overwrite,
    Unchanged,
    Conflict { policy: ConflictPolicy },
}

impl FileAction {
    /// Whether applying the action touches the destination file.
    pub fn writes(&self) -> bool {
        match self {
            FileAction::Create | FileAction::Overwrite => true,
            FileAction::Unchanged => false,
            FileAction::Conflict { policy } => *policy == ConflictPolicy::Overwrite,
        }
    }
}

#[derive(Debug)]
pub enum TemplateOperation {
    CreateDirectory { target: PathBuf, target_exists: bool },
    Copy { source: PathBuf, target: PathBuf, content: Vec<u8>, action: FileAction },
    Write { source: PathBuf, target: PathBuf, content: String, action: FileAction },
}

impl TemplateOperation {
    /// Returns the target path for this operation, used for error context.
    pub fn target_path(&self) -> &PathBuf {
        match self {
            TemplateOperation::CreateDirectory { target, .. }
            | TemplateOperation::Copy { target, .. }
            | TemplateOperation::Write { target, .. } => target,
        }
    }

    pub fn action(&self) -> Option<FileAction> {
        match self {
            TemplateOperation::CreateDirectory { .. } => None,
            TemplateOperation::Copy { action, .. } | TemplateOperation::Write { action, .. } => {
                Some(*action)
            }
        }
    }

    /// Returns a brief description of this operation for error messages.
    pub fn error_context(&self) -> String {
        match self {
            TemplateOperation::Copy { source, target, .. } => {
                format!("copy '{}' -> '{}'", source.display(), target.display())
            }
            TemplateOperation::Write { target, .. } => {
                format!("write '{}'", target.display())
            }
            TemplateOperation::CreateDirectory { target, .. } => {
                format!("create directory '{}'", target.display())
            }
        }
    }

    /// Gets a message describing the operation and its outcome.
    ///
    /// # Arguments
    /// * `dry_run` - Whether this is a dry run (no actual file operations)
    pub fn get_message(&self, dry_run: bool) -> String {
        let prefix = if dry_run { "[DRY RUN] " } else { "" };

        match self {
            TemplateOperation::CreateDirectory { target, target_exists } => {
                if *target_exists {
                    format!(
                        "{}Skipping directory creation '{}' (already exists)",
                        prefix,
                        target.display()
                    )
                } else {
                    format!("{}Creating directory '{}'", prefix, target.display())
                }
            }

            TemplateOperation::Copy { source, target, action, .. } => match action {
                FileAction::Create => format!(
                    "{}Copying '{}' to '{}'",
                    prefix,
                    source.display(),
                    target.display()
                ),
                FileAction::Overwrite => format!(
                    "{}Copying '{}' to '{}' (overwriting existing file)",
                    prefix,
                    source.display(),
                    target.display()
                ),
                other => file_message(prefix, target, *other),
            },

            TemplateOperation::Write { target, action, .. } => match action {
                FileAction::Create => format!("{}Writing to '{}'", prefix, target.display()),
                FileAction::Overwrite => format!(
                    "{}Writing to '{}' (overwriting existing file)",
                    prefix,
                    target.display()
                ),
                other => file_message(prefix, target, *other),
            },
        }
    }
}

fn file_message(prefix: &str, target: &std::path::Path, action: FileAction) -> String {
    match action {
        FileAction::Conflict { policy: ConflictPolicy::Keep } => format!(
            "{}Conflict at '{}': keeping local changes",
            prefix,
            target.display()
        ),
        FileAction::Conflict { policy: ConflictPolicy::Overwrite } => format!(
            "{}Conflict at '{}': overwriting local changes",
            prefix,
            target.display()
        ),
        _ => format!("{}Skipping '{}' (unchanged)", prefix, target.display()),
    }
}
