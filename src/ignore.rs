use crate::constants::{ANSWERS_FILE, CONFIG_FILENAMES, IGNORE_FILE, MANIFEST_FILE};
use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::{fs::read_to_string, path::Path};

/// Patterns always excluded from the template tree, relative to its root.
const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git",
    ".git/**",
    ".hg",
    ".hg/**",
    ".svn",
    ".svn/**",
    "**/.DS_Store",
];

/// Builds the set of ignored paths for a template.
///
/// Patterns match paths relative to `template_root`, written with `/`. The
/// defaults, the schema files, stencil's own state files and every line of
/// `.stencilignore` (blank lines and `#` comments skipped) are included.
pub fn parse_ignore_file<P: AsRef<Path>>(template_root: P) -> Result<GlobSet> {
    let template_root = template_root.as_ref();
    let mut patterns: Vec<String> = DEFAULT_IGNORE_PATTERNS
        .iter()
        .chain(CONFIG_FILENAMES)
        .chain([IGNORE_FILE, ANSWERS_FILE, MANIFEST_FILE].iter())
        .map(|pattern| pattern.to_string())
        .collect();

    match read_to_string(template_root.join(IGNORE_FILE)) {
        Ok(contents) => patterns.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(|line| line.trim_start_matches("./").trim_end_matches('/').to_string()),
        ),
        Err(_) => debug!("No {IGNORE_FILE} file found, using default patterns."),
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in &patterns {
        builder.add(Glob::new(pattern)?);
    }
    debug!("Ignore patterns: {patterns:?}");
    Ok(builder.build()?)
}
