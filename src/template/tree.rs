use crate::error::Result;
use crate::ext::PathExt;
use crate::template::rule::PathRule;
use globset::GlobSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One file or directory of the template source tree.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Absolute path of the entry.
    pub source: PathBuf,
    /// Path relative to the template root.
    pub relative: PathBuf,
    pub is_dir: bool,
    pub rule: PathRule,
}

/// Scans the template tree depth first, directories before their contents,
/// siblings sorted by name. Ignored entries are dropped with their subtrees.
pub fn scan_template_tree(template_root: &Path, ignored: &GlobSet) -> Result<Vec<SourceEntry>> {
    let is_ignored = |path: &Path| {
        path.strip_prefix(template_root)
            .map(|relative| ignored.is_match(relative.to_slash_string()))
            .unwrap_or(false)
    };

    let mut entries = Vec::new();
    for entry in WalkDir::new(template_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let skip = is_ignored(entry.path());
            if skip {
                log::debug!("Ignoring '{}' (matches ignore pattern)", entry.path().display());
            }
            !skip
        })
    {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(template_root)
            .map_err(|e| anyhow::anyhow!("'{}' is outside the template: {e}", entry.path().display()))?
            .to_path_buf();
        let rule = PathRule::parse(&relative)?;
        entries.push(SourceEntry {
            source: entry.path().to_path_buf(),
            is_dir: entry.file_type().is_dir(),
            relative,
            rule,
        });
    }
    log::debug!("Found {} entries in '{}'", entries.len(), template_root.display());
    Ok(entries)
}
