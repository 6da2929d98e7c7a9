//! Conditional path resolution
//!
//! Maps the scanned template tree onto destination paths for one answer set.
//! Resolution is a pure function of the entries and the answers: nothing is
//! read from or written to disk here.

use crate::answers::AnswerSet;
use crate::constants::BUILTIN_NAMES;
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::renderer::TemplateRenderer;
use crate::template::rule::Segment;
use crate::template::tree::SourceEntry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// How a surviving source path is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Create the directory.
    Directory,
    /// Copy the bytes unchanged.
    VerbatimCopy,
    /// Render the content against the answers, then write it.
    SubstituteAndCopy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// Destination relative to the output root.
    pub destination: PathBuf,
    /// Absolute source path.
    pub source: PathBuf,
    /// Source path relative to the template root.
    pub relative_source: PathBuf,
    pub mode: RenderMode,
}

pub struct PathResolver<'a> {
    engine: &'a dyn TemplateRenderer,
    template_suffix: &'a str,
}

impl<'a> PathResolver<'a> {
    pub fn new(engine: &'a dyn TemplateRenderer, template_suffix: &'a str) -> Self {
        Self { engine, template_suffix }
    }

    /// Resolves every entry, keeping the input order.
    ///
    /// A component excluded by its guard excludes everything below it without
    /// evaluating those descendants. Fails on an unknown answer reference, on a
    /// name escaping the output root, and when two sources share a destination.
    pub fn resolve(
        &self,
        entries: &[SourceEntry],
        answers: &AnswerSet,
    ) -> Result<Vec<ResolvedPath>> {
        let context = answers.to_context();
        // Source prefix -> destination prefix, `None` when excluded.
        let mut prefixes: HashMap<PathBuf, Option<PathBuf>> = HashMap::new();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut resolved = Vec::new();

        for entry in entries {
            let Some(destination) = self.destination_of(entry, answers, &context, &mut prefixes)?
            else {
                log::debug!("Excluding '{}'", entry.relative.display());
                continue;
            };

            let (destination, mode) = if entry.is_dir {
                (destination, RenderMode::Directory)
            } else {
                self.strip_template_suffix(destination)
            };

            if let Some(first) = claimed.get(&destination) {
                return Err(Error::PathCollision {
                    destination: destination.to_slash_string(),
                    first: first.to_slash_string(),
                    second: entry.relative.to_slash_string(),
                });
            }
            claimed.insert(destination.clone(), entry.relative.clone());

            log::trace!("'{}' -> '{}' ({mode:?})", entry.relative.display(), destination.display());
            resolved.push(ResolvedPath {
                destination,
                source: entry.source.clone(),
                relative_source: entry.relative.clone(),
                mode,
            });
        }
        Ok(resolved)
    }

    fn destination_of(
        &self,
        entry: &SourceEntry,
        answers: &AnswerSet,
        context: &serde_json::Value,
        prefixes: &mut HashMap<PathBuf, Option<PathBuf>>,
    ) -> Result<Option<PathBuf>> {
        let mut destination = PathBuf::new();
        for (index, segment) in entry.rule.segments().iter().enumerate() {
            let source_prefix = entry.rule.prefix(index + 1);
            let resolved = match prefixes.get(&source_prefix) {
                Some(cached) => cached.clone(),
                None => {
                    let resolved = self
                        .evaluate_segment(segment, &source_prefix, answers, context)?
                        .map(|name| destination.join(name));
                    prefixes.insert(source_prefix, resolved.clone());
                    resolved
                }
            };
            match resolved {
                Some(path) => destination = path,
                None => return Ok(None),
            }
        }
        Ok(Some(destination))
    }

    fn evaluate_segment(
        &self,
        segment: &Segment,
        source_prefix: &Path,
        answers: &AnswerSet,
        context: &serde_json::Value,
    ) -> Result<Option<String>> {
        let source_path = source_prefix.to_slash_string();
        let process_error = |e: Error| Error::ProcessError {
            source_path: source_path.clone(),
            e: e.to_string(),
        };

        let mut references: Vec<String> =
            segment.references(self.engine).map_err(process_error)?.into_iter().collect();
        references.sort();
        if let Some(name) = references
            .into_iter()
            .find(|name| !answers.contains(name) && !BUILTIN_NAMES.contains(&name.as_str()))
        {
            return Err(Error::UnknownGuardReference { path: source_path, name });
        }

        let Some(name) = segment.evaluate(context, self.engine).map_err(process_error)? else {
            return Ok(None);
        };
        if !Path::new(&name).is_contained() {
            return Err(Error::ProcessError {
                source_path,
                e: format!("'{name}' would be written outside the destination"),
            });
        }
        Ok(Some(name))
    }

    fn strip_template_suffix(&self, destination: PathBuf) -> (PathBuf, RenderMode) {
        let stripped = destination
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(self.template_suffix))
            .filter(|name| !name.is_empty())
            .map(|name| destination.with_file_name(name));
        match stripped {
            Some(path) => (path, RenderMode::SubstituteAndCopy),
            None => (destination, RenderMode::VerbatimCopy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MiniJinjaRenderer;
    use crate::template::rule::PathRule;
    use serde_json::json;

    fn entry(relative: &str, is_dir: bool) -> SourceEntry {
        let relative = PathBuf::from(relative);
        SourceEntry {
            source: Path::new("/template").join(&relative),
            rule: PathRule::parse(&relative).unwrap(),
            relative,
            is_dir,
        }
    }

    fn answers(values: serde_json::Value) -> AnswerSet {
        let map = values.as_object().unwrap().clone().into_iter().collect();
        AnswerSet::from_values(map)
    }

    fn destinations(resolved: &[ResolvedPath]) -> Vec<String> {
        resolved.iter().map(|r| r.destination.to_slash_string()).collect()
    }

    fn docs_tree() -> Vec<SourceEntry> {
        vec![
            entry("README.md", false),
            entry("{% if include_docs %}docs{% endif %}", true),
            entry("{% if include_docs %}docs{% endif %}/guide.md", false),
        ]
    }

    #[test]
    fn guarded_directory_is_included_when_true() {
        let engine = MiniJinjaRenderer::new();
        let resolved = PathResolver::new(&engine, ".stencil.j2")
            .resolve(&docs_tree(), &answers(json!({"include_docs": true})))
            .unwrap();
        assert_eq!(destinations(&resolved), vec!["README.md", "docs", "docs/guide.md"]);
        assert_eq!(resolved[1].mode, RenderMode::Directory);
        assert_eq!(resolved[2].mode, RenderMode::VerbatimCopy);
    }

    #[test]
    fn guarded_directory_prunes_unguarded_descendants() {
        let engine = MiniJinjaRenderer::new();
        let resolved = PathResolver::new(&engine, ".stencil.j2")
            .resolve(&docs_tree(), &answers(json!({"include_docs": false})))
            .unwrap();
        assert_eq!(destinations(&resolved), vec!["README.md"]);
    }

    #[test]
    fn descendants_of_pruned_directory_are_not_evaluated() {
        let engine = MiniJinjaRenderer::new();
        let tree = vec![
            entry("{% if use_db %}db{% endif %}", true),
            // `db_name` is undefined when the feature is off; evaluating it would fail.
            entry("{% if use_db %}db{% endif %}/{{ db_name | upper }}.sql", false),
        ];
        let resolved = PathResolver::new(&engine, ".stencil.j2")
            .resolve(&tree, &answers(json!({"use_db": false, "db_name": null})))
            .unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn suffix_is_stripped_and_names_are_rendered() {
        let engine = MiniJinjaRenderer::new();
        let tree = vec![
            entry("{{ package_name }}", true),
            entry("{{ package_name }}/__init__.py.stencil.j2", false),
            entry("{{ package_name }}/.stencil.j2", false),
        ];
        let resolved = PathResolver::new(&engine, ".stencil.j2")
            .resolve(&tree, &answers(json!({"package_name": "my_app"})))
            .unwrap();
        assert_eq!(
            destinations(&resolved),
            vec!["my_app", "my_app/__init__.py", "my_app/.stencil.j2"]
        );
        assert_eq!(resolved[1].mode, RenderMode::SubstituteAndCopy);
        assert_eq!(resolved[2].mode, RenderMode::VerbatimCopy);
    }

    #[test]
    fn collision_is_fatal() {
        let engine = MiniJinjaRenderer::new();
        let tree = vec![entry("{{ name }}.txt", false), entry("fixed.txt", false)];
        let err = PathResolver::new(&engine, ".stencil.j2")
            .resolve(&tree, &answers(json!({"name": "fixed"})))
            .unwrap_err();
        match err {
            Error::PathCollision { destination, first, second } => {
                assert_eq!(destination, "fixed.txt");
                assert_eq!(first, "{{ name }}.txt");
                assert_eq!(second, "fixed.txt");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rendered_and_verbatim_file_with_same_destination_collide() {
        let engine = MiniJinjaRenderer::new();
        let tree = vec![entry("a.txt", false), entry("a.txt.stencil.j2", false)];
        assert!(matches!(
            PathResolver::new(&engine, ".stencil.j2").resolve(&tree, &AnswerSet::default()),
            Err(Error::PathCollision { .. })
        ));
    }

    #[test]
    fn unknown_reference_is_fatal() {
        let engine = MiniJinjaRenderer::new();
        let tree = vec![entry("{% if use_ci %}ci{% endif %}", true)];
        let err = PathResolver::new(&engine, ".stencil.j2")
            .resolve(&tree, &answers(json!({"include_docs": true})))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownGuardReference { ref name, .. } if name == "use_ci"));
    }

    #[test]
    fn escaping_name_is_rejected() {
        let engine = MiniJinjaRenderer::new();
        let tree = vec![entry("{{ target }}", false)];
        let err = PathResolver::new(&engine, ".stencil.j2")
            .resolve(&tree, &answers(json!({"target": "../outside"})))
            .unwrap_err();
        assert!(matches!(err, Error::ProcessError { .. }));
    }
}
