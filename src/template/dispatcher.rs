//! Render/copy dispatcher
//!
//! Materializes resolved paths in two phases. `plan` reads and renders every
//! file and decides what each destination needs without writing anything, so
//! render errors surface before the first write. `apply` carries the plan out.

use crate::answers::AnswerSet;
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::ioutils::{atomic_write, create_dir_all, sha256_hex};
use crate::metadata::Manifest;
use crate::renderer::TemplateRenderer;
use crate::template::operation::{ConflictPolicy, FileAction, TemplateOperation};
use crate::template::resolver::{RenderMode, ResolvedPath};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub enum GenerationMode {
    /// First generation: existing files are overwritten.
    #[default]
    Generate,
    /// Re-generation over a destination rendered before.
    Update { previous: Manifest, conflict_policy: ConflictPolicy },
}

/// Outcome of planning, and of applying, one render.
#[derive(Debug)]
pub struct RenderReport {
    pub operations: Vec<TemplateOperation>,
    /// Destination paths whose local edits clash with the new render.
    pub conflicts: Vec<String>,
    /// Files recorded by the previous render that this render no longer produces.
    pub stale: Vec<String>,
    pub manifest: Manifest,
}

impl RenderReport {
    pub fn written(&self) -> usize {
        self.operations.iter().filter(|op| op.action().is_some_and(|a| a.writes())).count()
    }
}

pub struct Dispatcher<'a> {
    engine: &'a dyn TemplateRenderer,
    output_root: &'a Path,
    mode: GenerationMode,
    dry_run: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(engine: &'a dyn TemplateRenderer, output_root: &'a Path, mode: GenerationMode) -> Self {
        Self { engine, output_root, mode, dry_run: false }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Plans then applies the render.
    pub fn dispatch(&self, resolved: &[ResolvedPath], answers: &AnswerSet) -> Result<RenderReport> {
        let report = self.plan(resolved, answers)?;
        self.apply(&report)?;
        Ok(report)
    }

    /// Renders every file in memory and decides what each destination needs.
    pub fn plan(&self, resolved: &[ResolvedPath], answers: &AnswerSet) -> Result<RenderReport> {
        let context = answers.to_context();
        let mut operations = Vec::with_capacity(resolved.len());
        let mut conflicts = Vec::new();
        let mut files = BTreeMap::new();

        for path in resolved {
            let target = self.output_root.join(&path.destination);
            let key = path.destination.to_slash_string();

            let operation = match path.mode {
                RenderMode::Directory => {
                    TemplateOperation::CreateDirectory { target_exists: target.is_dir(), target }
                }
                RenderMode::VerbatimCopy => {
                    let content = fs::read(&path.source)?;
                    let digest = sha256_hex(&content);
                    let action = self.file_action(&key, &target, &digest)?;
                    if let Some(recorded) = self.recorded_digest(&key, &action, digest) {
                        files.insert(key.clone(), recorded);
                    }
                    TemplateOperation::Copy { source: path.source.clone(), target, content, action }
                }
                RenderMode::SubstituteAndCopy => {
                    let content = self.render_file(path, &context)?;
                    let digest = sha256_hex(content.as_bytes());
                    let action = self.file_action(&key, &target, &digest)?;
                    if let Some(recorded) = self.recorded_digest(&key, &action, digest) {
                        files.insert(key.clone(), recorded);
                    }
                    TemplateOperation::Write { source: path.source.clone(), target, content, action }
                }
            };

            if let Some(FileAction::Conflict { .. }) = operation.action() {
                conflicts.push(key);
            }
            operations.push(operation);
        }

        let stale = match &self.mode {
            GenerationMode::Generate => Vec::new(),
            GenerationMode::Update { previous, .. } => previous
                .files
                .keys()
                .filter(|key| !files.contains_key(*key))
                .cloned()
                .collect(),
        };

        Ok(RenderReport { operations, conflicts, stale, manifest: Manifest::new(files) })
    }

    /// Carries out a plan. Nothing is touched in dry-run mode.
    pub fn apply(&self, report: &RenderReport) -> Result<()> {
        if !self.dry_run {
            create_dir_all(self.output_root)?;
        }

        for operation in &report.operations {
            log::info!("{}", operation.get_message(self.dry_run));
            if self.dry_run {
                continue;
            }
            self.apply_operation(operation).map_err(|e| Error::ProcessError {
                source_path: operation.error_context(),
                e: e.to_string(),
            })?;
        }

        for conflict in &report.conflicts {
            log::warn!("Conflict: '{conflict}' was edited locally and changed in the template");
        }
        for stale in &report.stale {
            log::warn!("'{stale}' is no longer generated by the template; it was left in place");
        }
        Ok(())
    }

    fn apply_operation(&self, operation: &TemplateOperation) -> Result<()> {
        match operation {
            TemplateOperation::CreateDirectory { target, target_exists } => {
                if !target_exists {
                    create_dir_all(target)?;
                }
            }
            TemplateOperation::Copy { source, target, content, action } => {
                if action.writes() {
                    atomic_write(content, target, Some(fs::metadata(source)?.permissions()))?;
                }
            }
            TemplateOperation::Write { source, target, content, action } => {
                if action.writes() {
                    atomic_write(
                        content.as_bytes(),
                        target,
                        Some(fs::metadata(source)?.permissions()),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn render_file(&self, path: &ResolvedPath, context: &serde_json::Value) -> Result<String> {
        let name = path.relative_source.to_slash_string();
        let template = fs::read_to_string(&path.source).map_err(|e| Error::ProcessError {
            source_path: name.clone(),
            e: format!("templated files must be UTF-8 text: {e}"),
        })?;

        self.engine.render(&template, context, Some(&name)).map_err(|e| match e {
            Error::MinijinjaError(inner) if inner.kind() == minijinja::ErrorKind::UndefinedError => {
                let binding = self.engine.missing_binding(&template, context).unwrap_or_else(|| {
                    inner.detail().map(str::to_string).unwrap_or_else(|| inner.to_string())
                });
                Error::RenderError { path: name.clone(), binding }
            }
            other => Error::ProcessError { source_path: name.clone(), e: other.to_string() },
        })
    }

    /// Digest stored in the new manifest: what is actually on disk from a
    /// render. A kept conflict keeps the previous record so it is raised again.
    fn recorded_digest(&self, key: &str, action: &FileAction, digest: String) -> Option<String> {
        match (&self.mode, action) {
            (
                GenerationMode::Update { previous, .. },
                FileAction::Conflict { policy: ConflictPolicy::Keep },
            ) => previous.digest(key).map(str::to_string),
            _ => Some(digest),
        }
    }

    fn file_action(&self, key: &str, target: &Path, digest: &str) -> Result<FileAction> {
        let existing = existing_digest(target)?;
        let action = match &self.mode {
            GenerationMode::Generate => match existing {
                None => FileAction::Create,
                Some(current) if current == digest => FileAction::Unchanged,
                Some(_) => FileAction::Overwrite,
            },
            GenerationMode::Update { previous, conflict_policy } => {
                let recorded = previous.digest(key);
                match existing {
                    _ if recorded == Some(digest) => FileAction::Unchanged,
                    None => FileAction::Create,
                    Some(current) if Some(current.as_str()) == recorded => FileAction::Overwrite,
                    Some(current) if current == digest => FileAction::Unchanged,
                    Some(_) => FileAction::Conflict { policy: *conflict_policy },
                }
            }
        };
        Ok(action)
    }
}

fn existing_digest(target: &Path) -> Result<Option<String>> {
    if !target.is_file() {
        return Ok(None);
    }
    Ok(Some(sha256_hex(&fs::read(target)?)))
}
