//! Parsed form of a template source path
//!
//! Each path component is parsed once into a [`Segment`]. A component written
//! entirely as `{% if EXPR %}NAME{% endif %}` carries EXPR as its guard and
//! NAME as its name; any other component is its own name. A name containing
//! `{{` or `{%` is rendered, everything else is used as is.

use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::renderer::TemplateRenderer;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

fn guard_pattern() -> Option<&'static Regex> {
    static GUARD: OnceLock<Option<Regex>> = OnceLock::new();
    GUARD
        .get_or_init(|| {
            Regex::new(r"^\{%-?\s*if\s+(?P<expr>.+?)\s*-?%\}(?P<body>.*)\{%-?\s*endif\s*-?%\}$")
                .map_err(|e| log::error!("Invalid guard pattern: {e}"))
                .ok()
        })
        .as_ref()
}

fn has_template_syntax(text: &str) -> bool {
    text.contains("{{") || text.contains("{%")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// The component exactly as it appears in the source tree.
    pub raw: String,
    /// Expression that must be true for the component to exist.
    pub guard: Option<String>,
    /// Name left once the guard is stripped.
    pub name: String,
    /// Whether `name` must be rendered.
    pub templated: bool,
}

impl Segment {
    pub fn parse(raw: &str) -> Self {
        if let Some(captures) = guard_pattern().and_then(|re| re.captures(raw)) {
            let body = &captures["body"];
            // `{% if %}a{% else %}b{% endif %}` is a template, not a guard.
            if !body.contains("{%") {
                return Self {
                    raw: raw.to_string(),
                    guard: Some(captures["expr"].trim().to_string()),
                    name: body.to_string(),
                    templated: has_template_syntax(body),
                };
            }
        }
        Self {
            raw: raw.to_string(),
            guard: None,
            name: raw.to_string(),
            templated: has_template_syntax(raw),
        }
    }

    /// Names the guard and the name read from the answers.
    pub fn references(&self, engine: &dyn TemplateRenderer) -> Result<HashSet<String>> {
        let mut names = match &self.guard {
            Some(guard) => engine.expression_variables(guard)?,
            None => HashSet::new(),
        };
        if self.templated {
            names.extend(engine.referenced_variables(&self.name)?);
        }
        Ok(names)
    }

    /// The destination name, or `None` when the component is excluded.
    ///
    /// A false guard excludes the component, and so does a name that renders empty.
    pub fn evaluate(
        &self,
        context: &serde_json::Value,
        engine: &dyn TemplateRenderer,
    ) -> Result<Option<String>> {
        if let Some(guard) = &self.guard {
            if !engine.execute_expression(guard, context)? {
                return Ok(None);
            }
        }
        let name = if self.templated {
            engine.render(&self.name, context, Some(self.raw.as_str()))?
        } else {
            self.name.clone()
        };
        if name.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(name))
    }
}

/// A source path as a list of parsed segments.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRule {
    segments: Vec<Segment>,
}

impl PathRule {
    /// Parses a path relative to the template root.
    pub fn parse(relative: &Path) -> Result<Self> {
        let segments = relative
            .components()
            .map(|component| match component {
                Component::Normal(part) => Ok(Segment::parse(Path::new(part).to_str_checked()?)),
                other => Err(Error::ProcessError {
                    source_path: relative.display().to_string(),
                    e: format!("unexpected path component {other:?}"),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Source path made of the first `len` segments.
    pub fn prefix(&self, len: usize) -> PathBuf {
        self.segments.iter().take(len).map(|s| s.raw.as_str()).collect()
    }
}
