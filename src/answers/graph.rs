//! Evaluation order of questions
//!
//! A question depends on every other question its string `default` or its
//! `ask_if` reads. The order is the declaration order, moved only as far as
//! needed so that each question comes after everything it depends on.

use crate::config::Question;
use crate::constants::BUILTIN_NAMES;
use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;
use indexmap::{IndexMap, IndexSet};

/// Names of the other questions `name` reads, in declaration order.
pub fn question_dependencies(
    name: &str,
    question: &Question,
    questions: &IndexMap<String, Question>,
    engine: &dyn TemplateRenderer,
) -> Result<Vec<String>> {
    let schema_error = |reason: String| Error::SchemaError { question: name.to_string(), reason };

    let mut referenced = engine
        .expression_variables(&question.ask_if)
        .map_err(|e| schema_error(format!("invalid ask_if '{}': {e}", question.ask_if)))?;
    if let Some(default) = question.default_template() {
        let names = engine
            .referenced_variables(default)
            .map_err(|e| schema_error(format!("invalid default '{default}': {e}")))?;
        referenced.extend(names);
    }

    let mut unknown: Vec<&String> = referenced
        .iter()
        .filter(|r| !questions.contains_key(*r) && !BUILTIN_NAMES.contains(&r.as_str()))
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(schema_error(format!(
            "references unknown name '{}'",
            unknown.iter().map(|u| u.as_str()).collect::<Vec<_>>().join("', '")
        )));
    }

    Ok(questions.keys().filter(|key| referenced.contains(*key)).cloned().collect())
}

/// Returns the question names in the order they must be resolved.
///
/// Fails before anything is asked if a reference is unknown or the
/// references form a cycle.
pub fn resolution_order(
    questions: &IndexMap<String, Question>,
    engine: &dyn TemplateRenderer,
) -> Result<Vec<String>> {
    let mut dependencies: IndexMap<&str, Vec<String>> = IndexMap::new();
    for (name, question) in questions {
        let deps = question_dependencies(name, question, questions, engine)?;
        log::trace!("Question '{name}' depends on {deps:?}");
        dependencies.insert(name.as_str(), deps);
    }

    let mut resolved: IndexSet<&str> = IndexSet::with_capacity(questions.len());
    while resolved.len() < dependencies.len() {
        let ready = dependencies.iter().find(|(name, deps)| {
            !resolved.contains(*name) && deps.iter().all(|d| resolved.contains(d.as_str()))
        });
        match ready {
            Some((name, _)) => {
                resolved.insert(*name);
            }
            None => {
                let pending: Vec<&str> = dependencies
                    .keys()
                    .filter(|name| !resolved.contains(*name))
                    .copied()
                    .collect();
                return Err(Error::DependencyCycle { questions: pending.join(", ") });
            }
        }
    }

    Ok(resolved.into_iter().map(str::to_string).collect())
}
