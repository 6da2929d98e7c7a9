use crate::answers::graph::resolution_order;
use crate::answers::overrides::Overrides;
use crate::answers::validation::{validate_answer, ValidationError};
use crate::answers::AnswerSet;
use crate::config::Question;
use crate::error::{Error, Result};
use crate::prompt::{PromptContext, Prompter};
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use serde_json::Value;

/// Resolves every question of a schema into an `AnswerSet`.
///
/// Without a prompter every question that would be asked takes its default
/// instead, and a rejected default is fatal.
pub struct AnswerResolver<'a> {
    engine: &'a dyn TemplateRenderer,
    prompter: Option<&'a dyn Prompter>,
}

impl<'a> AnswerResolver<'a> {
    pub fn new(engine: &'a dyn TemplateRenderer) -> Self {
        Self { engine, prompter: None }
    }

    pub fn interactive(engine: &'a dyn TemplateRenderer, prompter: &'a dyn Prompter) -> Self {
        Self { engine, prompter: Some(prompter) }
    }

    pub fn resolve(
        &self,
        questions: &IndexMap<String, Question>,
        prior: Option<&AnswerSet>,
        overrides: &Overrides,
    ) -> Result<AnswerSet> {
        let order = resolution_order(questions, self.engine)?;
        let mut resolved = serde_json::Map::new();

        for name in &order {
            let Some(question) = questions.get(name) else { continue };
            let context = Value::Object(resolved.clone());
            let value = self.resolve_one(name, question, &context, prior, overrides)?;
            resolved.insert(name.clone(), value);
        }

        let values = questions
            .keys()
            .filter_map(|name| resolved.remove(name).map(|value| (name.clone(), value)))
            .collect();
        Ok(AnswerSet::from_values(values))
    }

    fn resolve_one(
        &self,
        name: &str,
        question: &Question,
        context: &Value,
        prior: Option<&AnswerSet>,
        overrides: &Overrides,
    ) -> Result<Value> {
        if let Some(value) = overrides.get(name) {
            log::debug!("Using supplied value for '{name}'");
            return match validate_answer(name, question, value, self.engine, context) {
                Ok(()) => Ok(value.clone()),
                Err(err) if err.is_failure() => Err(validator_failed(name, err)),
                Err(err) => Err(Error::OverrideRejected {
                    question: name.to_string(),
                    reason: err.to_string(),
                }),
            };
        }

        let rendered = question.render(name, context, self.engine)?;
        if !rendered.ask_if {
            log::debug!("Skipping '{name}': condition '{}' is false", question.ask_if);
            return Ok(rendered.default);
        }

        let default = prior
            .and_then(|answers| answers.get(name))
            .filter(|_| !question.is_secret())
            .cloned()
            .unwrap_or(rendered.default);

        let Some(prompter) = self.prompter else {
            return match validate_answer(name, question, &default, self.engine, context) {
                Ok(()) => {
                    log::debug!("Accepting default for '{name}'");
                    Ok(default)
                }
                Err(err) if err.is_failure() => Err(validator_failed(name, err)),
                Err(err) => Err(Error::ValidationError {
                    question: name.to_string(),
                    reason: err.to_string(),
                }),
            };
        };

        let prompt_context = PromptContext::new(question, &default, &rendered.help);
        loop {
            let candidate = prompter.prompt(&prompt_context)?;
            match validate_answer(name, question, &candidate, self.engine, context) {
                Ok(()) => return Ok(candidate),
                Err(err) if err.is_failure() => return Err(validator_failed(name, err)),
                Err(err) => {
                    log::debug!("Answer for '{name}' rejected: {err}");
                    prompter.report_rejection(&err.to_string());
                }
            }
        }
    }
}

fn validator_failed(name: &str, err: ValidationError) -> Error {
    Error::ValidatorFailed { question: name.to_string(), reason: err.to_string() }
}
