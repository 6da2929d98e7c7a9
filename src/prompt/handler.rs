//! Turns a question into the matching prompt and its answer back into a value

use super::interface::{
    ConfirmationConfig, MultipleChoiceConfig, PromptProvider, SecretConfig,
    SingleChoiceConfig, StructuredDataConfig, TextPromptConfig,
};
use crate::{
    config::{IntoQuestionType, QuestionType},
    error::{Error, Result},
    prompt::{PromptContext, Prompter},
};
use serde_json::Value;

/// Creates and executes prompts based on context configuration
pub struct PromptHandler<P: PromptProvider> {
    provider: P,
}

impl<P: PromptProvider> PromptHandler<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Creates and executes a prompt based on the provided context
    pub fn create_prompt(&self, prompt_context: &PromptContext) -> Result<Value> {
        match prompt_context.question.into_question_type() {
            QuestionType::Text => self.prompt_text(prompt_context),
            QuestionType::SingleChoice => self.prompt_single_choice(prompt_context),
            QuestionType::MultipleChoice => self.prompt_multiple_choice(prompt_context),
            QuestionType::Boolean => self.prompt_confirmation(prompt_context),
            QuestionType::Json => self.prompt_structured_data(prompt_context, false),
            QuestionType::Yaml => self.prompt_structured_data(prompt_context, true),
        }
    }

    fn prompt_text(&self, prompt_context: &PromptContext) -> Result<Value> {
        let config = self.create_text_config(prompt_context);
        Ok(Value::String(self.provider.prompt_text(&config)?))
    }

    fn prompt_single_choice(&self, prompt_context: &PromptContext) -> Result<Value> {
        let config = self.create_single_choice_config(prompt_context);
        let index = self.provider.prompt_single_choice(&config)?;
        Ok(Value::String(choice_at(&config.choices, index)?))
    }

    fn prompt_multiple_choice(&self, prompt_context: &PromptContext) -> Result<Value> {
        let config = self.create_multiple_choice_config(prompt_context);
        let indices = self.provider.prompt_multiple_choice(&config)?;
        let selected = indices
            .into_iter()
            .map(|i| choice_at(&config.choices, i).map(Value::String))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(selected))
    }

    fn prompt_confirmation(&self, prompt_context: &PromptContext) -> Result<Value> {
        let config = ConfirmationConfig {
            prompt: prompt_context.help.to_string(),
            default: prompt_context.default.as_bool().unwrap_or(false),
        };
        Ok(Value::Bool(self.provider.prompt_confirmation(&config)?))
    }

    fn prompt_structured_data(
        &self,
        prompt_context: &PromptContext,
        is_yaml: bool,
    ) -> Result<Value> {
        let config = StructuredDataConfig {
            prompt: prompt_context.help.to_string(),
            default_value: prompt_context.default.clone(),
            is_yaml,
            file_extension: if is_yaml { ".yaml" } else { ".json" }.to_string(),
        };
        self.provider.prompt_structured_data(&config)
    }

    fn create_text_config(&self, prompt_context: &PromptContext) -> TextPromptConfig {
        let default = match prompt_context.default {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        let secret = prompt_context.question.secret.as_ref().map(|s| SecretConfig {
            confirm: s.confirm,
            mismatch_error: s.mismatch_err.clone(),
        });

        TextPromptConfig {
            prompt: prompt_context.help.to_string(),
            // A secret's default is never echoed back.
            default: if default.is_empty() || secret.is_some() { None } else { Some(default) },
            secret,
        }
    }

    fn create_single_choice_config(
        &self,
        prompt_context: &PromptContext,
    ) -> SingleChoiceConfig {
        let choices = &prompt_context.question.choices;
        let default_index = prompt_context
            .default
            .as_str()
            .and_then(|default| choices.iter().position(|choice| choice == default));

        SingleChoiceConfig {
            prompt: prompt_context.help.to_string(),
            choices: choices.clone(),
            default_index,
        }
    }

    fn create_multiple_choice_config(
        &self,
        prompt_context: &PromptContext,
    ) -> MultipleChoiceConfig {
        let selected: Vec<&str> = prompt_context
            .default
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let choices = &prompt_context.question.choices;

        MultipleChoiceConfig {
            prompt: prompt_context.help.to_string(),
            choices: choices.clone(),
            defaults: choices.iter().map(|choice| selected.contains(&choice.as_str())).collect(),
        }
    }
}

fn choice_at(choices: &[String], index: usize) -> Result<String> {
    choices.get(index).cloned().ok_or_else(|| {
        Error::Other(anyhow::anyhow!("selection {index} is not one of {} choices", choices.len()))
    })
}

impl<P: PromptProvider> Prompter for PromptHandler<P> {
    fn prompt(&self, context: &PromptContext) -> Result<Value> {
        self.create_prompt(context)
    }

    fn report_rejection(&self, reason: &str) {
        self.provider.report_rejection(reason);
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        self.provider
            .prompt_confirmation(&ConfirmationConfig { prompt: prompt.to_string(), default })
    }
}
