//! Terminal prompts backed by the dialoguer library

use super::interface::{
    ConfirmationConfig, ConfirmationPrompter, MultipleChoiceConfig,
    MultipleChoicePrompter, RejectionReporter, SecretConfig, SingleChoiceConfig,
    SingleChoicePrompter, StructuredDataConfig, StructuredDataPrompter,
    TextPromptConfig, TextPrompter,
};
use crate::{error::Result, prompt::parser::DataParser};
use dialoguer::{Confirm, Editor, FuzzySelect, Input, MultiSelect, Password, Select};
use serde_json::Value;

/// Choices lists longer than this get a fuzzy-searchable selector.
const FUZZY_THRESHOLD: usize = 10;

pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPrompter for DialoguerPrompter {
    fn prompt_text(&self, config: &TextPromptConfig) -> Result<String> {
        if let Some(secret_config) = &config.secret {
            self.prompt_password(&config.prompt, secret_config)
        } else {
            self.prompt_regular_text(&config.prompt, config.default.as_deref())
        }
    }
}

impl SingleChoicePrompter for DialoguerPrompter {
    fn prompt_single_choice(&self, config: &SingleChoiceConfig) -> Result<usize> {
        let default_index = config.default_index.unwrap_or(0);
        if config.choices.len() > FUZZY_THRESHOLD {
            return Ok(FuzzySelect::new()
                .with_prompt(&config.prompt)
                .items(&config.choices)
                .default(default_index)
                .interact()?);
        }

        Ok(Select::new()
            .with_prompt(&config.prompt)
            .items(&config.choices)
            .default(default_index)
            .interact()?)
    }
}

impl MultipleChoicePrompter for DialoguerPrompter {
    fn prompt_multiple_choice(
        &self,
        config: &MultipleChoiceConfig,
    ) -> Result<Vec<usize>> {
        Ok(MultiSelect::new()
            .with_prompt(&config.prompt)
            .items(&config.choices)
            .defaults(&config.defaults)
            .interact()?)
    }
}

impl ConfirmationPrompter for DialoguerPrompter {
    fn prompt_confirmation(&self, config: &ConfirmationConfig) -> Result<bool> {
        Ok(Confirm::new().with_prompt(&config.prompt).default(config.default).interact()?)
    }
}

impl StructuredDataPrompter for DialoguerPrompter {
    fn prompt_structured_data(&self, config: &StructuredDataConfig) -> Result<Value> {
        let default_content =
            DataParser::serialize_structured_data(&config.default_value, config.is_yaml)?;

        let options = ["Enter in terminal", "Open editor"];
        let selection = Select::new()
            .with_prompt(&config.prompt)
            .items(&options)
            .default(0)
            .interact()?;

        // Malformed input is not an answer; ask again until it parses.
        loop {
            let content = if selection == 0 {
                self.prompt_terminal_input(&default_content)?
            } else {
                self.prompt_editor_input(&default_content, &config.file_extension)?
            };
            match DataParser::parse_structured_content(&content, config.is_yaml) {
                Ok(value) => return Ok(value),
                Err(err) => self.report_rejection(&err.to_string()),
            }
        }
    }
}

impl RejectionReporter for DialoguerPrompter {
    fn report_rejection(&self, reason: &str) {
        eprintln!("{reason}");
    }
}

impl DialoguerPrompter {
    fn prompt_password(
        &self,
        prompt: &str,
        secret_config: &SecretConfig,
    ) -> Result<String> {
        let mut password = Password::new().with_prompt(prompt).allow_empty_password(true);

        if secret_config.confirm {
            password = password.with_confirmation(
                format!("{prompt} (confirm)"),
                secret_config.mismatch_error.clone(),
            );
        }

        Ok(password.interact()?)
    }

    fn prompt_regular_text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn prompt_terminal_input(&self, default_content: &str) -> Result<String> {
        Ok(Input::<String>::new()
            .with_prompt("Enter content")
            .default(default_content.to_string())
            .interact_text()?)
    }

    fn prompt_editor_input(
        &self,
        default_content: &str,
        file_extension: &str,
    ) -> Result<String> {
        Ok(Editor::new()
            .extension(file_extension)
            .edit(default_content)?
            .unwrap_or_else(|| default_content.to_string()))
    }
}
