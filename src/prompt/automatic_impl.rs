//! Prompt provider that answers from a script instead of a terminal
//!
//! Responses are keyed by prompt text and consumed in order, so a test can
//! script an invalid answer followed by a valid one and observe the re-prompt.

use super::interface::*;
use crate::error::{Error, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Default)]
pub struct AutomaticPrompter {
    text_responses: RefCell<HashMap<String, VecDeque<String>>>,
    choice_responses: RefCell<HashMap<String, VecDeque<usize>>>,
    multiple_choice_responses: RefCell<HashMap<String, VecDeque<Vec<usize>>>>,
    confirmation_responses: RefCell<HashMap<String, VecDeque<bool>>>,
    structured_data_responses: RefCell<HashMap<String, VecDeque<Value>>>,
    rejections: RefCell<Vec<String>>,
    asked: RefCell<Vec<String>>,
}

fn next<T>(queue: &RefCell<HashMap<String, VecDeque<T>>>, prompt: &str) -> Option<T> {
    queue.borrow_mut().get_mut(prompt).and_then(VecDeque::pop_front)
}

fn push<T>(queue: &RefCell<HashMap<String, VecDeque<T>>>, prompt: &str, value: T) {
    queue.borrow_mut().entry(prompt.to_string()).or_default().push_back(value);
}

impl AutomaticPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_response(self, prompt: &str, response: &str) -> Self {
        push(&self.text_responses, prompt, response.to_string());
        self
    }

    pub fn with_choice_response(self, prompt: &str, choice_index: usize) -> Self {
        push(&self.choice_responses, prompt, choice_index);
        self
    }

    pub fn with_multiple_choice_response(self, prompt: &str, indices: Vec<usize>) -> Self {
        push(&self.multiple_choice_responses, prompt, indices);
        self
    }

    pub fn with_confirmation_response(self, prompt: &str, response: bool) -> Self {
        push(&self.confirmation_responses, prompt, response);
        self
    }

    pub fn with_structured_data_response(self, prompt: &str, response: Value) -> Self {
        push(&self.structured_data_responses, prompt, response);
        self
    }

    /// Rejection reasons reported so far, oldest first.
    pub fn rejections(&self) -> Vec<String> {
        self.rejections.borrow().clone()
    }

    /// Prompts presented so far, oldest first.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn record(&self, prompt: &str) {
        self.asked.borrow_mut().push(prompt.to_string());
    }
}

impl TextPrompter for AutomaticPrompter {
    fn prompt_text(&self, config: &TextPromptConfig) -> Result<String> {
        self.record(&config.prompt);
        let response = next(&self.text_responses, &config.prompt)
            .or_else(|| config.default.clone())
            .unwrap_or_default();
        log::debug!("Auto-answering text prompt '{}' with '{}'", config.prompt, response);
        Ok(response)
    }
}

impl SingleChoicePrompter for AutomaticPrompter {
    fn prompt_single_choice(&self, config: &SingleChoiceConfig) -> Result<usize> {
        self.record(&config.prompt);
        let response = next(&self.choice_responses, &config.prompt)
            .or(config.default_index)
            .unwrap_or(0);
        if response >= config.choices.len() {
            return Err(Error::Other(anyhow::anyhow!(
                "scripted choice {response} is out of range for '{}'",
                config.prompt
            )));
        }
        log::debug!("Auto-answering choice prompt '{}' with option {response}", config.prompt);
        Ok(response)
    }
}

impl MultipleChoicePrompter for AutomaticPrompter {
    fn prompt_multiple_choice(
        &self,
        config: &MultipleChoiceConfig,
    ) -> Result<Vec<usize>> {
        self.record(&config.prompt);
        let response = next(&self.multiple_choice_responses, &config.prompt).unwrap_or_else(|| {
            config
                .defaults
                .iter()
                .enumerate()
                .filter_map(|(i, &selected)| selected.then_some(i))
                .collect()
        });
        log::debug!("Auto-answering multiple choice prompt '{}' with {response:?}", config.prompt);
        Ok(response)
    }
}

impl ConfirmationPrompter for AutomaticPrompter {
    fn prompt_confirmation(&self, config: &ConfirmationConfig) -> Result<bool> {
        self.record(&config.prompt);
        let response =
            next(&self.confirmation_responses, &config.prompt).unwrap_or(config.default);
        log::debug!("Auto-answering confirmation '{}' with {response}", config.prompt);
        Ok(response)
    }
}

impl StructuredDataPrompter for AutomaticPrompter {
    fn prompt_structured_data(&self, config: &StructuredDataConfig) -> Result<Value> {
        self.record(&config.prompt);
        Ok(next(&self.structured_data_responses, &config.prompt)
            .unwrap_or_else(|| config.default_value.clone()))
    }
}

impl RejectionReporter for AutomaticPrompter {
    fn report_rejection(&self, reason: &str) {
        self.rejections.borrow_mut().push(reason.to_string());
    }
}
