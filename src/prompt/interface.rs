//! Pure interfaces for prompting without external dependencies
//!
//! These interfaces are independent of any specific UI library implementation.

use crate::error::Result;
use serde_json::Value;

/// Configuration for text input prompts
#[derive(Debug, Clone)]
pub struct TextPromptConfig {
    pub prompt: String,
    pub default: Option<String>,
    pub secret: Option<SecretConfig>,
}

/// Configuration for password/secret input
#[derive(Debug, Clone)]
pub struct SecretConfig {
    pub confirm: bool,
    pub mismatch_error: String,
}

/// Configuration for single choice selection
#[derive(Debug, Clone)]
pub struct SingleChoiceConfig {
    pub prompt: String,
    pub choices: Vec<String>,
    pub default_index: Option<usize>,
}

/// Configuration for multiple choice selection
#[derive(Debug, Clone)]
pub struct MultipleChoiceConfig {
    pub prompt: String,
    pub choices: Vec<String>,
    pub defaults: Vec<bool>,
}

/// Configuration for boolean confirmation
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    pub prompt: String,
    pub default: bool,
}

/// Configuration for structured data input (JSON/YAML)
#[derive(Debug, Clone)]
pub struct StructuredDataConfig {
    pub prompt: String,
    pub default_value: Value,
    pub is_yaml: bool,
    pub file_extension: String,
}

pub trait TextPrompter {
    fn prompt_text(&self, config: &TextPromptConfig) -> Result<String>;
}

pub trait SingleChoicePrompter {
    fn prompt_single_choice(&self, config: &SingleChoiceConfig) -> Result<usize>;
}

pub trait MultipleChoicePrompter {
    fn prompt_multiple_choice(&self, config: &MultipleChoiceConfig)
        -> Result<Vec<usize>>;
}

pub trait ConfirmationPrompter {
    fn prompt_confirmation(&self, config: &ConfirmationConfig) -> Result<bool>;
}

pub trait StructuredDataPrompter {
    fn prompt_structured_data(&self, config: &StructuredDataConfig) -> Result<Value>;
}

/// Shows the user why the value they just entered was not accepted.
pub trait RejectionReporter {
    fn report_rejection(&self, reason: &str);
}

/// Combined interface that provides all prompt types
pub trait PromptProvider:
    TextPrompter
    + SingleChoicePrompter
    + MultipleChoicePrompter
    + ConfirmationPrompter
    + StructuredDataPrompter
    + RejectionReporter
{
}

impl<T> PromptProvider for T where
    T: TextPrompter
        + SingleChoicePrompter
        + MultipleChoicePrompter
        + ConfirmationPrompter
        + StructuredDataPrompter
        + RejectionReporter
{
}
