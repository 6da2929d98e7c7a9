//! Question configuration and rendering logic

use crate::config::types::{
    get_default_validation, parse_bool, QuestionType, Secret, Type, Validation,
};
use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;
use serde::Deserialize;

/// Represents a single question in the configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    /// Help text/prompt to display to the user
    #[serde(default)]
    pub help: String,
    /// Type of the question
    #[serde(rename = "type")]
    pub r#type: Type,
    /// Literal default, or a template string rendered against earlier answers
    #[serde(default)]
    pub default: serde_json::Value,
    /// Available choices for string questions
    #[serde(default)]
    pub choices: Vec<String>,
    /// Whether several choices may be selected
    #[serde(default)]
    pub multiselect: bool,
    /// Whether the string is a secret
    #[serde(default)]
    pub secret: Option<Secret>,
    /// Expression deciding whether the question is asked at all
    #[serde(default, alias = "when")]
    pub ask_if: String,
    /// JSON Schema for validation (for Json and Yaml types)
    #[serde(default)]
    pub schema: Option<serde_json::Value>,
    #[serde(default = "get_default_validation")]
    pub validation: Validation,
}

#[derive(Debug)]
pub struct QuestionRendered {
    pub ask_if: bool,
    pub default: serde_json::Value,
    pub help: String,
    pub r#type: QuestionType,
}

pub trait IntoQuestionType {
    #[allow(clippy::wrong_self_convention)]
    fn into_question_type(&self) -> QuestionType;
}

impl IntoQuestionType for Question {
    fn into_question_type(&self) -> QuestionType {
        match (&self.r#type, self.choices.is_empty()) {
            (Type::Str, false) => {
                if self.multiselect {
                    QuestionType::MultipleChoice
                } else {
                    QuestionType::SingleChoice
                }
            }
            (Type::Str, true) => QuestionType::Text,
            (Type::Bool, _) => QuestionType::Boolean,
            (Type::Json, _) => QuestionType::Json,
            (Type::Yaml, _) => QuestionType::Yaml,
        }
    }
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.into_question_type()
    }

    pub fn is_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// The default as a template string, when it is one.
    ///
    /// Only string defaults are rendered, so only they can depend on other answers.
    pub fn default_template(&self) -> Option<&str> {
        self.default.as_str()
    }

    /// Evaluates `ask_if` against the answers resolved so far.
    pub fn evaluate_condition(
        &self,
        name: &str,
        answers: &serde_json::Value,
        engine: &dyn TemplateRenderer,
    ) -> Result<bool> {
        engine.execute_expression(&self.ask_if, answers).map_err(|e| {
            Error::SchemaError {
                question: name.to_string(),
                reason: format!("cannot evaluate ask_if '{}': {e}", self.ask_if),
            }
        })
    }

    /// Computes the static default against the answers resolved so far.
    pub fn render_default_value(
        &self,
        name: &str,
        answers: &serde_json::Value,
        engine: &dyn TemplateRenderer,
    ) -> Result<serde_json::Value> {
        let question_type = self.question_type();
        let default = self.default.clone();
        let rendered = match (&question_type, default) {
            (QuestionType::MultipleChoice, serde_json::Value::Null) => {
                serde_json::json!([])
            }
            (QuestionType::MultipleChoice, default) => default,
            (QuestionType::Boolean, serde_json::Value::String(text)) => {
                let text = self.render_text(name, &text, answers, engine)?;
                let flag = parse_bool(&text).ok_or_else(|| Error::SchemaError {
                    question: name.to_string(),
                    reason: format!("default '{text}' is not a boolean"),
                })?;
                serde_json::Value::Bool(flag)
            }
            (QuestionType::Boolean, default) => {
                serde_json::Value::Bool(default.as_bool().unwrap_or(false))
            }
            (QuestionType::SingleChoice, serde_json::Value::Null) => self
                .choices
                .first()
                .map(|choice| serde_json::Value::String(choice.clone()))
                .unwrap_or(serde_json::Value::Null),
            (QuestionType::SingleChoice | QuestionType::Text, default) => {
                match default {
                    serde_json::Value::String(text) => serde_json::Value::String(
                        self.render_text(name, &text, answers, engine)?,
                    ),
                    serde_json::Value::Null => serde_json::Value::String(String::new()),
                    other => serde_json::Value::String(other.to_string()),
                }
            }
            (QuestionType::Json | QuestionType::Yaml, default) => {
                self.render_structured_default(name, default, answers, engine, &question_type)?
            }
        };
        Ok(rendered)
    }

    fn render_text(
        &self,
        name: &str,
        text: &str,
        answers: &serde_json::Value,
        engine: &dyn TemplateRenderer,
    ) -> Result<String> {
        engine.render(text, answers, Some("default_value")).map_err(|e| Error::SchemaError {
            question: name.to_string(),
            reason: format!("cannot render default '{text}': {e}"),
        })
    }

    fn render_structured_default(
        &self,
        name: &str,
        default: serde_json::Value,
        answers: &serde_json::Value,
        engine: &dyn TemplateRenderer,
        question_type: &QuestionType,
    ) -> Result<serde_json::Value> {
        if default.is_object() || default.is_array() {
            return Ok(default);
        }

        if let Some(default_str) = default.as_str() {
            let rendered_str = self.render_text(name, default_str, answers, engine)?;
            let parsed = match question_type {
                QuestionType::Json => serde_json::from_str(&rendered_str).ok(),
                _ => serde_yaml::from_str(&rendered_str).ok(),
            };
            return Ok(parsed.unwrap_or_else(|| {
                log::warn!("Default for '{name}' is not valid structured data, using {{}}");
                serde_json::json!({})
            }));
        }

        Ok(serde_json::json!({}))
    }

    fn render_help_text(
        &self,
        answers: &serde_json::Value,
        engine: &dyn TemplateRenderer,
    ) -> String {
        engine.render(&self.help, answers, Some("help")).unwrap_or(self.help.clone())
    }

    pub fn render(
        &self,
        name: &str,
        answers: &serde_json::Value,
        engine: &dyn TemplateRenderer,
    ) -> Result<QuestionRendered> {
        let ask_if = self.evaluate_condition(name, answers, engine)?;
        let default = self.render_default_value(name, answers, engine)?;
        let help = self.render_help_text(answers, engine);

        Ok(QuestionRendered { default, ask_if, help, r#type: self.question_type() })
    }
}
