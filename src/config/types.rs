//! Basic types and enums for configuration

use crate::constants::validation;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Type of question to be presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// String input question type
    Str,
    /// Boolean (yes/no) question type
    Bool,
    /// JSON structured input type
    Json,
    /// YAML structured input type
    Yaml,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Secret {
    /// Whether the secret should have confirmation
    #[serde(default)]
    pub confirm: bool,
    #[serde(default = "get_default_mismatch_error", alias = "mistmatch_err")]
    pub mismatch_err: String,
}

/// Named validation rules usable without writing an expression.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedRule {
    /// Rejects empty or whitespace-only text.
    NotEmpty,
    /// Letters, digits and underscores, not starting with a digit.
    Identifier,
    /// Lowercase letters, digits and single dashes.
    Slug,
    /// `MAJOR.MINOR.PATCH` with optional pre-release and build metadata.
    Semver,
    /// A plausible e-mail address.
    Email,
}

impl NamedRule {
    fn pattern(&self) -> &'static str {
        match self {
            NamedRule::NotEmpty => r"\S",
            NamedRule::Identifier => r"^[A-Za-z_][A-Za-z0-9_]*$",
            NamedRule::Slug => r"^[a-z0-9]+(-[a-z0-9]+)*$",
            NamedRule::Semver => {
                r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(-[0-9A-Za-z.-]+)?(\+[0-9A-Za-z.-]+)?$"
            }
            NamedRule::Email => r"^[^@\s]+@[^@\s]+\.[^@\s]+$",
        }
    }

    /// Human-readable reason used when the rule rejects a value.
    pub fn describe(&self) -> &'static str {
        match self {
            NamedRule::NotEmpty => "value must not be empty",
            NamedRule::Identifier => {
                "value must contain only letters, digits and underscores and not start with a digit"
            }
            NamedRule::Slug => "value must be lowercase words separated by single dashes",
            NamedRule::Semver => "value must be a semantic version such as 1.2.3",
            NamedRule::Email => "value must be an e-mail address",
        }
    }

    /// Checks a textual candidate against the rule.
    pub fn check(&self, candidate: &str) -> bool {
        match Regex::new(self.pattern()) {
            Ok(re) => re.is_match(candidate),
            Err(err) => {
                log::warn!("Invalid pattern for rule {self:?}: {err}");
                false
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Validation {
    #[serde(default = "get_default_condition")]
    pub condition: String,
    #[serde(default = "get_default_error_message")]
    pub error_message: String,
    #[serde(default)]
    pub rule: Option<NamedRule>,
}

/// A post-generation command.
///
/// A plain string is handed to the configured hook runner; a list is
/// executed directly with the first element as the program.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum HookCommand {
    Shell(String),
    Argv(Vec<String>),
}

#[derive(Debug, PartialEq)]
pub enum QuestionType {
    MultipleChoice,
    SingleChoice,
    Text,
    Boolean,
    Json,
    Yaml,
}

fn get_default_error_message() -> String {
    validation::INVALID_ANSWER.to_string()
}

fn get_default_mismatch_error() -> String {
    validation::PASSWORDS_MISMATCH.to_string()
}

pub fn get_default_condition() -> String {
    validation::DEFAULT_CONDITION.to_string()
}

/// Parses the textual spellings of a boolean accepted on the command line.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub fn get_default_validation() -> Validation {
    Validation {
        condition: get_default_condition(),
        error_message: get_default_error_message(),
        rule: None,
    }
}
