//! Configuration loading and management

use crate::config::question::Question;
use crate::config::types::{HookCommand, NamedRule, Type};
use crate::constants::{CONFIG_FILENAMES, DEFAULT_TEMPLATE_SUFFIX};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure holding all questions
#[derive(Debug, Deserialize)]
pub struct ConfigV1 {
    #[serde(default = "get_default_template_suffix")]
    pub template_suffix: String,
    #[serde(default)]
    pub template_globs: Vec<String>,
    #[serde(default)]
    pub questions: IndexMap<String, Question>,
    #[serde(default)]
    pub post_hooks: Vec<HookCommand>,
    #[serde(default = "get_default_hook_runner")]
    pub hook_runner: Vec<String>,
}

impl ConfigV1 {
    pub fn validate(&self) -> Result<(), Error> {
        if self.template_suffix.is_empty() {
            return Err(Error::ConfigValidation("template_suffix must not be empty".into()));
        }
        if !self.template_suffix.starts_with('.') || self.template_suffix.len() < 2 {
            return Err(Error::ConfigValidation(
                "template_suffix must start with '.' and have at least 1 character after it"
                    .into(),
            ));
        }
        if !self.post_hooks.is_empty() && self.hook_runner.is_empty() {
            return Err(Error::ConfigValidation("hook_runner must not be empty".into()));
        }

        for (name, question) in &self.questions {
            if !NamedRule::Identifier.check(name) {
                return Err(Error::ConfigValidation(format!(
                    "question name '{name}' must be an identifier"
                )));
            }
            if name.starts_with('_') {
                return Err(Error::ConfigValidation(format!(
                    "question name '{name}' must not start with '_'; such keys are reserved in the answers file"
                )));
            }
            if question.multiselect && question.choices.is_empty() {
                return Err(Error::ConfigValidation(format!(
                    "question '{name}' is multiselect but declares no choices"
                )));
            }
            if !question.choices.is_empty() && question.r#type != Type::Str {
                return Err(Error::ConfigValidation(format!(
                    "question '{name}' declares choices but is not of type str"
                )));
            }
            if question.schema.is_some() && !matches!(question.r#type, Type::Json | Type::Yaml) {
                return Err(Error::ConfigValidation(format!(
                    "question '{name}' declares a schema but is not of type json or yaml"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "schemaVersion")]
pub enum Config {
    #[serde(rename = "v1")]
    V1(ConfigV1),
}

impl Config {
    /// Finds the configuration file in `template_root`, if any.
    pub fn find_config_file<P: AsRef<Path>>(template_root: P) -> Option<PathBuf> {
        CONFIG_FILENAMES
            .iter()
            .map(|name| template_root.as_ref().join(name))
            .find(|path| path.is_file())
    }

    pub fn load_config<P: AsRef<Path>>(template_root: P) -> Result<Self> {
        let template_root = template_root.as_ref();
        let template_dir = template_root.to_str_checked()?.to_string();

        let Some(config_file_path) = Self::find_config_file(template_root) else {
            return Err(Error::ConfigNotFound {
                template_dir,
                config_files: CONFIG_FILENAMES.join(", "),
            });
        };

        log::debug!("Loading configuration from {}", config_file_path.display());
        let content = std::fs::read_to_string(&config_file_path)?;
        let config: Config = match config_file_path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };

        let Config::V1(ref v1) = config;
        v1.validate()?;

        Ok(config)
    }
}

fn get_default_template_suffix() -> String {
    DEFAULT_TEMPLATE_SUFFIX.to_string()
}

fn get_default_hook_runner() -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string()]
    } else {
        vec!["sh".to_string(), "-c".to_string()]
    }
}
