//! Answers supplied out-of-band
//!
//! Sources are merged lowest precedence first: the answers file, then
//! `--answers`, then `--data key=value` pairs.

use crate::config::types::parse_bool;
use crate::config::{Question, QuestionType};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value;

/// Splits `key=value` entries. The value may itself contain `=`.
pub fn parse_data_entries(entries: &[String]) -> Result<IndexMap<String, String>> {
    entries
        .iter()
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(Error::InvalidOverride { entry: entry.clone() }),
        })
        .collect()
}

/// Converts raw command-line text into a value of the question's type.
pub fn coerce_text(name: &str, question: &Question, raw: &str) -> Result<Value> {
    let coercion_error =
        |reason: String| Error::OverrideCoercion { question: name.to_string(), reason };

    match question.question_type() {
        QuestionType::Text | QuestionType::SingleChoice => Ok(Value::String(raw.to_string())),
        QuestionType::Boolean => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| coercion_error(format!("'{raw}' is not a boolean"))),
        QuestionType::MultipleChoice => {
            if raw.trim_start().starts_with('[') {
                let items: Vec<String> = serde_yaml::from_str(raw)
                    .map_err(|e| coercion_error(format!("'{raw}' is not a list: {e}")))?;
                Ok(Value::from(items))
            } else {
                Ok(Value::from(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect::<Vec<_>>(),
                ))
            }
        }
        QuestionType::Json => serde_json::from_str(raw)
            .map_err(|e| coercion_error(format!("'{raw}' is not valid JSON: {e}"))),
        QuestionType::Yaml => serde_yaml::from_str(raw)
            .map_err(|e| coercion_error(format!("'{raw}' is not valid YAML: {e}"))),
    }
}

/// Brings an already-typed value (answers file, `--answers`) in line with the question.
///
/// Strings given for non-text questions are parsed as if they came from the
/// command line; scalars given for text questions are turned into text.
pub fn coerce_value(name: &str, question: &Question, value: Value) -> Result<Value> {
    match (question.question_type(), value) {
        (QuestionType::Text | QuestionType::SingleChoice, Value::String(s)) => {
            Ok(Value::String(s))
        }
        (QuestionType::Text | QuestionType::SingleChoice, v @ (Value::Number(_) | Value::Bool(_))) => {
            Ok(Value::String(v.to_string()))
        }
        (QuestionType::Json | QuestionType::Yaml | QuestionType::MultipleChoice, Value::String(s))
        | (QuestionType::Boolean, Value::String(s)) => coerce_text(name, question, &s),
        (_, v) => Ok(v),
    }
}

/// Explicit answers that bypass prompting.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    values: IndexMap<String, Value>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers typed values over the current ones.
    pub fn merge_values(
        &mut self,
        values: impl IntoIterator<Item = (String, Value)>,
        questions: &IndexMap<String, Question>,
    ) -> Result<()> {
        for (name, value) in values {
            let Some(question) = questions.get(&name) else {
                log::warn!("Ignoring answer for '{name}': no such question");
                continue;
            };
            let value = coerce_value(&name, question, value)?;
            self.values.insert(name, value);
        }
        Ok(())
    }

    /// Layers `key=value` entries over the current ones.
    pub fn merge_entries(
        &mut self,
        entries: &[String],
        questions: &IndexMap<String, Question>,
    ) -> Result<()> {
        for (name, raw) in parse_data_entries(entries)? {
            let Some(question) = questions.get(&name) else {
                log::warn!("Ignoring --data for '{name}': no such question");
                continue;
            };
            let value = coerce_text(&name, question, &raw)?;
            self.values.insert(name, value);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn questions() -> IndexMap<String, Question> {
        serde_yaml::from_str(
            r#"
project_slug: {type: str}
include_docs: {type: bool}
stack: {type: str, choices: [rust, python, go], multiselect: true}
license: {type: str, choices: [MIT, BSD]}
settings: {type: json}
extra: {type: yaml}
"#,
        )
        .unwrap()
    }

    #[test]
    fn parse_data_entries_splits_on_first_equals() {
        let parsed =
            parse_data_entries(&["a=1".to_string(), "query=x=y".to_string(), "empty=".to_string()])
                .unwrap();
        assert_eq!(parsed["a"], "1");
        assert_eq!(parsed["query"], "x=y");
        assert_eq!(parsed["empty"], "");
    }

    #[test]
    fn parse_data_entries_rejects_missing_key() {
        assert!(matches!(
            parse_data_entries(&["novalue".to_string()]),
            Err(Error::InvalidOverride { .. })
        ));
        assert!(matches!(
            parse_data_entries(&["=x".to_string()]),
            Err(Error::InvalidOverride { .. })
        ));
    }

    #[test]
    fn coerce_text_per_question_type() {
        let qs = questions();
        assert_eq!(coerce_text("include_docs", &qs["include_docs"], "yes").unwrap(), json!(true));
        assert_eq!(coerce_text("stack", &qs["stack"], "rust, go").unwrap(), json!(["rust", "go"]));
        assert_eq!(coerce_text("stack", &qs["stack"], "[python]").unwrap(), json!(["python"]));
        assert_eq!(coerce_text("license", &qs["license"], "MIT").unwrap(), json!("MIT"));
        assert_eq!(
            coerce_text("settings", &qs["settings"], r#"{"port": 80}"#).unwrap(),
            json!({"port": 80})
        );
        assert_eq!(coerce_text("extra", &qs["extra"], "port: 80").unwrap(), json!({"port": 80}));
    }

    #[test]
    fn coerce_text_reports_bad_values() {
        let qs = questions();
        let err = coerce_text("include_docs", &qs["include_docs"], "perhaps").unwrap_err();
        assert!(matches!(err, Error::OverrideCoercion { ref question, .. } if question == "include_docs"));
        assert!(coerce_text("settings", &qs["settings"], "{").is_err());
    }

    #[test]
    fn later_sources_win_and_unknown_keys_are_ignored() {
        let qs = questions();
        let mut overrides = Overrides::new();
        overrides
            .merge_values(
                vec![
                    ("project_slug".to_string(), json!("from-file")),
                    ("include_docs".to_string(), json!("no")),
                    ("unknown".to_string(), json!(1)),
                ],
                &qs,
            )
            .unwrap();
        overrides.merge_entries(&["project_slug=from-cli".to_string()], &qs).unwrap();

        assert_eq!(overrides.get("project_slug"), Some(&json!("from-cli")));
        assert_eq!(overrides.get("include_docs"), Some(&json!(false)));
        assert!(overrides.get("unknown").is_none());
    }

    #[test]
    fn typed_numbers_become_text_for_str_questions() {
        let qs = questions();
        assert_eq!(
            coerce_value("project_slug", &qs["project_slug"], json!(42)).unwrap(),
            json!("42")
        );
    }
}
