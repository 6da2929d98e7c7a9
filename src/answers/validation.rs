use crate::{
    config::{IntoQuestionType, Question, QuestionType},
    constants::VALIDATION_VALUE,
    renderer::TemplateRenderer,
};
use std::fmt;

/// Why a candidate answer was not accepted.
///
/// Every variant except `Failed` is a rejection of the value; `Failed` means
/// the validator itself could not run.
#[derive(Debug, PartialEq)]
pub enum ValidationError {
    JsonSchema(String),
    FieldValidation(String),
    Choice(String),
    Rule(String),
    Failed(String),
}

impl ValidationError {
    pub fn is_failure(&self) -> bool {
        matches!(self, ValidationError::Failed(_))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::JsonSchema(msg)
            | ValidationError::FieldValidation(msg)
            | ValidationError::Choice(msg)
            | ValidationError::Rule(msg)
            | ValidationError::Failed(msg) => f.write_str(msg),
        }
    }
}

/// Validate a value against a JSON schema.
pub fn validate_with_schema(
    value: &serde_json::Value,
    schema: &serde_json::Value,
) -> Result<(), ValidationError> {
    // A schema may be written inline as a mapping or as a JSON string.
    let schema_value = match schema {
        serde_json::Value::String(text) => serde_json::from_str(text)
            .map_err(|e| ValidationError::Failed(format!("Invalid JSON schema: {e}")))?,
        other => other.clone(),
    };

    let validator = jsonschema::validator_for(&schema_value)
        .map_err(|e| ValidationError::Failed(format!("Invalid JSON schema: {e}")))?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|error| error.to_string())
        .collect();

    if !errors.is_empty() {
        return Err(ValidationError::JsonSchema(errors.join("\n")));
    }

    Ok(())
}

fn validate_choices(question: &Question, answer: &serde_json::Value) -> Result<(), ValidationError> {
    let is_choice = |candidate: &serde_json::Value| {
        candidate.as_str().is_some_and(|c| question.choices.iter().any(|choice| choice == c))
    };
    let allowed = || question.choices.join(", ");

    match question.into_question_type() {
        QuestionType::SingleChoice if !is_choice(answer) => Err(ValidationError::Choice(
            format!("{answer} is not one of: {}", allowed()),
        )),
        QuestionType::MultipleChoice => match answer.as_array() {
            Some(items) => match items.iter().find(|item| !is_choice(item)) {
                Some(item) => Err(ValidationError::Choice(format!(
                    "{item} is not one of: {}",
                    allowed()
                ))),
                None => Ok(()),
            },
            None => Err(ValidationError::Choice(format!("{answer} is not a list of choices"))),
        },
        QuestionType::Boolean if !answer.is_boolean() => {
            Err(ValidationError::FieldValidation(format!("{answer} is not a boolean")))
        }
        QuestionType::Text if !answer.is_string() => {
            Err(ValidationError::FieldValidation(format!("{answer} is not text")))
        }
        _ => Ok(()),
    }
}

/// Checks a candidate answer for `name` against every constraint the question declares.
///
/// `answers` are the answers resolved so far. The condition sees them plus the
/// candidate, bound both as `value` and under the question's own name.
pub fn validate_answer(
    name: &str,
    question: &Question,
    answer: &serde_json::Value,
    engine: &dyn TemplateRenderer,
    answers: &serde_json::Value,
) -> Result<(), ValidationError> {
    validate_choices(question, answer)?;

    if let Some(rule) = question.validation.rule {
        let text = match answer {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if !rule.check(&text) {
            return Err(ValidationError::Rule(rule.describe().to_string()));
        }
    }

    if let (QuestionType::Json | QuestionType::Yaml, Some(schema)) =
        (question.into_question_type(), &question.schema)
    {
        validate_with_schema(answer, schema)?;
    }

    let mut context = answers.as_object().cloned().unwrap_or_default();
    context.insert(name.to_string(), answer.clone());
    context.insert(VALIDATION_VALUE.to_string(), answer.clone());
    let context = serde_json::Value::Object(context);

    let is_valid = engine
        .execute_expression(&question.validation.condition, &context)
        .map_err(|e| {
            ValidationError::Failed(format!(
                "cannot evaluate condition '{}': {e}",
                question.validation.condition
            ))
        })?;

    if !is_valid {
        let error_message = engine
            .render(&question.validation.error_message, &context, Some("error_message"))
            .unwrap_or_else(|_| question.validation.error_message.clone());
        return Err(ValidationError::FieldValidation(error_message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{get_default_validation, NamedRule};
    use crate::config::{Type, Validation};
    use crate::renderer::MiniJinjaRenderer;
    use serde_json::json;

    fn question(r#type: Type) -> Question {
        Question {
            help: String::new(),
            r#type,
            default: serde_json::Value::Null,
            choices: vec![],
            multiselect: false,
            secret: None,
            ask_if: String::new(),
            schema: None,
            validation: get_default_validation(),
        }
    }

    fn with_condition(mut q: Question, condition: &str, error_message: &str) -> Question {
        q.validation = Validation {
            condition: condition.to_string(),
            error_message: error_message.to_string(),
            rule: None,
        };
        q
    }

    fn check(name: &str, q: &Question, answer: serde_json::Value) -> Result<(), ValidationError> {
        validate_answer(name, q, &answer, &MiniJinjaRenderer::new(), &json!({}))
    }

    #[test]
    fn schema_accepts_and_rejects() {
        let schema = json!({"type": "object", "required": ["foo"], "properties": {"foo": {"type": "string"}}});
        assert!(validate_with_schema(&json!({"foo": "bar"}), &schema).is_ok());
        assert!(matches!(
            validate_with_schema(&json!({"foo": 1}), &schema),
            Err(ValidationError::JsonSchema(_))
        ));
    }

    #[test]
    fn schema_given_as_text_is_parsed() {
        let schema = json!(r#"{"type": "array"}"#);
        assert!(validate_with_schema(&json!([1]), &schema).is_ok());
        assert!(validate_with_schema(&json!({}), &schema).is_err());
    }

    #[test]
    fn broken_schema_is_a_validator_failure() {
        let err = validate_with_schema(&json!({}), &json!("{not json")).unwrap_err();
        assert!(err.is_failure());
    }

    #[test]
    fn condition_sees_candidate_as_value_and_by_name() {
        let q = with_condition(
            question(Type::Str),
            "value | length >= 3 and project_slug == value",
            "'{{ value }}' is too short",
        );
        assert!(check("project_slug", &q, json!("demo")).is_ok());
        assert_eq!(
            check("project_slug", &q, json!("ab")),
            Err(ValidationError::FieldValidation("'ab' is too short".to_string()))
        );
    }

    #[test]
    fn condition_that_cannot_evaluate_is_a_failure() {
        let q = with_condition(question(Type::Str), "value is divisibleby(", "never");
        let err = check("name", &q, json!("x")).unwrap_err();
        assert!(err.is_failure());
    }

    #[test]
    fn choices_are_enforced() {
        let mut q = question(Type::Str);
        q.choices = vec!["MIT".to_string(), "BSD".to_string()];
        assert!(check("license", &q, json!("MIT")).is_ok());
        assert!(matches!(check("license", &q, json!("GPL")), Err(ValidationError::Choice(_))));

        q.multiselect = true;
        assert!(check("license", &q, json!(["MIT", "BSD"])).is_ok());
        assert!(check("license", &q, json!([])).is_ok());
        assert!(matches!(check("license", &q, json!(["MIT", "GPL"])), Err(ValidationError::Choice(_))));
        assert!(matches!(check("license", &q, json!("MIT")), Err(ValidationError::Choice(_))));
    }

    #[test]
    fn named_rule_is_applied() {
        let mut q = question(Type::Str);
        q.validation.rule = Some(NamedRule::Identifier);
        assert!(check("package_name", &q, json!("my_app")).is_ok());
        assert_eq!(
            check("package_name", &q, json!("my-app")),
            Err(ValidationError::Rule(NamedRule::Identifier.describe().to_string()))
        );
    }

    #[test]
    fn booleans_must_be_booleans() {
        let q = question(Type::Bool);
        assert!(check("flag", &q, json!(true)).is_ok());
        assert!(matches!(check("flag", &q, json!("true")), Err(ValidationError::FieldValidation(_))));
    }
}
