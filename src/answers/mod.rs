//! Answer schema evaluation
//!
//! - `graph`: dependency ordering of questions
//! - `overrides`: values supplied without prompting
//! - `validation`: validators run against candidate answers
//! - `resolver`: turns a schema into a complete `AnswerSet`

pub mod graph;
pub mod overrides;
pub mod resolver;
pub mod validation;

pub use overrides::Overrides;
pub use resolver::AnswerResolver;

use indexmap::IndexMap;
use serde_json::Value;

/// Resolved value of every question of one run, in declaration order.
///
/// Only the resolver builds one; once built it is not modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSet {
    values: IndexMap<String, Value>,
}

impl AnswerSet {
    pub fn from_values(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The answers as a template context object.
    pub fn to_context(&self) -> Value {
        Value::Object(self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }
}
