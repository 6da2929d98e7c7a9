use crate::error::Result;
use serde_json::Value;

pub struct DataParser;

impl DataParser {
    /// Parse structured data content; blank input is an empty object.
    pub fn parse_structured_content(content: &str, is_yaml: bool) -> Result<Value> {
        if content.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        if is_yaml {
            Ok(serde_yaml::from_str(content)?)
        } else {
            Ok(serde_json::from_str(content)?)
        }
    }

    /// Serialize structured data to string
    pub fn serialize_structured_data(value: &Value, is_yaml: bool) -> Result<String> {
        if value.is_null() {
            return Ok("{}".to_string());
        }

        if is_yaml {
            Ok(serde_yaml::to_string(value)?)
        } else {
            Ok(serde_json::to_string_pretty(value)?)
        }
    }
}
