use super::filters::*;
use crate::{constants::BUILTIN_NAMES, error::Result, renderer::interface::TemplateRenderer};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde_json::json;
use std::collections::HashSet;

/// MiniJinja-based template rendering engine.
///
/// Undefined values are errors rather than empty strings, and nothing is
/// auto-escaped: rendered output is source code and path names, not HTML.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
    /// Default context that will be merged with any provided context
    default_context: serde_json::Value,
}

impl MiniJinjaRenderer {
    /// Creates a new MiniJinjaRenderer instance with default environment.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);

        let default_context = json!({
            "platform": {
                "os": std::env::consts::OS,
                "family": std::env::consts::FAMILY,
                "arch": std::env::consts::ARCH,
            }
        });

        env.add_filter("camel_case", to_camel_case);
        env.add_filter("kebab_case", to_kebab_case);
        env.add_filter("pascal_case", to_pascal_case);
        env.add_filter("screaming_snake_case", to_screaming_snake_case);
        env.add_filter("snake_case", to_snake_case);
        env.add_filter("train_case", to_train_case);
        env.add_filter("plural", to_plural);
        env.add_filter("singular", to_singular);
        env.add_filter("regex", regex_filter);
        env.add_filter("regex_replace", regex_replace_filter);

        Self { env, default_context }
    }

    fn merge_context(&self, context: &serde_json::Value) -> serde_json::Value {
        match (self.default_context.as_object(), context.as_object()) {
            (Some(default_obj), Some(context_obj)) => {
                let mut result = default_obj.clone();
                for (key, value) in context_obj {
                    result.insert(key.clone(), value.clone());
                }
                serde_json::Value::Object(result)
            }
            _ => context.clone(),
        }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a dotted name such as `db.port` resolves inside `context`.
fn resolves(context: &serde_json::Value, dotted: &str) -> bool {
    let mut current = context;
    for part in dotted.split('.') {
        match current.get(part) {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn add_template(
        &mut self,
        name: &str,
        template: &str,
    ) -> Result<(), minijinja::Error> {
        // Normalize the template name for cross-platform compatibility
        let normalized_name = name.replace('\\', "/");
        self.env.add_template_owned(normalized_name, template.to_string())
    }

    fn render(
        &self,
        template: &str,
        context: &serde_json::Value,
        template_name: Option<&str>,
    ) -> Result<String> {
        let name = template_name.unwrap_or("temp");
        let tmpl = self.env.template_from_named_str(name, template)?;
        Ok(tmpl.render(self.merge_context(context))?)
    }

    fn execute_expression(
        &self,
        expr_str: &str,
        context: &serde_json::Value,
    ) -> Result<bool> {
        if expr_str.trim().is_empty() {
            return Ok(true);
        }
        let expr = self.env.compile_expression(expr_str)?;
        Ok(expr.eval(self.merge_context(context))?.is_true())
    }

    fn referenced_variables(&self, template: &str) -> Result<HashSet<String>> {
        let tmpl = self.env.template_from_str(template)?;
        Ok(tmpl.undeclared_variables(false))
    }

    fn expression_variables(&self, expr: &str) -> Result<HashSet<String>> {
        if expr.trim().is_empty() {
            return Ok(HashSet::new());
        }
        self.referenced_variables(&format!("{{{{ {expr} }}}}"))
    }

    fn missing_binding(
        &self,
        template: &str,
        context: &serde_json::Value,
    ) -> Option<String> {
        let tmpl = self.env.template_from_str(template).ok()?;
        let merged = self.merge_context(context);
        let mut missing: Vec<String> = tmpl
            .undeclared_variables(true)
            .into_iter()
            .filter(|name| {
                let root = name.split('.').next().unwrap_or(name);
                !BUILTIN_NAMES.contains(&root) && !resolves(&merged, name)
            })
            .collect();
        missing.sort_by_key(|name| (template.find(name.as_str()).unwrap_or(usize::MAX), name.clone()));
        missing.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::renderer::{interface::TemplateRenderer, MiniJinjaRenderer};
    use serde_json::json;

    fn test_template(template: &str, expected: &str) {
        let renderer = MiniJinjaRenderer::new();
        let result = renderer.render(template, &json!({}), None).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_string_conversion_filters() {
        test_template("{{ 'hello world' | camel_case }}", "helloWorld");
        test_template("{{ 'hello world' | kebab_case }}", "hello-world");
        test_template("{{ 'hello world' | pascal_case }}", "HelloWorld");
        test_template("{{ 'hello world' | screaming_snake_case }}", "HELLO_WORLD");
        test_template("{{ 'my-app' | snake_case }}", "my_app");
        test_template("{{ 'hello world' | train_case }}", "Hello-World");
        test_template("{{ 'car' | plural }}", "cars");
        test_template("{{ 'cars' | singular }}", "car");
    }

    #[test]
    fn test_regex_filters() {
        test_template("{{ 'hello world' | regex('^hello') }}", "true");
        test_template("{{ 'Hello World' | regex('hello') }}", "false");
        test_template("{{ 'hello' | regex('[') }}", "false");
        test_template("{{ 'my-app' | regex_replace('-', '_') }}", "my_app");
    }

    #[test]
    fn keeps_trailing_newline_and_does_not_escape() {
        test_template("<a href=\"{{ '&' }}\">\n", "<a href=\"&\">\n");
    }

    #[test]
    fn platform_is_available_by_default() {
        let renderer = MiniJinjaRenderer::new();
        let result =
            renderer.render("{{ platform.os }}", &json!({}), None).unwrap();
        assert_eq!(result, std::env::consts::OS);
    }

    #[test]
    fn undefined_binding_is_an_error() {
        let renderer = MiniJinjaRenderer::new();
        let err = renderer
            .render("Hello {{ name }}", &json!({}), Some("greeting"))
            .unwrap_err();
        match err {
            Error::MinijinjaError(inner) => {
                assert_eq!(inner.kind(), minijinja::ErrorKind::UndefinedError)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn is_defined_test_works_under_strict_mode() {
        let renderer = MiniJinjaRenderer::new();
        assert!(!renderer
            .execute_expression("answer is defined", &json!({}))
            .unwrap());
        assert!(renderer
            .execute_expression("answer is defined", &json!({"answer": 1}))
            .unwrap());
    }

    #[test]
    fn empty_expression_is_true() {
        let renderer = MiniJinjaRenderer::new();
        assert!(renderer.execute_expression("", &json!({})).unwrap());
        assert!(renderer.execute_expression("  ", &json!({})).unwrap());
    }

    #[test]
    fn expression_variables_lists_top_level_names() {
        let renderer = MiniJinjaRenderer::new();
        let names = renderer
            .expression_variables("use_db and db.engine == 'postgres'")
            .unwrap();
        assert!(names.contains("use_db"));
        assert!(names.contains("db"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn referenced_variables_skips_loop_locals() {
        let renderer = MiniJinjaRenderer::new();
        let names = renderer
            .referenced_variables("{% for item in items %}{{ item }}{% endfor %}{{ name }}")
            .unwrap();
        assert!(names.contains("items"));
        assert!(names.contains("name"));
        assert!(!names.contains("item"));
    }

    #[test]
    fn missing_binding_names_first_unresolved_reference() {
        let renderer = MiniJinjaRenderer::new();
        let template = "{{ present }} {{ later }} {{ first_missing }}";
        let missing = renderer.missing_binding(
            "{{ present }} {{ first_missing }} {{ later }}",
            &json!({"present": 1}),
        );
        assert_eq!(missing.as_deref(), Some("first_missing"));

        let missing = renderer.missing_binding(template, &json!({"present": 1}));
        assert_eq!(missing.as_deref(), Some("later"));

        let missing = renderer.missing_binding(
            "{{ db.port }}",
            &json!({"db": {"host": "localhost"}}),
        );
        assert_eq!(missing.as_deref(), Some("db.port"));

        assert!(renderer
            .missing_binding("{{ platform.os }}", &json!({}))
            .is_none());
    }
}
