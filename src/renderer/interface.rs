use crate::error::Result;
use std::collections::HashSet;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Adds a template to the renderer's template collection.
    ///
    /// Registered templates can be included or imported by name from any
    /// rendered content.
    ///
    /// # Arguments
    /// * `name` - Name to identify the template
    /// * `template` - Template content as string
    fn add_template(&mut self, name: &str, template: &str)
        -> Result<(), minijinja::Error>;

    /// Renders a template string with the given context.
    ///
    /// Referencing a binding that the context does not define is an error.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    /// * `template_name` - Optional name for the template (used in error messages)
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(
        &self,
        template: &str,
        context: &serde_json::Value,
        template_name: Option<&str>,
    ) -> Result<String>;

    /// Executes a template expression and returns whether it evaluates to true.
    ///
    /// An empty expression is true.
    fn execute_expression(&self, expr: &str, context: &serde_json::Value)
        -> Result<bool>;

    /// Top-level names a template reads from its context.
    fn referenced_variables(&self, template: &str) -> Result<HashSet<String>>;

    /// Top-level names an expression reads from its context.
    fn expression_variables(&self, expr: &str) -> Result<HashSet<String>>;

    /// The first binding the template references that `context` cannot resolve.
    ///
    /// "First" is by position in the template text. Used to name the culprit
    /// once a render has failed on an undefined value.
    fn missing_binding(&self, template: &str, context: &serde_json::Value)
        -> Option<String>;
}
