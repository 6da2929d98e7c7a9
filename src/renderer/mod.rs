//! Template rendering
//!
//! - `interface`: the `TemplateRenderer` trait the rest of the crate renders through
//! - `minijinja`: the MiniJinja-backed implementation
//! - `filters`: case conversion and regex filters registered on the environment

pub mod filters;
pub mod interface;
pub mod minijinja;

pub use interface::TemplateRenderer;
pub use minijinja::MiniJinjaRenderer;

/// Returns a renderer with the default filters and globals registered.
pub fn get_template_engine() -> MiniJinjaRenderer {
    MiniJinjaRenderer::new()
}
