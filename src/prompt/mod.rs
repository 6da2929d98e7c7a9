//! Interactive prompting for answers
//!
//! The module is structured in layers:
//! - `interface`: Pure abstract interfaces independent of any UI library
//! - `dialoguer`: Terminal implementation using the dialoguer library
//! - `automatic_impl`: Scripted implementation for tests and automation
//! - `handler`: Maps a question onto the right prompt kind

use crate::{config::Question, error::Result, prompt::dialoguer::DialoguerPrompter};

pub mod automatic_impl;
pub mod dialoguer;
pub mod handler;
pub mod interface;
pub mod parser;

pub use handler::PromptHandler;
pub use interface::*;

/// Asks for one answer at a time on behalf of the answer resolver.
pub trait Prompter {
    /// Presents the question and returns the raw value the user supplied.
    fn prompt(&self, prompt_context: &PromptContext) -> Result<serde_json::Value>;

    /// Shows why the previous value was rejected before the question is asked again.
    fn report_rejection(&self, reason: &str);

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Context for prompting operations
pub struct PromptContext<'a> {
    pub question: &'a Question,
    pub default: &'a serde_json::Value,
    pub help: &'a str,
}

impl<'a> PromptContext<'a> {
    pub fn new(
        question: &'a Question,
        default: &'a serde_json::Value,
        help: &'a str,
    ) -> Self {
        Self { question, default, help }
    }
}

/// The terminal prompter used by the command line.
pub fn get_prompt_provider() -> PromptHandler<DialoguerPrompter> {
    PromptHandler::new(DialoguerPrompter::new())
}
