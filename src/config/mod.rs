//! Template schema configuration
//!
//! This module contains the configuration system components:
//! - `types`: Basic types and enums used throughout the config system
//! - `question`: Question definition and rendering logic
//! - `loader`: Configuration file loading, parsing and validation

pub mod loader;
pub mod question;
pub mod types;


pub use loader::{Config, ConfigV1};
pub use question::{IntoQuestionType, Question, QuestionRendered};
pub use types::{HookCommand, NamedRule, QuestionType, Secret, Type, Validation};
