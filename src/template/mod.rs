//! Template tree processing for Stencil
//!
//! - `rule`: parsed path components with their guards
//! - `tree`: scanning the template source tree
//! - `resolver`: mapping source paths to destinations for one answer set
//! - `operation`: planned filesystem operations
//! - `dispatcher`: planning and applying the render

pub mod dispatcher;
pub mod operation;
pub mod resolver;
pub mod rule;
pub mod tree;

pub use dispatcher::{Dispatcher, GenerationMode, RenderReport};
pub use operation::{ConflictPolicy, FileAction, TemplateOperation};
pub use resolver::{PathResolver, RenderMode, ResolvedPath};
pub use rule::{PathRule, Segment};
pub use tree::{scan_template_tree, SourceEntry};
