//! Prompt system for MedQuery.
//!
//! This crate provides:
//! - The built-in grounded-answer prompt
//! - YAML prompt overrides loaded from the workspace
//! - Handlebars template rendering

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use defaults::{default_answer_prompt, ANSWER_PROMPT_ID, ANSWER_PROMPT_VARIABLES};
pub use loader::{load_prompt, resolve_answer_prompt, validate_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
