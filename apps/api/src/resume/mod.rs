// Markdown resume storage and AI rewrites of individual sections.

pub mod builder;
pub mod handlers;
pub mod prompts;
