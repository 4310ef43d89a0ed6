pub mod handlers;
pub mod prompt_builder;
pub mod prompts;
pub mod queries;
