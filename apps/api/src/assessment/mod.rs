pub mod framework;
pub mod handlers;
pub mod orchestrator;
pub mod prompt_builder;
pub mod prompts;
pub mod report;
pub mod response;
pub mod scoring;
pub mod status;
pub mod store;
