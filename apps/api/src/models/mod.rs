pub mod assessment;
pub mod framework;
pub mod interview;
pub mod job;
pub mod resume;
pub mod simulation;
pub mod user;
