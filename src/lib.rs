pub mod answers;
pub mod cli;
pub mod content;
pub mod error;
pub mod gemini;
pub mod metadata;
pub mod planner;
pub mod prompts;
pub mod quiz;
pub mod schedules;
pub mod server;
pub mod storage;
pub mod types;
