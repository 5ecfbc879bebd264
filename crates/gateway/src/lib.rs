pub mod api;
pub mod cli;
pub mod prompts;
pub mod state;
pub mod tasks;
