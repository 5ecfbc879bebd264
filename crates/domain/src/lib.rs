pub mod attempt;
pub mod config;
pub mod error;
pub mod message;
pub mod request;
pub mod roster;
pub mod task;
pub mod trace;
