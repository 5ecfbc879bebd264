//! Response recovery for PlanForge generations.
//!
//! Sits on top of the fallback orchestrator: repairs sloppy JSON from a
//! successful model, parses and shape-checks it into a domain artifact,
//! and applies the caller's recovery policy when that fails.

pub mod artifacts;
pub mod error;
pub mod generator;
pub mod policy;
pub mod repair;
pub mod rescue;

pub use artifacts::{Artifact, Blueprint, ChatReply, DailyTaskSet, ExecutionPlan};
pub use error::GenerationError;
pub use generator::{with_rescue, Generated, Source, StructuredGenerator};
pub use policy::RecoveryPolicy;
pub use repair::extract_structured;
