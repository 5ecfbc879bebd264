pub mod openai_compat;
pub mod orchestrator;
pub mod registry;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use orchestrator::{classify_error, FallbackOrchestrator, OrchestratorSettings};
pub use registry::ProviderRegistry;
pub use traits::{ChatRequest, ChatResponse, LlmProvider};
