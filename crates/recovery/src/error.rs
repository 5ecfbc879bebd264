use pf_domain::attempt::AttemptLog;

/// Message shown to end users for any propagated failure. The taxonomy
/// below is only logged.
pub const USER_FACING_FAILURE: &str = "generation failed, please retry";

/// Why a generation produced no artifact.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Every roster model failed.
    #[error("all {} model attempts failed", .attempts.len())]
    Exhausted { attempts: AttemptLog },

    /// The caller went away before a result was produced.
    #[error("generation cancelled")]
    Cancelled,

    /// A model answered, but the answer could not be parsed or failed its
    /// shape check.
    #[error("malformed structured output from {model}: {reason}")]
    MalformedStructuredOutput { model: String, reason: String },
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Exhausted { .. } => "exhausted",
            GenerationError::Cancelled => "cancelled",
            GenerationError::MalformedStructuredOutput { .. } => "malformed_structured_output",
        }
    }
}
