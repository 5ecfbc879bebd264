use pf_domain::attempt::Usage;
use pf_domain::error::Result;
use pf_domain::message::Message;
use pf_domain::request::GenerationRequest;
use pf_domain::roster::ModelDescriptor;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider-agnostic chat completion request for one attempt.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// The conversation messages to send.
    pub messages: Vec<Message>,
    /// Sampling temperature (0.0 to 2.0). `None` lets the provider choose.
    pub temperature: Option<f32>,
    /// Maximum tokens in the response. `None` lets the provider choose.
    pub max_tokens: Option<u32>,
    /// When `true`, attach the provider's native JSON-mode flag.
    pub json_mode: bool,
    /// Model identifier override. When `None`, the provider uses its default.
    pub model: Option<String>,
}

impl ChatRequest {
    /// Build the wire request for one roster entry.
    ///
    /// The native JSON flag is only set when the caller wants structured
    /// output *and* the model is known to accept it; other models rely on
    /// the instruction already embedded in the system turn.
    pub fn for_attempt(req: &GenerationRequest, model: &ModelDescriptor) -> Self {
        let model_name = model.model_name();
        Self {
            messages: req.messages().to_vec(),
            temperature: req.temperature(),
            max_tokens: req.max_output_tokens(),
            json_mode: req.wants_structured_output() && model.supports_strict_json_mode,
            model: (!model_name.is_empty()).then(|| model_name.to_string()),
        }
    }
}

/// A provider-agnostic chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// HTTP status of the upstream response (always 2xx here).
    pub status: u16,
    /// Textual content of the response. May be empty.
    pub content: String,
    /// Token usage information.
    pub usage: Option<Usage>,
    /// The model that actually produced the response.
    pub model: String,
    /// The reason the model stopped generating (e.g. "stop", "length").
    pub finish_reason: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core provider trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trait that every LLM adapter must implement.
///
/// Adapters translate between our internal types and one wire format.
/// Non-2xx answers must come back as [`pf_domain::error::Error::Upstream`]
/// so the orchestrator can classify them by status; transport failures as
/// [`pf_domain::error::Error::Http`].
///
/// Dropping the returned future must abort the in-flight request.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and wait for the full response.
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse>;

    /// A unique identifier for this provider instance.
    fn provider_id(&self) -> &str;
}
