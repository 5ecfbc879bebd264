//! Provider-independent generation requests.
//!
//! A [`GenerationRequest`] is immutable once built. When structured output
//! is requested, the builder guarantees the system turn carries an explicit
//! JSON-only instruction, so providers without a native JSON mode still get
//! told what shape to produce.

use crate::message::{Message, Role};
use serde::Serialize;

/// Natural-language instruction embedded in the system turn of every
/// structured-output request.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single valid JSON value only. \
Do not wrap it in markdown code fences and do not add any text before or after it.";

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    messages: Vec<Message>,
    wants_structured_output: bool,
    max_output_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn wants_structured_output(&self) -> bool {
        self.wants_structured_output
    }

    pub fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// The system turn, if any.
    pub fn system_turn(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::System)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequestBuilder {
    messages: Vec<Message>,
    wants_structured_output: bool,
    max_output_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl GenerationRequestBuilder {
    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(Message::system(content))
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(Message::user(content))
    }

    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.message(Message::assistant(content))
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn structured(mut self, wants_structured_output: bool) -> Self {
        self.wants_structured_output = wants_structured_output;
        self
    }

    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn build(mut self) -> GenerationRequest {
        if self.wants_structured_output {
            embed_json_instruction(&mut self.messages);
        }
        GenerationRequest {
            messages: self.messages,
            wants_structured_output: self.wants_structured_output,
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

/// Append the JSON-only instruction to the first system turn, or insert a
/// system turn at the front when there is none.
fn embed_json_instruction(messages: &mut Vec<Message>) {
    match messages.iter_mut().find(|m| m.role == Role::System) {
        Some(system) => {
            if !system.content.contains(JSON_ONLY_INSTRUCTION) {
                if !system.content.trim().is_empty() {
                    system.content.push_str("\n\n");
                }
                system.content.push_str(JSON_ONLY_INSTRUCTION);
            }
        }
        None => messages.insert(0, Message::system(JSON_ONLY_INSTRUCTION)),
    }
}
