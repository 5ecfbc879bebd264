//! OpenAI-compatible adapter.
//!
//! Works with OpenAI, Azure OpenAI, OpenRouter, Groq, Together, Ollama,
//! vLLM and any other endpoint that follows the chat completions contract.

use crate::traits::{ChatRequest, ChatResponse, LlmProvider};
use crate::util::{from_reqwest, resolve_api_key, truncate_error_body};
use pf_domain::attempt::Usage;
use pf_domain::config::{ProviderConfig, ProviderKind};
use pf_domain::error::{Error, Result};
use pf_domain::message::Message;
use serde_json::Value;

const MAX_ERROR_BODY_CHARS: usize = 512;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An LLM provider adapter for any OpenAI-compatible API endpoint.
///
/// Also handles Azure OpenAI, which uses the same wire format but with a
/// different URL pattern (`/openai/deployments/{model}/chat/completions`)
/// and auth header (`api-key` instead of `Authorization: Bearer`).
pub struct OpenAiCompatProvider {
    id: String,
    base_url: String,
    api_key: Option<String>,
    auth_header: String,
    auth_prefix: String,
    default_model: String,
    client: reqwest::Client,
    /// When true, uses Azure OpenAI URL pattern and omits `model` from body.
    is_azure: bool,
}

impl OpenAiCompatProvider {
    /// Create a new provider from the deserialized provider config.
    ///
    /// Providers with no `key`/`env` in their auth block (local Ollama,
    /// vLLM) are called without an auth header.
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        let is_azure = cfg.kind == ProviderKind::AzureOpenai;

        let api_key = if cfg.auth.key.is_some() || cfg.auth.env.is_some() {
            Some(resolve_api_key(&cfg.auth)?)
        } else {
            None
        };

        // Azure uses `api-key` header with no prefix; standard OpenAI uses
        // `Authorization: Bearer <key>`.
        let auth_header = cfg.auth.header.clone().unwrap_or_else(|| {
            if is_azure {
                "api-key".into()
            } else {
                "Authorization".into()
            }
        });
        let auth_prefix = cfg.auth.prefix.clone().unwrap_or_else(|| {
            if is_azure {
                String::new()
            } else {
                "Bearer ".into()
            }
        });

        let default_model = cfg
            .default_model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".into());

        // No overall request timeout here: the orchestrator owns the
        // per-attempt budget and drops the future when it expires.
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            auth_header,
            auth_prefix,
            default_model,
            client,
            is_azure,
        })
    }

    // ── Internal: build request ───────────────────────────────────

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        match &self.api_key {
            Some(key) => builder.header(&self.auth_header, format!("{}{}", self.auth_prefix, key)),
            None => builder,
        }
    }

    /// Resolve the effective model name for this request.
    fn effective_model(&self, req: &ChatRequest) -> String {
        req.model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    fn chat_url(&self, req: &ChatRequest) -> String {
        if self.is_azure {
            format!(
                "{}/openai/deployments/{}/chat/completions?api-version=2024-10-21",
                self.base_url,
                self.effective_model(req)
            )
        } else {
            format!("{}/chat/completions", self.base_url)
        }
    }

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(msg_to_openai).collect();

        let mut body = serde_json::json!({
            "messages": messages,
            "stream": false,
        });

        // Azure embeds the model (deployment) name in the URL, so we omit it
        // from the request body. Standard OpenAI requires it in the body.
        if !self.is_azure {
            body["model"] = Value::String(self.effective_model(req));
        }
        if let Some(temp) = req.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = req.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        // Never sent unless asked for: some endpoints reject unknown fields.
        if req.json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }
        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn msg_to_openai(msg: &Message) -> Value {
    serde_json::json!({
        "role": msg.role.as_str(),
        "content": msg.content,
    })
}

/// Parse a 2xx chat completions body.
///
/// A missing or null `content` yields an empty string: the orchestrator
/// decides what an empty answer means. A body carrying only an `error`
/// object is reported as a provider error.
fn parse_chat_response(provider: &str, status: u16, body: &Value) -> Result<ChatResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first());

    if choice.is_none() {
        if let Some(err) = body.get("error") {
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
                .unwrap_or_else(|| err.to_string());
            return Err(Error::Provider {
                provider: provider.to_string(),
                message,
            });
        }
    }

    let content = choice
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let finish_reason = choice
        .and_then(|c| c.get("finish_reason"))
        .and_then(|v| v.as_str())
        .map(String::from);

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let usage = body.get("usage").and_then(parse_openai_usage);

    Ok(ChatResponse {
        status,
        content,
        usage,
        model,
        finish_reason,
    })
}

fn parse_openai_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let url = self.chat_url(req);
        let body = self.build_chat_body(req);

        tracing::debug!(
            provider = %self.id,
            url = %url,
            json_mode = req.json_mode,
            "openai_compat chat request"
        );

        let resp = self
            .authed_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Upstream {
                provider: self.id.clone(),
                status: status.as_u16(),
                message: truncate_error_body(&resp_text, MAX_ERROR_BODY_CHARS),
            });
        }

        if resp_text.trim().is_empty() {
            return Ok(ChatResponse {
                status: status.as_u16(),
                content: String::new(),
                usage: None,
                model: self.effective_model(req),
                finish_reason: None,
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_chat_response(&self.id, status.as_u16(), &resp_json)
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use pf_domain::config::AuthConfig;

    fn provider(kind: ProviderKind) -> OpenAiCompatProvider {
        OpenAiCompatProvider::from_config(&ProviderConfig {
            id: "test".into(),
            kind,
            base_url: "https://example.com/v1/".into(),
            auth: AuthConfig {
                key: Some("sk-test".into()),
                ..Default::default()
            },
            default_model: Some("default-model".into()),
        })
        .unwrap()
    }

    fn request(json_mode: bool) -> ChatRequest {
        ChatRequest {
            messages: vec![Message::system("sys"), Message::user("hi")],
            temperature: Some(0.5),
            max_tokens: Some(100),
            json_mode,
            model: Some("gpt-4o-mini".into()),
        }
    }

    #[test]
    fn body_omits_response_format_without_json_mode() {
        let body = provider(ProviderKind::OpenaiCompat).build_chat_body(&request(false));
        assert!(body.get("response_format").is_none());
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 100);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn body_carries_response_format_with_json_mode() {
        let body = provider(ProviderKind::OpenaiCompat).build_chat_body(&request(true));
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn azure_puts_deployment_in_url_not_body() {
        let p = provider(ProviderKind::AzureOpenai);
        let req = request(false);
        assert_eq!(
            p.chat_url(&req),
            "https://example.com/v1/openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-10-21"
        );
        assert!(p.build_chat_body(&req).get("model").is_none());
    }

    #[test]
    fn missing_content_parses_as_empty() {
        let body = serde_json::json!({
            "model": "m",
            "choices": [{ "message": { "role": "assistant", "content": null }, "finish_reason": "length" }]
        });
        let resp = parse_chat_response("p", 200, &body).unwrap();
        assert!(resp.content.is_empty());
        assert_eq!(resp.finish_reason.as_deref(), Some("length"));
    }

    #[test]
    fn error_object_in_success_body_is_provider_error() {
        let body = serde_json::json!({ "error": { "message": "model overloaded" } });
        let err = parse_chat_response("p", 200, &body).unwrap_err();
        assert!(err.to_string().contains("model overloaded"));
    }

    #[test]
    fn usage_is_extracted() {
        let body = serde_json::json!({
            "model": "m",
            "choices": [{ "message": { "content": "{}" } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        });
        let resp = parse_chat_response("p", 200, &body).unwrap();
        assert_eq!(resp.usage.unwrap().total_tokens, 15);
    }
}
