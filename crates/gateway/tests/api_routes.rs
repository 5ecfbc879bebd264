//! HTTP routes against scripted providers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pf_domain::config::Config;
use pf_domain::error::{Error, Result};
use pf_domain::roster::{ModelDescriptor, ProviderRoster};
use pf_gateway::api;
use pf_gateway::state::AppState;
use pf_providers::{
    ChatRequest, ChatResponse, FallbackOrchestrator, LlmProvider, OrchestratorSettings,
    ProviderRegistry,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Replies with `reply` when set, otherwise fails with HTTP 500.
struct FixedProvider {
    id: &'static str,
    reply: Option<&'static str>,
}

#[async_trait::async_trait]
impl LlmProvider for FixedProvider {
    async fn chat(&self, _req: &ChatRequest) -> Result<ChatResponse> {
        match self.reply {
            Some(content) => Ok(ChatResponse {
                status: 200,
                content: content.into(),
                usage: None,
                model: self.id.into(),
                finish_reason: Some("stop".into()),
            }),
            None => Err(Error::Upstream {
                provider: self.id.into(),
                status: 500,
                message: "internal error".into(),
            }),
        }
    }

    fn provider_id(&self) -> &str {
        self.id
    }
}

fn app(providers: Vec<FixedProvider>, shutdown: CancellationToken) -> Router {
    let roster = ProviderRoster::new(
        providers
            .iter()
            .enumerate()
            .map(|(tier, p)| ModelDescriptor::new(format!("{}/model", p.id), tier as u32, false))
            .collect(),
    );
    let registry = ProviderRegistry::from_providers(
        providers
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn LlmProvider>),
    );
    let orchestrator = FallbackOrchestrator::new(
        Arc::new(roster),
        registry,
        OrchestratorSettings {
            attempt_timeout: Duration::from_secs(5),
            rate_limit_backoff: Duration::ZERO,
        },
    )
    .unwrap();

    let state = AppState::new(Arc::new(Config::default()), orchestrator, shutdown);
    api::router().with_state(state)
}

fn failing() -> Vec<FixedProvider> {
    vec![
        FixedProvider { id: "free", reply: None },
        FixedProvider { id: "paid", reply: None },
    ]
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(app(failing(), CancellationToken::new()), "GET", "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn roster_lists_models_in_trial_order() {
    let (status, body) = send(app(failing(), CancellationToken::new()), "GET", "/v1/roster", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["models"][0]["id"], "free/model");
    assert_eq!(body["models"][1]["id"], "paid/model");
}

#[tokio::test]
async fn blueprint_is_generated_from_fenced_json() {
    let providers = vec![
        FixedProvider { id: "free", reply: None },
        FixedProvider {
            id: "paid",
            reply: Some("```json\n{\"productName\":\"Foo\",\"coreFeatures\":[{\"name\":\"Sync\"}]}\n```"),
        },
    ];
    let (status, body) = send(
        app(providers, CancellationToken::new()),
        "POST",
        "/v1/generate/blueprint",
        Some(json!({ "prompt": "A note-taking app" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"], "blueprint");
    assert_eq!(body["source"], "generated");
    assert_eq!(body["model"], "paid/model");
    assert_eq!(body["data"]["productName"], "Foo");
    assert_eq!(body["data"]["coreFeatures"][0]["name"], "Sync");
}

#[tokio::test]
async fn exhausted_execution_plan_returns_rescue() {
    let (status, body) = send(
        app(failing(), CancellationToken::new()),
        "POST",
        "/v1/generate/execution-plan",
        Some(json!({ "prompt": "A note-taking app" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "rescue");
    assert!(body["model"].is_null());
    assert_eq!(body["data"]["phases"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn exhausted_blueprint_is_a_generic_502() {
    let (status, body) = send(
        app(failing(), CancellationToken::new()),
        "POST",
        "/v1/generate/blueprint",
        Some(json!({ "prompt": "A note-taking app" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "generation failed, please retry" }));
}

#[tokio::test]
async fn unknown_task_is_404() {
    let (status, _) = send(
        app(failing(), CancellationToken::new()),
        "POST",
        "/v1/generate/poem",
        Some(json!({ "prompt": "roses" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_prompt_is_400() {
    let (status, _) = send(
        app(failing(), CancellationToken::new()),
        "POST",
        "/v1/generate/daily-tasks",
        Some(json!({ "prompt": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn shutdown_cancels_generation_with_503() {
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let (status, body) = send(
        app(failing(), shutdown),
        "POST",
        "/v1/generate/execution-plan",
        Some(json!({ "prompt": "A note-taking app" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "generation cancelled");
}

#[tokio::test]
async fn chat_returns_reply_and_model() {
    let providers = vec![FixedProvider {
        id: "free",
        reply: Some("Start with ten customer interviews."),
    }];
    let (status, body) = send(
        app(providers, CancellationToken::new()),
        "POST",
        "/v1/chat",
        Some(json!({ "messages": [{ "role": "user", "content": "Where do I start?" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Start with ten customer interviews.");
    assert_eq!(body["model"], "free/model");
}

#[tokio::test]
async fn chat_failure_is_not_substituted() {
    let (status, body) = send(
        app(failing(), CancellationToken::new()),
        "POST",
        "/v1/chat",
        Some(json!({ "messages": [{ "role": "user", "content": "hi" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "generation failed, please retry");
}
