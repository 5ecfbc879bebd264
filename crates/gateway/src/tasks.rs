//! Thin per-task callers shared by the HTTP API and the CLI.
//!
//! Each task picks its artifact type and default recovery policy; this
//! module only builds the request and dispatches.

use pf_domain::config::GenerationConfig;
use pf_domain::message::Message;
use pf_domain::request::GenerationRequest;
use pf_domain::task::TaskKind;
use pf_recovery::{
    Artifact, Blueprint, ChatReply, DailyTaskSet, ExecutionPlan, Generated, GenerationError,
    Source, StructuredGenerator,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::prompts;

/// Caller input for one task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    pub prompt: String,
    /// Replaces the task's default system prompt.
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TaskData {
    Blueprint(Blueprint),
    ExecutionPlan(ExecutionPlan),
    DailyTasks(DailyTaskSet),
    Chat(ChatReply),
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    pub task: TaskKind,
    pub source: Source,
    pub model: Option<String>,
    pub data: TaskData,
}

/// Build the request for `kind`, filling unset parameters from config.
pub fn build_request(
    kind: TaskKind,
    input: &TaskInput,
    defaults: &GenerationConfig,
) -> GenerationRequest {
    let params = defaults.params(kind);
    let system = input
        .system
        .clone()
        .unwrap_or_else(|| prompts::system_prompt(kind).to_string());

    GenerationRequest::builder()
        .system(system)
        .user(input.prompt.clone())
        .structured(kind.wants_structured_output())
        .temperature(input.temperature.unwrap_or(params.temperature))
        .max_output_tokens(input.max_tokens.unwrap_or(params.max_output_tokens))
        .build()
}

/// Build a multi-turn chat request. A system turn is prepended when the
/// conversation has none.
pub fn build_chat_request(messages: Vec<Message>, defaults: &GenerationConfig) -> GenerationRequest {
    let params = defaults.params(TaskKind::Chat);
    let mut builder = GenerationRequest::builder();
    if !messages.iter().any(|m| m.role == pf_domain::message::Role::System) {
        builder = builder.system(prompts::system_prompt(TaskKind::Chat));
    }
    builder
        .messages(messages)
        .structured(false)
        .temperature(params.temperature)
        .max_output_tokens(params.max_output_tokens)
        .build()
}

/// Run one task with its default recovery policy.
pub async fn run_task(
    generator: &StructuredGenerator,
    defaults: &GenerationConfig,
    kind: TaskKind,
    input: &TaskInput,
    cancel: &CancellationToken,
) -> Result<TaskOutput, GenerationError> {
    let req = build_request(kind, input, defaults);
    match kind {
        TaskKind::Blueprint => run::<Blueprint>(generator, &req, cancel, TaskData::Blueprint).await,
        TaskKind::ExecutionPlan => {
            run::<ExecutionPlan>(generator, &req, cancel, TaskData::ExecutionPlan).await
        }
        TaskKind::DailyTasks => run::<DailyTaskSet>(generator, &req, cancel, TaskData::DailyTasks).await,
        TaskKind::Chat => run::<ChatReply>(generator, &req, cancel, TaskData::Chat).await,
    }
}

async fn run<T: Artifact>(
    generator: &StructuredGenerator,
    req: &GenerationRequest,
    cancel: &CancellationToken,
    wrap: fn(T) -> TaskData,
) -> Result<TaskOutput, GenerationError> {
    let Generated {
        data,
        source,
        model,
    } = generator.generate_default::<T>(req, cancel).await?;
    Ok(TaskOutput {
        task: T::KIND,
        source,
        model,
        data: wrap(data),
    })
}
