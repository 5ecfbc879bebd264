//! `POST /v1/generate/:task`: one structured (or chat) generation with the
//! task's default recovery policy.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pf_domain::task::TaskKind;

use crate::api::{api_error, generation_error};
use crate::state::AppState;
use crate::tasks::{run_task, TaskInput};

pub async fn generate(
    State(state): State<AppState>,
    Path(task): Path<String>,
    Json(body): Json<TaskInput>,
) -> Response {
    let Ok(kind) = task.parse::<TaskKind>() else {
        return api_error(StatusCode::NOT_FOUND, format!("unknown task: {task}"));
    };
    if body.prompt.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "prompt must not be empty");
    }

    let cancel = state.shutdown.child_token();
    match run_task(&state.generator, &state.config.generation, kind, &body, &cancel).await {
        Ok(output) => Json(output).into_response(),
        Err(e) => generation_error(&e),
    }
}
