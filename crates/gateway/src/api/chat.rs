//! `POST /v1/chat`: a multi-turn assistant reply. Never substituted: a
//! fabricated chat answer would mislead the user.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pf_domain::message::Message;
use pf_recovery::{ChatReply, RecoveryPolicy};
use serde::{Deserialize, Serialize};

use crate::api::{api_error, generation_error};
use crate::state::AppState;
use crate::tasks::build_chat_request;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct ChatResponseBody {
    reply: String,
    model: Option<String>,
}

pub async fn chat(State(state): State<AppState>, Json(body): Json<ChatBody>) -> Response {
    if body.messages.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "messages must not be empty");
    }

    let req = build_chat_request(body.messages, &state.config.generation);
    let cancel = state.shutdown.child_token();

    match state
        .generator
        .generate::<ChatReply>(&req, RecoveryPolicy::Propagate, &cancel)
        .await
    {
        Ok(generated) => Json(ChatResponseBody {
            reply: generated.data.reply,
            model: generated.model,
        })
        .into_response(),
        Err(e) => generation_error(&e),
    }
}
