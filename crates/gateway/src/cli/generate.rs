use std::sync::Arc;

use pf_domain::config::Config;
use pf_domain::task::TaskKind;
use pf_recovery::error::USER_FACING_FAILURE;
use pf_recovery::GenerationError;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;
use crate::tasks::{run_task, TaskData, TaskInput};

/// Run one task from the command line. Ctrl-C cancels the generation.
pub async fn run(config: Arc<Config>, task: String, prompt: String, json: bool) -> anyhow::Result<()> {
    let kind: TaskKind = task.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let cancel = CancellationToken::new();
    let state = AppState::from_config(config, cancel.clone())?;

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let input = TaskInput {
        prompt,
        ..Default::default()
    };
    let output = match run_task(&state.generator, &state.config.generation, kind, &input, &cancel).await {
        Ok(output) => output,
        Err(e) => return Err(user_error(&e)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match &output.data {
        TaskData::Chat(reply) => println!("{}", reply.reply),
        data => println!("{}", serde_json::to_string_pretty(data)?),
    }
    if let Some(model) = &output.model {
        eprintln!("[{} via {model}]", output.task);
    } else {
        eprintln!("[{}: rescue artifact]", output.task);
    }
    Ok(())
}

/// The message the user sees for a failed generation. The error taxonomy
/// only goes to the log.
fn user_error(err: &GenerationError) -> anyhow::Error {
    match err {
        GenerationError::Cancelled => anyhow::anyhow!("generation cancelled"),
        GenerationError::Exhausted { .. } | GenerationError::MalformedStructuredOutput { .. } => {
            tracing::warn!(kind = err.kind(), error = %err, "generation failed");
            anyhow::anyhow!(USER_FACING_FAILURE)
        }
    }
}
