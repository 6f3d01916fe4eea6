//! Command HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::types::CommandResult;
use crate::{AppState, Error, Result};

pub const SUCCESS_MESSAGE: &str = "Successfully ran command.";
pub const FAILURE_MESSAGE: &str = "This command failed to run.";

/// Run command request
#[derive(Debug, Deserialize)]
pub struct RunCommandRequest {
    pub command: String,
}

/// Run command response
#[derive(Debug, Serialize)]
pub struct RunCommandResponse {
    pub ok: bool,
    pub message: String,
    pub out: String,
}

/// Run a shell command on this host
///
/// Success is answered with 500 and a failed command with 200; existing
/// callers depend on this mapping.
pub async fn run_command(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RunCommandRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RunCommandResponse>)> {
    let Json(req) = payload.map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;

    let result = state.executor.run(&req.command).await;
    Ok(to_response(result))
}

fn to_response(result: CommandResult) -> (StatusCode, Json<RunCommandResponse>) {
    if !result.stderr.is_empty() {
        debug!(command = %result.command, "stderr: {}", result.stderr);
    }

    if result.ok {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RunCommandResponse {
                ok: true,
                message: SUCCESS_MESSAGE.to_string(),
                out: result.stdout,
            }),
        )
    } else {
        (
            StatusCode::OK,
            Json(RunCommandResponse {
                ok: false,
                message: FAILURE_MESSAGE.to_string(),
                out: result.stdout,
            }),
        )
    }
}
