use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::services::command_runner_service;
use crate::web::{AppError, AppState};

const MIN_TIMEOUT_MS: u64 = 1_000;
const MAX_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_TIMEOUT_MS: u64 = 15_000;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCommandPayload {
    pub command: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

pub fn test_command_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(run_test_command))
}

fn clamp_timeout(requested: Option<u64>) -> Duration {
    Duration::from_millis(
        requested
            .unwrap_or(DEFAULT_TIMEOUT_MS)
            .clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS),
    )
}

async fn run_test_command(
    State(_app_state): State<Arc<AppState>>,
    Json(payload): Json<TestCommandPayload>,
) -> Result<Json<Value>, AppError> {
    let command = payload.command.trim();
    if command.is_empty() {
        return Err(AppError::InvalidInput("Command is required".to_string()));
    }

    let outcome = command_runner_service::run_with_timeout(command, clamp_timeout(payload.timeout_ms))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to run command: {e}")))?;

    Ok(Json(json!({
        "success": true,
        "code": outcome.code,
        "stdout": outcome.stdout,
        "stderr": outcome.stderr,
        "timedOut": outcome.timed_out,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_clamped_into_bounds() {
        assert_eq!(clamp_timeout(None), Duration::from_millis(15_000));
        assert_eq!(clamp_timeout(Some(10)), Duration::from_millis(1_000));
        assert_eq!(clamp_timeout(Some(600_000)), Duration::from_millis(60_000));
        assert_eq!(clamp_timeout(Some(5_000)), Duration::from_millis(5_000));
    }
}
