use axum::{
    extract::{Path as AxumPath, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use crate::web::{AppError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFileInfo {
    pub name: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

pub fn log_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_logs))
        .route("/{filename}", get(get_log).delete(delete_log))
}

/// A plain file name with no way to escape the logs directory.
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
}

fn validated_log_path(app_state: &AppState, filename: &str) -> Result<PathBuf, AppError> {
    if !is_safe_filename(filename) {
        return Err(AppError::InvalidInput("Invalid filename".to_string()));
    }
    Ok(app_state.config.logs_dir.join(filename))
}

async fn list_logs(State(app_state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let mut dir = tokio::fs::read_dir(&app_state.config.logs_dir)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to read logs directory: {e}")))?;

    let mut files = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to read logs directory: {e}")))?
    {
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        files.push(LogFileInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            last_modified,
        });
    }

    files.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));

    Ok(Json(json!({
        "files": files,
        "totalFiles": files.len(),
    })))
}

async fn get_log(
    State(app_state): State<Arc<AppState>>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Json<Value>, AppError> {
    let path = validated_log_path(&app_state, &filename)?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::NotFound("Log file not found".to_string()),
        _ => AppError::InternalServerError(format!("Failed to read log file: {e}")),
    })?;
    // Cron job output is not guaranteed to be valid UTF-8.
    let content = String::from_utf8_lossy(&bytes).into_owned();

    Ok(Json(json!({
        "filename": filename,
        "content": content,
        "size": bytes.len(),
    })))
}

async fn delete_log(
    State(app_state): State<Arc<AppState>>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Json<Value>, AppError> {
    let path = validated_log_path(&app_state, &filename)?;

    tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::NotFound("Log file not found".to_string()),
        _ => AppError::InternalServerError(format!("Failed to delete log file: {e}")),
    })?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Log file {filename} deleted successfully"),
    })))
}

#[cfg(test)]
mod tests {
    use super::is_safe_filename;

    #[test]
    fn path_traversal_is_rejected() {
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("a/b.log"));
        assert!(!is_safe_filename("..\\secrets"));
        assert!(!is_safe_filename(""));
        assert!(is_safe_filename("nightly-backup.log"));
    }
}
