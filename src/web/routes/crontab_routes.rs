use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::db::services::crontab_entry_service::{
    CrontabEntryError, NewCrontabEntry, UpdateCrontabEntry,
};
use crate::services::crontab_sync_service::SyncOutcome;
use crate::web::{AppError, AppState};

#[derive(Deserialize)]
pub struct CreateEntryPayload {
    pub name: String,
    pub schedule: String,
    pub command: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryPayload {
    pub name: String,
    pub schedule: String,
    pub command: String,
    pub description: Option<String>,
    pub is_active: bool,
}

pub fn crontab_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/{id}", put(update_entry).delete(delete_entry))
}

fn mutation_response<T>(outcome: &SyncOutcome<T>, message: &str, mut body: Value) -> Value {
    body["success"] = json!(true);
    body["message"] = json!(message);
    if let Some(warning) = &outcome.sync_warning {
        body["warning"] = json!(warning);
    }
    body
}

async fn list_entries(State(app_state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let entries = app_state.crontab_sync.list_entries().await?;
    Ok(Json(json!({ "entries": entries })))
}

async fn create_entry(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateEntryPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let outcome = app_state
        .crontab_sync
        .create_entry(NewCrontabEntry {
            name: payload.name,
            schedule: payload.schedule,
            command: payload.command,
            description: payload.description,
        })
        .await?;

    let body = mutation_response(
        &outcome,
        "Crontab entry created successfully",
        json!({ "id": outcome.value.id, "entry": &outcome.value }),
    );
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_entry(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateEntryPayload>,
) -> Result<Json<Value>, AppError> {
    let outcome = app_state
        .crontab_sync
        .update_entry(
            id,
            UpdateCrontabEntry {
                name: payload.name,
                schedule: payload.schedule,
                command: payload.command,
                description: payload.description,
                is_active: payload.is_active,
            },
        )
        .await?;

    let body = mutation_response(
        &outcome,
        "Crontab entry updated successfully",
        json!({ "entry": &outcome.value }),
    );
    Ok(Json(body))
}

async fn delete_entry(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let outcome = app_state.crontab_sync.delete_entry(id).await?;

    let body = mutation_response(&outcome, "Crontab entry deleted successfully", json!({}));
    Ok(Json(body))
}

impl From<CrontabEntryError> for AppError {
    fn from(err: CrontabEntryError) -> Self {
        match err {
            CrontabEntryError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            CrontabEntryError::NotFound(id) => {
                AppError::NotFound(format!("Crontab entry with ID {id} not found"))
            }
            CrontabEntryError::DuplicateName(_) => AppError::DuplicateName(
                "A crontab entry with this name already exists".to_string(),
            ),
            CrontabEntryError::Validation(msg) => AppError::InvalidInput(msg),
        }
    }
}
