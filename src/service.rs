//! HTTP surface over the task store.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::store::TaskStore;
use crate::task::{Task, TaskDraft, TaskFields, TaskId};
use crate::validation;

pub const BASE_PATH: &str = "/api";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
}

/// Build the router: task routes under [`BASE_PATH`] plus `/health`.
pub fn build_router(store: Arc<dyn TaskStore>) -> Router {
    let tasks = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", put(update_task).delete(delete_task));

    Router::new()
        .nest(BASE_PATH, tasks)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(AppState { store })
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ServiceError> {
    let tasks = state
        .store
        .find_all()
        .await
        .map_err(|e| ServiceError::storage("Error fetching tasks.", e))?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let fields = validated(payload, today())?;
    let task = state
        .store
        .insert(fields)
        .await
        .map_err(|e| ServiceError::storage("Error creating task.", e))?;
    info!(id = %task.id, "Created task");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> Result<Json<Task>, ServiceError> {
    let fields = validated(payload, today())?;
    let id = parse_id(&id)?;
    let task = state
        .store
        .update(id, fields)
        .await
        .map_err(|e| ServiceError::storage("Error updating task.", e))?
        .ok_or(ServiceError::NotFound)?;
    info!(id = %task.id, "Updated task");
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    let id = parse_id(&id)?;
    let task = state
        .store
        .delete(id)
        .await
        .map_err(|e| ServiceError::storage("Error deleting task.", e))?
        .ok_or(ServiceError::NotFound)?;
    info!(id = %task.id, "Deleted task");
    Ok(Json(json!({ "message": "Task deleted successfully." })))
}

/// Runs before any store access; create and update share it.
fn validated(
    payload: Result<Json<TaskDraft>, JsonRejection>,
    today: NaiveDate,
) -> Result<TaskFields, ServiceError> {
    let Json(draft) = payload.map_err(|rejection| ServiceError::Validation(rejection.body_text()))?;
    debug!(?draft, "Received task draft");
    validation::validate(&draft, today).map_err(|errors| match errors.first() {
        Some(err) => err.into(),
        None => ServiceError::Validation("Invalid task.".to_string()),
    })
}

/// Malformed ids can never match a stored task.
fn parse_id(raw: &str) -> Result<TaskId, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
