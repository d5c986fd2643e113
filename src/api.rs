//! HTTP API over the contact document.
//!
//! Thin handlers: payloads are validated here at the write boundary, then
//! handed to the store. Evaluation semantics live in `reminders`; the API
//! never reimplements them.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::models::{AppData, CircleUpdate, ContactUpdate, NewContact};
use crate::notifier::NotificationDispatcher;
use crate::scheduler::SchedulerTelemetry;
use crate::traits::{DataStore, PermissionProvider};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("validation failed")]
    Validation(Vec<String>),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Validation failed", "details": details })),
            )
                .into_response(),
            ApiError::Internal(e) => {
                error!(error = %e, "API handler failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

fn ensure_valid(errors: Vec<String>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn DataStore>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub permissions: Arc<dyn PermissionProvider>,
    pub telemetry: Arc<SchedulerTelemetry>,
    pub started_at: DateTime<Utc>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route(
            "/api/contacts/{id}",
            put(update_contact).delete(delete_contact),
        )
        .route("/api/contacts/{id}/contacted", post(mark_contacted))
        .route("/api/circles", get(list_circles))
        .route("/api/circles/{id}", put(update_circle))
        .route("/api/settings", get(get_settings).put(put_settings))
        .route("/api/data", get(get_data).put(put_data))
        .route("/api/notifications/test", post(test_notification))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn status(State(state): State<ApiState>) -> Result<Json<serde_json::Value>, ApiError> {
    let data = state.store.load_all().await?;
    Ok(Json(json!({
        "uptimeSecs": (Utc::now() - state.started_at).num_seconds(),
        "contacts": data.contacts.len(),
        "circles": data.circles.len(),
        "notificationPermission": state.permissions.current_permission().as_str(),
        "scheduler": state.telemetry.snapshot(),
    })))
}

async fn list_contacts(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let data = state.store.load_all().await?;
    Ok(Json(data.contacts).into_response())
}

async fn create_contact(
    State(state): State<ApiState>,
    Json(draft): Json<NewContact>,
) -> Result<Response, ApiError> {
    ensure_valid(draft.validate(Local::now().date_naive()))?;
    let contact = state.store.create_contact(draft).await?;
    Ok((StatusCode::CREATED, Json(contact)).into_response())
}

async fn update_contact(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(update): Json<ContactUpdate>,
) -> Result<Response, ApiError> {
    ensure_valid(update.validate(Local::now().date_naive()))?;
    match state.store.update_contact(&id, update).await? {
        Some(contact) => Ok(Json(contact).into_response()),
        None => Err(ApiError::NotFound("Contact not found".to_string())),
    }
}

async fn delete_contact(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if state.store.delete_contact(&id).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(ApiError::NotFound("Contact not found".to_string()))
    }
}

async fn mark_contacted(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.store.mark_contacted(&id).await? {
        Some(contact) => Ok(Json(contact).into_response()),
        None => Err(ApiError::NotFound("Contact not found".to_string())),
    }
}

async fn list_circles(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let data = state.store.load_all().await?;
    Ok(Json(data.circles).into_response())
}

async fn update_circle(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(update): Json<CircleUpdate>,
) -> Result<Response, ApiError> {
    ensure_valid(update.validate())?;
    match state.store.update_circle(&id, update).await? {
        Some(circle) => Ok(Json(circle).into_response()),
        None => Err(ApiError::NotFound("Circle not found".to_string())),
    }
}

async fn get_settings(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let data = state.store.load_all().await?;
    Ok(Json(data.settings).into_response())
}

/// Settings edits are partial; `lastCheck` is scheduler-owned and cannot be
/// set through this endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsUpdate {
    #[serde(default)]
    notification_times: Option<Vec<String>>,
    #[serde(default)]
    theme: Option<String>,
}

async fn put_settings(
    State(state): State<ApiState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Response, ApiError> {
    let data = state.store.load_all().await?;
    let mut settings = data.settings;
    if let Some(times) = update.notification_times {
        settings.notification_times = times;
    }
    if let Some(theme) = update.theme {
        settings.theme = theme;
    }
    ensure_valid(settings.validate())?;
    state.store.save_settings(&settings).await?;
    Ok(Json(settings).into_response())
}

async fn get_data(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let data = state.store.load_all().await?;
    Ok(Json(data).into_response())
}

/// Whole-document replacement, used for import/restore.
async fn put_data(
    State(state): State<ApiState>,
    Json(data): Json<AppData>,
) -> Result<Response, ApiError> {
    ensure_valid(data.settings.validate())?;
    state.store.replace_all(data.clone()).await?;
    Ok(Json(data).into_response())
}

#[derive(Debug, Deserialize)]
struct TestNotification {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

async fn test_notification(
    State(state): State<ApiState>,
    Json(req): Json<TestNotification>,
) -> Result<Response, ApiError> {
    let kind = req.kind.as_deref().unwrap_or("test");
    let message = req
        .message
        .as_deref()
        .unwrap_or("Notifications are working!");
    let handle = state.dispatcher.dispatch_test(kind, message);
    Ok(Json(json!({ "sent": handle.is_some(), "notification": handle })).into_response())
}
