//! HTTP API for queue administration and metrics.

use crate::{AdminService, BotMetrics};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use bluejay_core::QueueStatus;
use bluejay_error::{BluejayError, BluejayErrorKind, QueueErrorKind};
use bluejay_security::ApprovalMode;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// API state shared by all handlers.
#[derive(Clone)]
pub struct ApiState {
    admin: Arc<AdminService>,
    metrics: BotMetrics,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(admin: Arc<AdminService>, metrics: BotMetrics) -> Self {
        Self { admin, metrics }
    }
}

/// Creates the admin API router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/queue", get(list_queue))
        .route("/queue/:id/approve", post(approve))
        .route("/queue/:id/reject", post(reject))
        .route("/bots/:handle/approval", get(get_approval).post(set_approval))
        .with_state(state)
}

struct ApiError(BluejayError);

impl From<BluejayError> for ApiError {
    fn from(err: BluejayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            BluejayErrorKind::Queue(e) => match e.kind {
                QueueErrorKind::ItemNotFound(_) | QueueErrorKind::UnknownBot(_) => {
                    StatusCode::NOT_FOUND
                }
                QueueErrorKind::InvalidTransition { .. } => StatusCode::CONFLICT,
            },
            BluejayErrorKind::Transport(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({"ok": false, "error": self.0.to_string()}))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct QueueQuery {
    status: Option<QueueStatus>,
}

#[derive(Debug, Deserialize)]
struct ApprovalBody {
    mode: ApprovalMode,
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Get current metrics snapshot.
async fn get_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.metrics.snapshot()))
}

/// Queue items, `pending` unless another status is asked for.
async fn list_queue(
    State(state): State<ApiState>,
    Query(query): Query<QueueQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query.status.unwrap_or(QueueStatus::Pending);
    let items = state.admin.list_queue(Some(status)).await?;
    Ok(Json(items))
}

async fn approve(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.admin.approve(id).await?;
    Ok(Json(json!({"ok": true, "item": item})))
}

async fn reject(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.admin.reject(id).await?;
    Ok(Json(json!({"ok": true, "item": item})))
}

async fn get_approval(
    State(state): State<ApiState>,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let required = state.admin.approval_mode(&handle).await?;
    Ok(Json(json!({"handle": handle, "approval_mode": required})))
}

async fn set_approval(
    State(state): State<ApiState>,
    Path(handle): Path<String>,
    Json(body): Json<ApprovalBody>,
) -> Result<impl IntoResponse, ApiError> {
    state.admin.set_approval_mode(&handle, body.mode).await?;
    let required = state.admin.approval_mode(&handle).await?;
    Ok(Json(json!({"ok": true, "handle": handle, "approval_mode": required})))
}
