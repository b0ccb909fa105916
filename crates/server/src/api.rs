//! HTTP surface for requisitions.
//!
//! - `GET  /`                                front page (HTML)
//! - `POST /api/requisitions`                submit a requisition
//! - `GET  /api/requisitions`                list every requisition
//! - `POST /api/requisitions/{id}/approve`   approve a pending requisition

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqtrack_core::domain::requisition::{Requisition, RequisitionDraft, RequisitionId};
use reqtrack_core::errors::{ApplicationError, ErrorClass};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::lifecycle::RequisitionLifecycle;

const INDEX_HTML: &str = include_str!("../../../templates/index.html");

#[derive(Clone)]
pub struct ApiState {
    lifecycle: Arc<RequisitionLifecycle>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    pub approver_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Application(#[from] ApplicationError),
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Requisition {0} not found")]
    UnknownId(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let application = match self {
            ApiError::InvalidJson => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid JSON" })))
                    .into_response();
            }
            ApiError::UnknownId(raw_id) => {
                let message = format!("Requisition {raw_id} not found");
                return (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response();
            }
            ApiError::Application(application) => application,
        };

        let (status, body) = match application.class() {
            ErrorClass::Validation => {
                (StatusCode::BAD_REQUEST, json!({ "error": application.to_string() }))
            }
            ErrorClass::Conflict => {
                (StatusCode::BAD_REQUEST, json!({ "message": application.to_string() }))
            }
            ErrorClass::NotFound => {
                (StatusCode::NOT_FOUND, json!({ "error": application.to_string() }))
            }
            ErrorClass::Unavailable | ErrorClass::Internal => {
                error!(
                    event_name = "requisition.api.internal_error",
                    error_class = application.class().as_str(),
                    error = %application,
                    "requisition request failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "an internal error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(lifecycle: Arc<RequisitionLifecycle>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/api/requisitions", get(list_requisitions).post(create_requisition))
        .route("/api/requisitions/{id}/approve", post(approve_requisition))
        .with_state(ApiState { lifecycle })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn create_requisition(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Requisition>), ApiError> {
    let Json(value) = payload.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "requisition body rejected");
        ApiError::InvalidJson
    })?;
    let draft = parse_draft(value)?;

    let created = state.lifecycle.create(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_requisitions(
    State(state): State<ApiState>,
) -> Result<Json<Vec<Requisition>>, ApiError> {
    Ok(Json(state.lifecycle.list().await?))
}

async fn approve_requisition(
    Path(raw_id): Path<String>,
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<Requisition>, ApiError> {
    let id = parse_id(&raw_id)?;
    state.lifecycle.get(id).await?;
    let request = parse_approve_body(&body)?;

    let approved = state.lifecycle.approve(id, request.approver_name).await?;
    Ok(Json(approved))
}

/// Non-numeric identifiers cannot name a requisition, so they are reported as
/// not found rather than as a malformed request.
fn parse_id(raw_id: &str) -> Result<RequisitionId, ApiError> {
    raw_id
        .parse::<i64>()
        .map(RequisitionId)
        .map_err(|_| ApiError::UnknownId(raw_id.to_string()))
}

/// Only a non-empty JSON object can carry a submission.
fn parse_draft(value: Value) -> Result<RequisitionDraft, ApiError> {
    match &value {
        Value::Object(fields) if !fields.is_empty() => {}
        _ => return Err(ApiError::InvalidJson),
    }

    serde_json::from_value(value).map_err(|error| {
        debug!(reason = %error, "requisition body rejected");
        ApiError::InvalidJson
    })
}

/// An empty body or a JSON `null` means "no approver given".
fn parse_approve_body(body: &[u8]) -> Result<ApproveRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApproveRequest::default());
    }

    let value = serde_json::from_slice::<Value>(body).map_err(|error| {
        debug!(reason = %error, "approve body rejected");
        ApiError::InvalidJson
    })?;

    if value.is_null() {
        return Ok(ApproveRequest::default());
    }
    if !value.is_object() {
        return Err(ApiError::InvalidJson);
    }

    serde_json::from_value(value).map_err(|error| {
        debug!(reason = %error, "approve body rejected");
        ApiError::InvalidJson
    })
}
