//! JSON error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scaleplan_error::{WorkflowError, WorkflowErrorKind};
use serde_json::json;
use tracing::{error, warn};

/// An error answered as `{"error": ...}` with an optional `raw` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    raw: Option<String>,
}

impl ApiError {
    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 for an unknown session.
    pub fn session_not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Session {} not found", id))
    }

    /// 409 while another action on the session is running.
    pub fn busy() -> Self {
        Self::new(
            StatusCode::CONFLICT,
            "Another action is already running for this session",
        )
    }

    /// 500 for failures outside the workflow itself.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            raw: None,
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err.kind {
            WorkflowErrorKind::Validation(message) => {
                warn!(message = %message, "Rejected request");
                Self::bad_request(message)
            }
            WorkflowErrorKind::MalformedExtraction { reason, raw } => {
                error!(reason = %reason, "Extraction response was incomplete");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Failed to parse extracted data".to_string(),
                    raw: Some(raw),
                }
            }
            kind if kind.is_client_error() => {
                warn!(error = %kind, "Action not allowed");
                Self::new(StatusCode::CONFLICT, kind.to_string())
            }
            kind => {
                error!(error = %kind, "Stage failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, kind.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
            other => other,
        };
        Self::new(status, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.raw {
            Some(raw) => json!({"error": self.message, "raw": raw}),
            None => json!({"error": self.message}),
        };
        (self.status, Json(body)).into_response()
    }
}
