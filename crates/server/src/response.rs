use std::fmt::Display;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use frontdesk_core::errors::{ApplicationError, InterfaceError};

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult = Result<Json<Value>, ApiError>;

pub fn failure(status: StatusCode, message: impl Display) -> ApiError {
    (status, Json(json!({"success": false, "error": message.to_string()})))
}

/// Logs the fault under a fresh correlation id and answers with the user-safe message.
pub fn application_failure(error: ApplicationError, operation: &'static str) -> ApiError {
    let correlation_id = Uuid::new_v4().to_string();
    error!(
        event_name = "server.request_failed",
        operation,
        correlation_id = %correlation_id,
        error = %error,
        "request failed"
    );
    interface_failure(&error.into_interface(correlation_id))
}

pub fn interface_failure(error: &InterfaceError) -> ApiError {
    let status = match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({
            "success": false,
            "error": error.user_message(),
            "correlation_id": error.correlation_id(),
        })),
    )
}
