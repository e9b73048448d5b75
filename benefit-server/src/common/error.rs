//! Unified Error Handling
//!
//! Application-wide error type and the response envelope every handler
//! returns.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::orders::{storage::StorageError, OrderError};

/// Unified API response structure
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Business Logic Errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not due: {0}")]
    NotDue(String),

    #[error("Not undoable: {0}")]
    NotUndoable(String),

    // ========== System Errors ==========
    /// Retryable contention on the id sequence lock
    #[error("Busy: {0}")]
    Busy(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Lifecycle rule violations (422)
            AppError::InvalidState(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0005", msg.clone())
            }
            AppError::NotDue(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "E0007", msg.clone()),

            // Undo window closed or entry spent (409)
            AppError::NotUndoable(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),

            // Retryable contention (503)
            AppError::Busy(msg) => (StatusCode::SERVICE_UNAVAILABLE, "E9003", msg.clone()),

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Validation(msg) => AppError::Validation(msg),
            OrderError::UnknownEmployee(id) => AppError::Validation(format!("unknown employee {id}")),
            OrderError::UnknownItem(name) => AppError::Validation(format!("unknown item {name}")),
            OrderError::InvalidState { .. } => AppError::InvalidState(e.to_string()),
            OrderError::NothingReceived(_) => AppError::Validation(e.to_string()),
            OrderError::NotDue(_, _) => AppError::NotDue(e.to_string()),
            OrderError::LockTimeout => AppError::Busy(e.to_string()),
            OrderError::NotUndoable(_, _) => AppError::NotUndoable(e.to_string()),
            OrderError::OrderNotFound(_) | OrderError::LineNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            OrderError::Storage(inner) => AppError::from(inner),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::OrderNotFound(id) => AppError::NotFound(format!("order {id}")),
            StorageError::LineNotFound(id) => AppError::NotFound(format!("line {id}")),
            other => AppError::Database(other.to_string()),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;

    #[test]
    fn order_errors_map_to_the_right_status_family() {
        let cases = [
            (
                AppError::from(OrderError::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(OrderError::invalid_state(
                    "ORD-2026-0001",
                    OrderStatus::Active,
                    "receive",
                )),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(OrderError::LockTimeout),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::from(OrderError::OrderNotFound("ORD-2026-0001".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(OrderError::NotUndoable("a".into(), "expired".into())),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
