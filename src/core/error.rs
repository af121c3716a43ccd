use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::modules::storage::StorageError;
use crate::shared::types::ApiResponse;

/// A single rejected input field, reported alongside its siblings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn describe_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid fields: {}", describe_violations(.0))]
    InvalidFields(Vec<FieldViolation>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Field names rejected by validation, empty for every other variant
    pub fn invalid_fields(&self) -> Vec<&str> {
        match self {
            AppError::InvalidFields(violations) => {
                violations.iter().map(|v| v.field.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::Storage(StorageError::NotFound(ref name)) => (
                StatusCode::NOT_FOUND,
                format!("Asset '{}' not found", name),
                None,
            ),
            AppError::Storage(StorageError::InvalidName(ref name)) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid asset name '{}'", name),
                None,
            ),
            AppError::Storage(StorageError::EmptyPayload) => (
                StatusCode::BAD_REQUEST,
                "Asset payload is empty".to_string(),
                None,
            ),
            AppError::Storage(ref e) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Asset storage error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::InvalidFields(ref violations) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(
                    violations
                        .iter()
                        .map(|v| format!("{}: {}", v.field, v.message))
                        .collect(),
                ),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
