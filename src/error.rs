//! Error types for the Booksys server

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Field-keyed validation messages. Serialized directly as the body of a
/// 400 response, e.g. `{"rating": ["rating must be between 0.0 and 5.0"]}`.
/// Multiple simultaneous field errors are all reported together.
#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ok when no errors were collected, otherwise a validation error.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, messages.join(", "))?;
            first = false;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", error.code));
                out.push(field.to_string(), message);
            }
        }
        out
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error on a single payload field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }
}

/// Error response body for non-validation errors
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::Validation(fields) => {
                return (StatusCode::BAD_REQUEST, Json(fields)).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Database(e) => {
                // Uniqueness and restrict-delete violations from the store are
                // client errors, not server failures.
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        (
                            StatusCode::CONFLICT,
                            "conflict",
                            "a record with this value already exists".to_string(),
                        )
                    } else if db.is_foreign_key_violation() {
                        (
                            StatusCode::CONFLICT,
                            "conflict",
                            "operation violates a referential integrity constraint".to_string(),
                        )
                    } else {
                        tracing::error!("Database error: {:?}", e);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "database_error",
                            "Database error".to_string(),
                        )
                    }
                } else {
                    tracing::error!("Database error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "database_error",
                        "Database error".to_string(),
                    )
                }
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_collect_multiple_fields() {
        let mut errors = FieldErrors::new();
        errors.push("lent_by", "This field is required when the copy is lent.");
        errors.push("return_date", "This field is required when the copy is lent.");
        assert_eq!(errors.0.len(), 2);
        assert!(errors.0.contains_key("lent_by"));
        assert!(errors.0.contains_key("return_date"));
    }

    #[test]
    fn field_errors_serialize_as_plain_map() {
        let errors = FieldErrors::single("rating", "rating must be between 0.0 and 5.0");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"rating": ["rating must be between 0.0 and 5.0"]})
        );
    }

    #[test]
    fn merge_appends_messages_for_the_same_field() {
        let mut errors = FieldErrors::single("authors", "first");
        errors.merge(FieldErrors::single("authors", "second"));
        assert_eq!(errors.0["authors"], vec!["first", "second"]);
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(FieldErrors::new().into_result().is_ok());
        assert!(FieldErrors::single("x", "y").into_result().is_err());
    }
}
