pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1001,
///   "error": "VALIDATION_ERROR",
///   "message": "The given data was invalid.",
///   "details": { "price": ["The price must be at least 0."] }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Numeric code for logging and monitoring
    pub code: i32,
    /// Machine-readable identifier, see [`ErrorCode`]
    pub error: String,
    pub message: String,
    /// Field name to list of messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Error type shared by all HTTP handlers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryRejection(#[from] QueryRejection),

    #[error("Path extraction error: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonRejection(e) => e.status(),
            AppError::QueryRejection(_) | AppError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::PathRejection(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(DbErr::ConnectionAcquire(_)) | AppError::ServiceUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Database(DbErr::RecordNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::JsonRejection(_) => ErrorCode::InvalidJson,
            AppError::QueryRejection(_) => ErrorCode::InvalidQuery,
            AppError::PathRejection(_) => ErrorCode::InvalidPathParam,
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::Database(DbErr::ConnectionAcquire(_)) => ErrorCode::DatabaseUnavailable,
            AppError::Database(DbErr::RecordNotFound(_)) | AppError::NotFound(_) => {
                ErrorCode::NotFound
            }
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let body = match self {
            AppError::JsonRejection(e) => {
                tracing::warn!(error_code = code.code(), "JSON extraction error: {}", e);
                ErrorResponse::new(code, e.body_text())
            }
            AppError::QueryRejection(e) => {
                tracing::warn!(error_code = code.code(), "Query extraction error: {}", e);
                ErrorResponse::new(code, e.body_text())
            }
            AppError::PathRejection(e) => {
                tracing::warn!(error_code = code.code(), "Path extraction error: {}", e);
                ErrorResponse::new(code, e.body_text())
            }
            AppError::Validation(e) => {
                tracing::info!(error_code = code.code(), "Validation failed: {}", e);
                ErrorResponse::new(code, code.default_message()).with_details(validation_details(&e))
            }
            AppError::Database(e) => {
                tracing::error!(error_code = code.code(), "Database error: {:?}", e);
                ErrorResponse::new(code, code.default_message())
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = code.code(), "Bad request: {}", msg);
                ErrorResponse::new(code, msg)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = code.code(), "Not found: {}", msg);
                ErrorResponse::new(code, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", msg);
                ErrorResponse::new(code, code.default_message())
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(error_code = code.code(), "Service unavailable: {}", msg);
                ErrorResponse::new(code, msg)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Flatten validator output into `{ "field": ["message", ...] }`.
///
/// Errors without a custom message fall back to their rule code so a client
/// always gets at least one string per failing field.
pub fn validation_details(errors: &ValidationErrors) -> Value {
    let mut fields = Map::new();

    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|err| {
                let text = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid ({}).", field, err.code));
                Value::String(text)
            })
            .collect();
        fields.insert(field.to_string(), Value::Array(messages));
    }

    Value::Object(fields)
}

pub fn error_response(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use validator::ValidationError;

    fn errors_on(fields: &[(&'static str, &'static str)]) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for &(field, message) in fields {
            errors.add(
                field,
                ValidationError::new("custom").with_message(Cow::Borrowed(message)),
            );
        }
        errors
    }

    #[test]
    fn test_validation_details_groups_messages_per_field() {
        let errors = errors_on(&[
            ("name", "The name field is required."),
            ("name", "The name may not be greater than 255 characters."),
            ("price", "The price must be at least 0."),
        ]);

        let details = validation_details(&errors);

        assert_eq!(details["name"].as_array().unwrap().len(), 2);
        assert_eq!(details["price"][0], "The price must be at least 0.");
    }

    #[test]
    fn test_validation_details_falls_back_to_rule_code() {
        let mut errors = ValidationErrors::new();
        errors.add("stock", ValidationError::new("range"));

        let details = validation_details(&errors);
        assert_eq!(details["stock"][0], "The stock field is invalid (range).");
    }

    #[test]
    fn test_validation_maps_to_422() {
        let err = AppError::Validation(errors_on(&[("sort", "bad")]));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::NotFound("Product 7 not found".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_database_errors() {
        let err = AppError::Database(DbErr::Custom("boom".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), ErrorCode::DatabaseError);

        let err = AppError::Database(DbErr::RecordNotFound("products".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
