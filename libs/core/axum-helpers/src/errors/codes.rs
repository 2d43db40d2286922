//! Stable error codes shared by every error response.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000s)
    /// One or more fields failed validation
    ValidationError,
    /// Path parameter could not be parsed
    InvalidPathParam,
    /// Request body is not the expected JSON
    InvalidJson,
    /// Query string could not be deserialized
    InvalidQuery,
    NotFound,
    MethodNotAllowed,
    BadRequest,

    // Server errors (5000s)
    InternalError,
    ServiceUnavailable,

    // Storage errors (2000s)
    DatabaseError,
    DatabaseUnavailable,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidPathParam => "INVALID_PATH_PARAM",
            ErrorCode::InvalidJson => "INVALID_JSON",
            ErrorCode::InvalidQuery => "INVALID_QUERY",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
        }
    }

    /// Numeric code for log aggregation and alerting.
    pub const fn code(&self) -> i32 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidPathParam => 1002,
            ErrorCode::InvalidJson => 1003,
            ErrorCode::NotFound => 1004,
            ErrorCode::InvalidQuery => 1005,
            ErrorCode::MethodNotAllowed => 1006,
            ErrorCode::BadRequest => 1007,
            ErrorCode::DatabaseError => 2001,
            ErrorCode::DatabaseUnavailable => 2002,
            ErrorCode::InternalError => 5000,
            ErrorCode::ServiceUnavailable => 5003,
        }
    }

    pub const fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "The given data was invalid.",
            ErrorCode::InvalidPathParam => "Invalid path parameter.",
            ErrorCode::InvalidJson => "Invalid JSON body.",
            ErrorCode::InvalidQuery => "Invalid query string.",
            ErrorCode::NotFound => "The requested resource was not found.",
            ErrorCode::MethodNotAllowed => "The HTTP method is not allowed for this resource.",
            ErrorCode::BadRequest => "Bad request.",
            ErrorCode::InternalError => "An unexpected error occurred.",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable.",
            ErrorCode::DatabaseError => "A database error occurred.",
            ErrorCode::DatabaseUnavailable => "The database is temporarily unavailable.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
