//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! - **[`errors`]**: [`AppError`] and the uniform [`ErrorResponse`] body
//! - **[`extractors`]**: field-by-field JSON and query input, integer ids, caller identity
//! - **[`audit`]**: structured audit events on the `audit` tracing target
//! - **[`server`]**: router assembly with OpenAPI docs, health checks, shutdown
//! - **[`http`]**: CORS and security header layers

pub mod audit;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_env, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse, validation_details};

pub use extractors::{
    FieldReader, FromFields, IdPath, RequestIdentity, USER_ID_HEADER, Unchecked, ValidatedQuery,
};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
