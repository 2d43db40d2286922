//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::postgres::check_health;
use serde_json::Value;

use crate::state::AppState;

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database: HealthCheckFuture<'_> =
        Box::pin(async { check_health(&state.db).await.map_err(|e| e.to_string()) });

    run_health_checks(vec![("database", database)]).await
}

/// `/ready`: 200 once PostgreSQL answers, 503 otherwise
pub fn router(state: AppState) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
