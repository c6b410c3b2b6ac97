/// Health check endpoint

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{app::AppState, error::ApiResult};

/// `GET /health`
///
/// Public liveness probe; also verifies database reachability.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let database = match keygate_shared::db::pool::health_check(&state.db).await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = %err, "Database health check failed");
            "unavailable"
        }
    };

    Ok(Json(json!({
        "status": "ok",
        "version": keygate_shared::VERSION,
        "database": database,
    })))
}
