//! Health check handler.

use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// Always 200; `status` is `degraded` when a dependency is unreachable.
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let database = complyhub_database::connection::health_check(&state.db_pool)
        .await
        .unwrap_or(false);
    let storage = state.storage_manager.health_check().await;

    ApiResponse::ok(
        "Health check",
        HealthResponse {
            status: if database && storage { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            database,
            storage,
        },
    )
}
