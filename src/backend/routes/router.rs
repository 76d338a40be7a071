/**
 * Router Configuration
 *
 * Combines the plan API, the health check and the cross-cutting layers into
 * a single Axum router.
 *
 * # Layers
 *
 * Layers wrap the routes from the inside out:
 * 1. `auth_middleware` verifies bearer tokens
 * 2. `TraceLayer` logs every request and response
 */

use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use crate::backend::middleware::auth::auth_middleware;
use crate::backend::routes::plan_routes::configure_plan_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// - `GET /health` - Liveness check
/// - `/v1/plans/...` - Plan API (see `plan_routes`)
/// - Fallback - JSON 404
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/health", get(health));
    let router = configure_plan_routes(router);

    router
        .fallback(not_found)
        .layer(from_fn_with_state(app_state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health(axum::extract::State(app_state): axum::extract::State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "storage": if app_state.db_pool.is_some() { "postgres" } else { "memory" },
    }))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "code": "COMMON-404",
            "status": 404,
        })),
    )
}
