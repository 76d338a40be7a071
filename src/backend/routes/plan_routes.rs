/**
 * Plan Route Configuration
 *
 * # Routes
 *
 * - `POST /v1/plans` - Create a plan
 * - `GET|PUT /v1/plans/{plan_id}` - Read (optional auth) / edit basic info
 * - `GET /v1/plans/{plan_id}/lock-check` - Lease status
 * - `POST /v1/plans/{plan_id}/lock` and `/unlock` - Take / release the lease
 * - `PUT /v1/plans/{plan_id}/schedule` - Move dates
 * - `POST|PATCH /v1/plans/{plan_id}/attraction` - Append a stop / reorder batch
 * - `PUT /v1/plans/{plan_id}/routes/{route_id}` - Visit time and memo
 * - `POST /v1/plans/{plan_id}/leave` and `/invite` - Writer membership
 * - `POST|DELETE /v1/plans/{plan_id}/like` - Like / unlike
 */

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::plan::handlers;
use crate::backend::server::state::AppState;

/// Add the plan API to the router
pub fn configure_plan_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/v1/plans", post(handlers::add_plan))
        .route(
            "/v1/plans/{plan_id}",
            get(handlers::get_plan_detail).put(handlers::update_plan),
        )
        .route("/v1/plans/{plan_id}/lock-check", get(handlers::check_lock))
        .route("/v1/plans/{plan_id}/lock", post(handlers::lock_plan))
        .route("/v1/plans/{plan_id}/unlock", post(handlers::release_lock))
        .route("/v1/plans/{plan_id}/schedule", put(handlers::update_schedule))
        .route(
            "/v1/plans/{plan_id}/attraction",
            post(handlers::add_attraction).patch(handlers::update_plan_routes),
        )
        .route(
            "/v1/plans/{plan_id}/routes/{route_id}",
            put(handlers::update_route),
        )
        .route("/v1/plans/{plan_id}/leave", post(handlers::leave_plan))
        .route("/v1/plans/{plan_id}/invite", post(handlers::invite_plan))
        .route(
            "/v1/plans/{plan_id}/like",
            post(handlers::like_plan).delete(handlers::unlike_plan),
        )
}
