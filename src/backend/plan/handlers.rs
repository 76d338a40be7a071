/**
 * Plan HTTP Handlers
 *
 * Thin axum adapters over `PlanCoordinator`: extract the path, caller and
 * body, run the operation, wrap the result in JSON. All decisions are made
 * by the coordinator. Bodies go through `JsonBody` so decoding failures
 * share the JSON error format.
 */

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::backend::middleware::json::JsonBody;
use crate::backend::plan::coordinator::PlanCoordinator;
use crate::shared::requests::{
    ActionResponse, AddAttractionRequest, CreatePlanRequest, InviteRequest, LockStatusResponse,
    LockSuccessResponse, ScheduleRequest, UpdatePlanRequest, UpdateRouteRequest, UpdateRoutesRequest,
};
use crate::shared::{PlanView, Schedule};

type HandlerResult<T> = Result<Json<T>, BackendError>;

/// `POST /v1/plans`
pub async fn add_plan(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanView>), BackendError> {
    let view = coordinator.add_plan(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /v1/plans/{plan_id}`
pub async fn get_plan_detail(
    State(coordinator): State<Arc<PlanCoordinator>>,
    user: MaybeAuthUser,
    Path(plan_id): Path<i64>,
) -> HandlerResult<PlanView> {
    Ok(Json(coordinator.get_plan_detail(plan_id, user.user_id()).await?))
}

/// `PUT /v1/plans/{plan_id}`
pub async fn update_plan(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
    JsonBody(request): JsonBody<UpdatePlanRequest>,
) -> HandlerResult<PlanView> {
    Ok(Json(coordinator.update_plan(plan_id, user.user_id, request).await?))
}

/// `GET /v1/plans/{plan_id}/lock-check`
pub async fn check_lock(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
) -> HandlerResult<LockStatusResponse> {
    Ok(Json(coordinator.check_lock(plan_id, user.user_id).await?))
}

/// `POST /v1/plans/{plan_id}/lock`
pub async fn lock_plan(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
) -> HandlerResult<LockSuccessResponse> {
    let success = coordinator.lock_plan(plan_id, user.user_id).await?;
    Ok(Json(LockSuccessResponse { success }))
}

/// `POST /v1/plans/{plan_id}/unlock`
pub async fn release_lock(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
) -> HandlerResult<LockSuccessResponse> {
    let success = coordinator.release_lock(plan_id, user.user_id).await?;
    Ok(Json(LockSuccessResponse { success }))
}

/// `PUT /v1/plans/{plan_id}/schedule`
pub async fn update_schedule(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
    JsonBody(request): JsonBody<ScheduleRequest>,
) -> HandlerResult<PlanView> {
    let schedule = Schedule {
        start_date: request.start_date,
        end_date: request.end_date,
    };
    Ok(Json(coordinator.update_schedule(plan_id, user.user_id, schedule).await?))
}

/// `POST /v1/plans/{plan_id}/attraction`
pub async fn add_attraction(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
    JsonBody(request): JsonBody<AddAttractionRequest>,
) -> HandlerResult<PlanView> {
    Ok(Json(coordinator.add_attraction(plan_id, user.user_id, request).await?))
}

/// `PATCH /v1/plans/{plan_id}/attraction`
pub async fn update_plan_routes(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
    JsonBody(request): JsonBody<UpdateRoutesRequest>,
) -> HandlerResult<PlanView> {
    Ok(Json(
        coordinator
            .update_plan_routes(plan_id, user.user_id, &request.routes)
            .await?,
    ))
}

/// `PUT /v1/plans/{plan_id}/routes/{route_id}`
pub async fn update_route(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path((plan_id, route_id)): Path<(i64, i64)>,
    JsonBody(request): JsonBody<UpdateRouteRequest>,
) -> HandlerResult<PlanView> {
    Ok(Json(
        coordinator
            .update_route(plan_id, route_id, user.user_id, request)
            .await?,
    ))
}

/// `POST /v1/plans/{plan_id}/leave`
pub async fn leave_plan(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
) -> HandlerResult<ActionResponse> {
    let success = coordinator.leave_plan(plan_id, user.user_id).await?;
    Ok(Json(ActionResponse { success }))
}

/// `POST /v1/plans/{plan_id}/invite`
pub async fn invite_plan(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
    JsonBody(request): JsonBody<InviteRequest>,
) -> HandlerResult<ActionResponse> {
    let success = coordinator.invite_plan(plan_id, user.user_id, &request.email).await?;
    Ok(Json(ActionResponse { success }))
}

/// `POST /v1/plans/{plan_id}/like`
pub async fn like_plan(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
) -> HandlerResult<ActionResponse> {
    let success = coordinator.like_plan(plan_id, user.user_id).await?;
    Ok(Json(ActionResponse { success }))
}

/// `DELETE /v1/plans/{plan_id}/like`
pub async fn unlike_plan(
    State(coordinator): State<Arc<PlanCoordinator>>,
    AuthUser(user): AuthUser,
    Path(plan_id): Path<i64>,
) -> HandlerResult<ActionResponse> {
    let success = coordinator.unlike_plan(plan_id, user.user_id).await?;
    Ok(Json(ActionResponse { success }))
}
