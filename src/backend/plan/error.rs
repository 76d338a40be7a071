/**
 * Plan Error Types
 *
 * Every failure a plan operation can report. All of them are detected before
 * the coordinator issues a mutating repository call, so a rejected request
 * never has a partial effect.
 *
 * # Error Categories
 *
 * - **Not found**: `PlanNotFound`, `RouteNotFound`, `UserNotFound`
 * - **Authorization**: `Forbidden`, `LockedPlan`, `Unlocked`
 * - **Validation**: `IllegalDayIndex`, `RouteNotInPlan`, `InvalidSchedule`,
 *   `InvalidRequest`
 * - **Conflict**: `DuplicatedWriter`, `DuplicatedLike`
 * - **Infrastructure**: `Lease`, `Repository`
 *
 * Each variant has a stable code (`PLAN-001`...) that clients can match on.
 */

use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::lock::LeaseError;
use crate::shared::SharedError;

/// Errors raised by the persistent plan store
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row the store just wrote or referenced is gone
    #[error("{entity} {id} not found")]
    MissingRow { entity: &'static str, id: String },
}

impl RepositoryError {
    pub fn missing(entity: &'static str, id: impl ToString) -> Self {
        Self::MissingRow {
            entity,
            id: id.to_string(),
        }
    }
}

/// Plan operation errors
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Plan {plan_id} not found")]
    PlanNotFound { plan_id: i64 },

    #[error("Plan {plan_id} is already in the requested like state")]
    DuplicatedLike { plan_id: i64 },

    #[error("No permission on plan {plan_id}")]
    Forbidden { plan_id: i64, user_id: Option<Uuid> },

    /// Another user holds the plan's lease
    #[error("Plan {plan_id} is locked by another user")]
    LockedPlan { plan_id: i64, holder: Option<Uuid> },

    #[error("Day index {day_index} is outside the schedule of plan {plan_id}")]
    IllegalDayIndex { plan_id: i64, day_index: i32 },

    /// The operation needs a lease the caller never took
    #[error("Plan {plan_id} must be locked before editing its routes")]
    Unlocked { plan_id: i64 },

    #[error("User {email} not found")]
    UserNotFound { email: String },

    #[error("User {user_id} already writes plan {plan_id}")]
    DuplicatedWriter { plan_id: i64, user_id: Uuid },

    #[error("Route {route_id} does not belong to plan {plan_id}")]
    RouteNotInPlan { plan_id: i64, route_id: i64 },

    #[error("Route {route_id} not found")]
    RouteNotFound { route_id: i64 },

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(SharedError),

    /// A request field failed validation
    #[error(transparent)]
    InvalidRequest(SharedError),

    #[error(transparent)]
    Lease(#[from] LeaseError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl PlanError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::PlanNotFound { .. } => "PLAN-001",
            Self::DuplicatedLike { .. } => "PLAN-002",
            Self::Forbidden { .. } => "PLAN-003",
            Self::LockedPlan { .. } => "PLAN-004",
            Self::IllegalDayIndex { .. } => "PLAN-005",
            Self::Unlocked { .. } => "PLAN-006",
            Self::UserNotFound { .. } => "PLAN-007",
            Self::DuplicatedWriter { .. } => "PLAN-008",
            Self::RouteNotInPlan { .. } => "PLAN-009",
            Self::RouteNotFound { .. } => "PLAN-010",
            Self::InvalidSchedule(_) => "PLAN-012",
            Self::InvalidRequest(_) => "COMMON-400",
            Self::Lease(_) | Self::Repository(_) => "COMMON-500",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PlanNotFound { .. } | Self::UserNotFound { .. } | Self::RouteNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::Forbidden { .. } | Self::LockedPlan { .. } | Self::Unlocked { .. } => {
                StatusCode::FORBIDDEN
            }
            Self::DuplicatedLike { .. }
            | Self::IllegalDayIndex { .. }
            | Self::DuplicatedWriter { .. }
            | Self::RouteNotInPlan { .. }
            | Self::InvalidSchedule(_)
            | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Lease(_) | Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is an infrastructure failure rather than a rejected request
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Lease(_) | Self::Repository(_))
    }
}
