/**
 * Plan Authority
 *
 * Pure permission decisions over a freshly read plan snapshot. Membership in
 * `writers` is the only edit right; public plans are additionally readable
 * by anyone, including anonymous callers.
 *
 * Nothing here touches storage. Keeping the snapshot fresh is the caller's job.
 */

use uuid::Uuid;

use crate::backend::plan::error::PlanError;
use crate::shared::Plan;

/// Outcome of a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Authorized,
    NotFound,
    Forbidden,
}

impl Access {
    /// Turn a denial into the matching `PlanError`
    pub fn require(self, plan_id: i64, user_id: Option<Uuid>) -> Result<(), PlanError> {
        match self {
            Access::Authorized => Ok(()),
            Access::NotFound => Err(PlanError::PlanNotFound { plan_id }),
            Access::Forbidden => Err(PlanError::Forbidden { plan_id, user_id }),
        }
    }
}

/// Edit access: the user must be one of the plan's writers
pub fn check_authority(plan: Option<&Plan>, user_id: Uuid) -> Access {
    match plan {
        None => Access::NotFound,
        Some(plan) if plan.has_writer(user_id) => Access::Authorized,
        Some(_) => Access::Forbidden,
    }
}

/// Read access: writers always, everyone else only on public plans
pub fn check_read_access(plan: Option<&Plan>, user_id: Option<Uuid>) -> Access {
    match plan {
        None => Access::NotFound,
        Some(plan) if plan.is_public => Access::Authorized,
        Some(plan) => match user_id {
            Some(user_id) if plan.has_writer(user_id) => Access::Authorized,
            _ => Access::Forbidden,
        },
    }
}
