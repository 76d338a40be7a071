/**
 * Plan Coordinator
 *
 * The public plan operations. Each one reads a fresh plan snapshot, runs the
 * authority check, consults the plan lock where the operation needs it, and
 * only then calls the repository. All rejections happen before the first
 * mutating call.
 *
 * # Locking Policy
 *
 * - `update_schedule` is refused whenever *anyone* holds the lease, because
 *   shrinking the schedule deletes routes another editor may be moving.
 * - `update_plan_routes` requires the caller to hold the lease already. It is
 *   renewed before the batch is applied and released afterwards.
 * - `add_attraction`, `update_route` and the basic-info edits take no lease.
 *   An insert can therefore race an open reorder session on `order` values.
 *
 * No operation waits for a lease: contention is reported immediately.
 */

use std::sync::Arc;

use uuid::Uuid;

use crate::backend::auth::users::UserDirectory;
use crate::backend::lock::PlanLock;
use crate::backend::plan::authority::{check_authority, check_read_access};
use crate::backend::plan::error::PlanError;
use crate::backend::plan::repository::{NewPlan, PlanInfo, PlanRepository};
use crate::shared::requests::{
    AddAttractionRequest, CreatePlanRequest, LockStatusResponse, UpdatePlanRequest, UpdateRouteRequest,
};
use crate::shared::route::next_order_for_day;
use crate::shared::{NewRoute, Plan, PlanView, RouteBatch, RouteChange, Schedule, SharedError};

pub type PlanResult<T> = Result<T, PlanError>;

fn require_title(title: &str) -> PlanResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PlanError::InvalidRequest(SharedError::validation("title", "title cannot be empty")));
    }
    Ok(title.to_string())
}

/// Orchestrates authority checks, the plan lock and the repository
#[derive(Clone)]
pub struct PlanCoordinator {
    repository: Arc<dyn PlanRepository>,
    users: Arc<dyn UserDirectory>,
    lock: PlanLock,
}

impl PlanCoordinator {
    pub fn new(repository: Arc<dyn PlanRepository>, users: Arc<dyn UserDirectory>, lock: PlanLock) -> Self {
        Self { repository, users, lock }
    }

    pub fn lock(&self) -> &PlanLock {
        &self.lock
    }

    /// Fetch the plan and require `user_id` to be one of its writers
    async fn writable_plan(&self, plan_id: i64, user_id: Uuid) -> PlanResult<Plan> {
        let plan = self.repository.get_plan_by_id(plan_id, Some(user_id)).await?;
        check_authority(plan.as_ref(), user_id).require(plan_id, Some(user_id))?;
        plan.ok_or(PlanError::PlanNotFound { plan_id })
    }

    async fn readable_plan(&self, plan_id: i64, user_id: Option<Uuid>) -> PlanResult<Plan> {
        let plan = self.repository.get_plan_by_id(plan_id, user_id).await?;
        check_read_access(plan.as_ref(), user_id).require(plan_id, user_id)?;
        plan.ok_or(PlanError::PlanNotFound { plan_id })
    }

    async fn plan_view(&self, plan_id: i64, user_id: Option<Uuid>) -> PlanResult<PlanView> {
        self.repository
            .get_plan_by_id(plan_id, user_id)
            .await?
            .map(PlanView::from)
            .ok_or(PlanError::PlanNotFound { plan_id })
    }

    /// Plan with its routes grouped by date
    pub async fn get_plan_detail(&self, plan_id: i64, user_id: Option<Uuid>) -> PlanResult<PlanView> {
        Ok(self.readable_plan(plan_id, user_id).await?.into())
    }

    pub async fn check_lock(&self, plan_id: i64, user_id: Uuid) -> PlanResult<LockStatusResponse> {
        self.writable_plan(plan_id, user_id).await?;
        let holder = self.lock.holder(plan_id).await?;
        Ok(LockStatusResponse::new(plan_id, holder))
    }

    /// Take or renew the lease; `false` when someone else holds it
    pub async fn lock_plan(&self, plan_id: i64, user_id: Uuid) -> PlanResult<bool> {
        self.writable_plan(plan_id, user_id).await?;
        let acquired = self.lock.acquire(plan_id, user_id).await?;
        if !acquired {
            tracing::info!(plan_id, %user_id, "lock request refused, plan held by another writer");
        }
        Ok(acquired)
    }

    /// Release the caller's lease; `false` when the caller does not hold it
    pub async fn release_lock(&self, plan_id: i64, user_id: Uuid) -> PlanResult<bool> {
        self.writable_plan(plan_id, user_id).await?;
        Ok(self.lock.release(plan_id, user_id).await?)
    }

    /// Move the plan's dates, deleting routes past the new last day
    pub async fn update_schedule(&self, plan_id: i64, user_id: Uuid, schedule: Schedule) -> PlanResult<PlanView> {
        self.writable_plan(plan_id, user_id).await?;
        let schedule = Schedule::new(schedule.start_date, schedule.end_date).map_err(PlanError::InvalidSchedule)?;

        if let Some(holder) = self.lock.holder(plan_id).await? {
            tracing::warn!(plan_id, %user_id, %holder, "schedule change refused while plan is locked");
            return Err(PlanError::LockedPlan {
                plan_id,
                holder: Some(holder),
            });
        }

        let deleted = self.repository.update_schedule(plan_id, schedule).await?;
        tracing::info!(
            plan_id,
            start = %schedule.start_date,
            end = %schedule.end_date,
            deleted_routes = deleted,
            "updated plan schedule"
        );
        self.plan_view(plan_id, Some(user_id)).await
    }

    /// Append an attraction at the end of its day
    pub async fn add_attraction(
        &self,
        plan_id: i64,
        user_id: Uuid,
        request: AddAttractionRequest,
    ) -> PlanResult<PlanView> {
        let plan = self.writable_plan(plan_id, user_id).await?;
        if !plan.contains_day_index(request.day_index) {
            return Err(PlanError::IllegalDayIndex {
                plan_id,
                day_index: request.day_index,
            });
        }

        let order = next_order_for_day(&plan.routes, request.day_index).ok_or_else(|| {
            PlanError::InvalidRequest(SharedError::validation(
                "order",
                format!("day {} has no position left after order {}", request.day_index, i32::MAX),
            ))
        })?;
        let route = self
            .repository
            .insert_route(NewRoute {
                plan_id,
                attraction_id: request.attraction_id,
                day_index: request.day_index,
                order,
                visit_time: request.visit_time,
                memo: request.memo,
            })
            .await?;
        tracing::debug!(plan_id, route_id = route.route_id, day_index = route.day_index, order, "added route");

        self.plan_view(plan_id, Some(user_id)).await
    }

    /// Apply a reorder/delete batch inside the caller's edit session
    pub async fn update_plan_routes(
        &self,
        plan_id: i64,
        user_id: Uuid,
        changes: &[RouteChange],
    ) -> PlanResult<PlanView> {
        let plan = self.writable_plan(plan_id, user_id).await?;

        match self.lock.holder(plan_id).await? {
            None => return Err(PlanError::Unlocked { plan_id }),
            Some(holder) if holder != user_id => {
                return Err(PlanError::LockedPlan {
                    plan_id,
                    holder: Some(holder),
                })
            }
            Some(_) => {}
        }

        if !self.lock.acquire(plan_id, user_id).await? {
            // Lost between the check and the renewal.
            let holder = self.lock.holder(plan_id).await?;
            return Err(match holder {
                None => PlanError::Unlocked { plan_id },
                holder => PlanError::LockedPlan { plan_id, holder },
            });
        }

        let batch = RouteBatch::partition(changes);
        if let Some(placement) = batch
            .placements
            .iter()
            .find(|placement| !plan.contains_day_index(placement.day_index))
        {
            return Err(PlanError::IllegalDayIndex {
                plan_id,
                day_index: placement.day_index,
            });
        }

        if !batch.is_empty() {
            self.repository.apply_route_batch(plan_id, &batch).await?;
        }
        tracing::info!(
            plan_id,
            %user_id,
            moved = batch.placements.len(),
            deleted = batch.deletions.len(),
            "applied route batch"
        );

        self.lock.release_on_behalf(plan_id, user_id).await?;
        self.plan_view(plan_id, Some(user_id)).await
    }

    /// Edit the visit time and memo of one route
    pub async fn update_route(
        &self,
        plan_id: i64,
        route_id: i64,
        user_id: Uuid,
        request: UpdateRouteRequest,
    ) -> PlanResult<PlanView> {
        self.writable_plan(plan_id, user_id).await?;

        let route = self
            .repository
            .get_route_by_id(route_id)
            .await?
            .ok_or(PlanError::RouteNotFound { route_id })?;
        if route.plan_id != plan_id {
            return Err(PlanError::RouteNotInPlan { plan_id, route_id });
        }

        self.repository
            .update_route_info(route_id, request.visit_time, request.memo)
            .await?;
        self.plan_view(plan_id, Some(user_id)).await
    }

    /// Create a plan with the caller as its only writer
    pub async fn add_plan(&self, user_id: Uuid, request: CreatePlanRequest) -> PlanResult<PlanView> {
        let title = require_title(&request.title)?;
        let schedule = request.schedule().map_err(PlanError::InvalidSchedule)?;
        let tags = request.normalized_tags();
        let plan_id = self
            .repository
            .insert_plan(
                NewPlan {
                    title,
                    description: request.description,
                    is_public: request.is_public,
                    schedule,
                    tags,
                },
                user_id,
            )
            .await?;
        tracing::info!(plan_id, %user_id, "created plan");

        self.plan_view(plan_id, Some(user_id)).await
    }

    pub async fn update_plan(&self, plan_id: i64, user_id: Uuid, request: UpdatePlanRequest) -> PlanResult<PlanView> {
        self.writable_plan(plan_id, user_id).await?;
        let title = require_title(&request.title)?;

        self.repository
            .update_basic_info(
                plan_id,
                PlanInfo {
                    title,
                    description: request.description,
                    is_public: request.is_public,
                },
            )
            .await?;
        self.plan_view(plan_id, Some(user_id)).await
    }

    /// Leave a plan; the last writer leaving deletes it
    pub async fn leave_plan(&self, plan_id: i64, user_id: Uuid) -> PlanResult<bool> {
        self.writable_plan(plan_id, user_id).await?;

        self.repository.delete_plan_writer(plan_id, user_id).await?;
        if self.repository.get_plan_writers_count(plan_id).await? == 0 {
            self.repository.delete_plan(plan_id).await?;
            tracing::info!(plan_id, %user_id, "last writer left, plan deleted");
            // A lease that fails to clear here still expires with its TTL.
            if let Err(e) = self.lock.clear(plan_id).await {
                tracing::warn!(plan_id, "failed to clear lease of deleted plan: {}", e);
            }
        } else {
            tracing::info!(plan_id, %user_id, "writer left plan");
        }
        Ok(true)
    }

    /// Add the user registered under `email` as a writer
    pub async fn invite_plan(&self, plan_id: i64, user_id: Uuid, email: &str) -> PlanResult<bool> {
        let plan = self.writable_plan(plan_id, user_id).await?;

        let invitee = self
            .users
            .get_user_by_email(email.trim())
            .await?
            .ok_or_else(|| PlanError::UserNotFound {
                email: email.trim().to_string(),
            })?;

        if plan.has_writer(invitee.id) || !self.repository.insert_plan_writer(plan_id, invitee.id).await? {
            return Err(PlanError::DuplicatedWriter {
                plan_id,
                user_id: invitee.id,
            });
        }
        tracing::info!(plan_id, inviter = %user_id, invitee = %invitee.id, "invited writer");
        Ok(true)
    }

    pub async fn like_plan(&self, plan_id: i64, user_id: Uuid) -> PlanResult<bool> {
        self.readable_plan(plan_id, Some(user_id)).await?;
        if !self.repository.like_plan(plan_id, user_id).await? {
            return Err(PlanError::DuplicatedLike { plan_id });
        }
        Ok(true)
    }

    pub async fn unlike_plan(&self, plan_id: i64, user_id: Uuid) -> PlanResult<bool> {
        self.readable_plan(plan_id, Some(user_id)).await?;
        if !self.repository.unlike_plan(plan_id, user_id).await? {
            return Err(PlanError::DuplicatedLike { plan_id });
        }
        Ok(true)
    }
}
