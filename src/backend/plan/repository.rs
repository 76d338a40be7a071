/**
 * Plan Repository
 *
 * Storage seam for plans and their routes, writers, tags and likes. Each
 * method is one unit of work: implementations run multi-statement methods
 * (schedule resize, route batches, like toggles) inside a single transaction.
 *
 * The repository enforces no permissions and takes no leases. Those checks
 * belong to the coordinator, which calls in here only after they pass.
 */

use async_trait::async_trait;
use chrono::NaiveTime;
use uuid::Uuid;

use crate::backend::plan::error::RepositoryError;
use crate::shared::{NewRoute, Plan, Route, RouteBatch, Schedule};

/// A plan about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlan {
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub schedule: Schedule,
    /// Normalized tag names
    pub tags: Vec<String>,
}

/// Editable basic fields of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanInfo {
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
}

#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Full snapshot of a plan
    ///
    /// `requester` only drives the `liked` flag; it is not an access check.
    async fn get_plan_by_id(&self, plan_id: i64, requester: Option<Uuid>) -> Result<Option<Plan>, RepositoryError>;

    async fn get_route_by_id(&self, route_id: i64) -> Result<Option<Route>, RepositoryError>;

    /// Insert a plan with `creator` as its only writer, returning the new id
    async fn insert_plan(&self, plan: NewPlan, creator: Uuid) -> Result<i64, RepositoryError>;

    async fn update_basic_info(&self, plan_id: i64, info: PlanInfo) -> Result<(), RepositoryError>;

    /// Move the plan's dates and delete every route past the new last day
    ///
    /// Returns how many routes were deleted.
    async fn update_schedule(&self, plan_id: i64, schedule: Schedule) -> Result<u64, RepositoryError>;

    async fn insert_route(&self, route: NewRoute) -> Result<Route, RepositoryError>;

    /// Apply placements and deletions of one reorder batch
    ///
    /// Route ids that do not belong to `plan_id` are skipped.
    async fn apply_route_batch(&self, plan_id: i64, batch: &RouteBatch) -> Result<(), RepositoryError>;

    async fn update_route_info(
        &self,
        route_id: i64,
        visit_time: Option<NaiveTime>,
        memo: Option<String>,
    ) -> Result<(), RepositoryError>;

    /// Add a writer; `false` when the user already writes the plan
    async fn insert_plan_writer(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError>;

    /// Remove a writer; `false` when the user was not one
    async fn delete_plan_writer(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError>;

    async fn get_plan_writers_count(&self, plan_id: i64) -> Result<i64, RepositoryError>;

    /// Delete a plan together with its routes, writers, tags and likes
    async fn delete_plan(&self, plan_id: i64) -> Result<(), RepositoryError>;

    /// Record a like and bump the counter; `false` when already liked
    async fn like_plan(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError>;

    /// Remove a like and decrement the counter; `false` when not liked
    async fn unlike_plan(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError>;
}
