//! Request and response payloads of the plan API

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::plan::Schedule;
use crate::shared::route::RouteChange;

/// Body of `POST /v1/plans`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePlanRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CreatePlanRequest {
    /// Requested date range, rejecting `start_date > end_date`
    pub fn schedule(&self) -> Result<Schedule, SharedError> {
        Schedule::new(self.start_date, self.end_date)
    }

    /// Tag names trimmed, without blanks or duplicates
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in &self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}

/// Body of `PUT /v1/plans/{plan_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdatePlanRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Body of `PUT /v1/plans/{plan_id}/schedule`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Body of `POST /v1/plans/{plan_id}/attraction`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddAttractionRequest {
    pub day_index: i32,
    pub attraction_id: i64,
    #[serde(default)]
    pub visit_time: Option<NaiveTime>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// Body of `PATCH /v1/plans/{plan_id}/attraction`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateRoutesRequest {
    #[serde(default)]
    pub routes: Vec<RouteChange>,
}

/// Body of `PUT /v1/plans/{plan_id}/routes/{route_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateRouteRequest {
    #[serde(default)]
    pub visit_time: Option<NaiveTime>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// Body of `POST /v1/plans/{plan_id}/invite`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InviteRequest {
    pub email: String,
}

/// Lease state of a plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockStatusResponse {
    /// Current holder, `None` when unlocked
    pub user_id: Option<Uuid>,
    pub plan_id: i64,
    pub lock_status: bool,
}

impl LockStatusResponse {
    pub fn new(plan_id: i64, holder: Option<Uuid>) -> Self {
        Self {
            user_id: holder,
            plan_id,
            lock_status: holder.is_some(),
        }
    }
}

/// Outcome of a lock or unlock request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockSuccessResponse {
    pub success: bool,
}

/// Outcome of leave / invite / like requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionResponse {
    pub success: bool,
}
