//! Route Data Structures
//!
//! A route is one stop of a plan's itinerary, placed on a day (`day_index`,
//! 1-based from the plan's start date) and a position within that day
//! (`order`, 1-based).

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// One stop of a plan's itinerary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Route {
    /// Unique route ID
    pub route_id: i64,
    /// The plan this route belongs to
    pub plan_id: i64,
    /// External attraction reference (not owned by this service)
    pub attraction_id: i64,
    /// 1-based day offset from the plan's start date
    pub day_index: i32,
    /// 1-based position within the day
    pub order: i32,
    /// Optional planned visit time
    pub visit_time: Option<NaiveTime>,
    /// Free text memo
    pub memo: Option<String>,
}

/// A route about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoute {
    pub plan_id: i64,
    pub attraction_id: i64,
    pub day_index: i32,
    pub order: i32,
    pub visit_time: Option<NaiveTime>,
    pub memo: Option<String>,
}

/// New placement of an existing route inside a reorder batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePlacement {
    pub route_id: i64,
    pub day_index: i32,
    pub order: i32,
}

/// One entry of a batched reorder/delete request
///
/// When `deleted` is set, `day_index` and `order` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteChange {
    pub route_id: i64,
    #[serde(default)]
    pub day_index: i32,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub deleted: bool,
}

impl RouteChange {
    /// Placement carried by this change, or `None` for a deletion
    pub fn placement(&self) -> Option<RoutePlacement> {
        if self.deleted {
            None
        } else {
            Some(RoutePlacement {
                route_id: self.route_id,
                day_index: self.day_index,
                order: self.order,
            })
        }
    }
}

/// A batch split into placements and deletions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteBatch {
    pub placements: Vec<RoutePlacement>,
    pub deletions: Vec<i64>,
}

impl RouteBatch {
    /// Partition raw changes into placements and deletions, keeping request order
    pub fn partition(changes: &[RouteChange]) -> Self {
        let mut batch = RouteBatch::default();
        for change in changes {
            match change.placement() {
                Some(placement) => batch.placements.push(placement),
                None => batch.deletions.push(change.route_id),
            }
        }
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty() && self.deletions.is_empty()
    }
}

/// Next free position at the end of `day_index`
///
/// Insertion always appends: gaps left by deleted routes are not reused.
/// `None` when the day already ends at `i32::MAX`, which a reorder batch
/// may store verbatim.
pub fn next_order_for_day<'a>(routes: impl IntoIterator<Item = &'a Route>, day_index: i32) -> Option<i32> {
    match routes
        .into_iter()
        .filter(|route| route.day_index == day_index)
        .map(|route| route.order)
        .max()
    {
        Some(last) => last.checked_add(1),
        None => Some(1),
    }
}
