//! Plan Data Structures
//!
//! A plan is a collaboratively edited itinerary spanning an inclusive date
//! range. Its `writers` are the only users with edit rights, and its `routes`
//! are the ordered, day-indexed stops.
//!
//! # Day Indexes
//!
//! A route's `day_index` is a 1-based offset from `start_date`. For a plan
//! from 2024-05-01 to 2024-05-03 the valid day indexes are `1..=3`. The helper
//! methods on [`Plan`] and [`Schedule`] are the single place where that range
//! is computed.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::route::Route;

/// A user with edit rights on a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Writer {
    pub user_id: Uuid,
    pub name: String,
}

/// A tag attached to a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub tag_id: i64,
    pub name: String,
}

/// Inclusive date range of a plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schedule {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Schedule {
    /// Build a schedule, rejecting `start_date > end_date`
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, SharedError> {
        if start_date > end_date {
            return Err(SharedError::validation(
                "end_date",
                format!("end date {} precedes start date {}", end_date, start_date),
            ));
        }
        Ok(Self { start_date, end_date })
    }

    /// Number of days between start and end (0 for a single-day trip)
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Largest valid day index
    pub fn last_day_index(&self) -> i64 {
        self.span_days() + 1
    }

    pub fn contains_day_index(&self, day_index: i32) -> bool {
        let day_index = i64::from(day_index);
        day_index >= 1 && day_index <= self.last_day_index()
    }

    /// Calendar date of a day index
    pub fn date_of(&self, day_index: i32) -> Option<NaiveDate> {
        let offset = u64::try_from(day_index.checked_sub(1)?).ok()?;
        self.start_date.checked_add_days(Days::new(offset))
    }
}

/// Full plan snapshot as read from the repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub plan_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub like_count: i64,
    /// Whether the requesting user liked this plan
    pub liked: bool,
    /// Cached constellation rendering, opaque to this service
    pub stella: Option<String>,
    pub tags: Vec<Tag>,
    pub writers: Vec<Writer>,
    pub routes: Vec<Route>,
}

impl Plan {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    pub fn has_writer(&self, user_id: Uuid) -> bool {
        self.writers.iter().any(|writer| writer.user_id == user_id)
    }

    pub fn contains_day_index(&self, day_index: i32) -> bool {
        self.schedule().contains_day_index(day_index)
    }

    /// Routes grouped by calendar date, each day sorted by `order`
    pub fn routes_by_date(&self) -> BTreeMap<NaiveDate, Vec<Route>> {
        let schedule = self.schedule();
        let mut days: BTreeMap<NaiveDate, Vec<Route>> = BTreeMap::new();
        for route in &self.routes {
            if let Some(date) = schedule.date_of(route.day_index) {
                days.entry(date).or_default().push(route.clone());
            }
        }
        for routes in days.values_mut() {
            routes.sort_by_key(|route| (route.order, route.route_id));
        }
        days
    }
}

/// Plan view returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanView {
    pub plan_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub like_count: i64,
    pub liked: bool,
    pub stella: Option<String>,
    pub tags: Vec<Tag>,
    pub plan_writers: Vec<Writer>,
    /// Routes keyed by visit date
    pub details: BTreeMap<NaiveDate, Vec<Route>>,
}

impl From<Plan> for PlanView {
    fn from(plan: Plan) -> Self {
        let details = plan.routes_by_date();
        Self {
            plan_id: plan.plan_id,
            title: plan.title,
            description: plan.description,
            is_public: plan.is_public,
            start_date: plan.start_date,
            end_date: plan.end_date,
            like_count: plan.like_count,
            liked: plan.liked,
            stella: plan.stella,
            tags: plan.tags,
            plan_writers: plan.writers,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn route(route_id: i64, day_index: i32, order: i32) -> Route {
        Route {
            route_id,
            plan_id: 1,
            attraction_id: 10,
            day_index,
            order,
            visit_time: None,
            memo: None,
        }
    }

    fn plan(routes: Vec<Route>) -> Plan {
        Plan {
            plan_id: 1,
            title: "Jeju".to_string(),
            description: None,
            is_public: false,
            start_date: date(2024, 5, 1),
            end_date: date(2024, 5, 3),
            like_count: 0,
            liked: false,
            stella: None,
            tags: vec![],
            writers: vec![Writer { user_id: Uuid::nil(), name: "nil".to_string() }],
            routes,
        }
    }

    #[test]
    fn test_schedule_rejects_inverted_range() {
        assert!(Schedule::new(date(2024, 5, 2), date(2024, 5, 1)).is_err());
        assert!(Schedule::new(date(2024, 5, 1), date(2024, 5, 1)).is_ok());
    }

    #[test]
    fn test_day_index_bounds() {
        let schedule = plan(vec![]).schedule();
        assert_eq!(schedule.span_days(), 2);
        assert!(!schedule.contains_day_index(0));
        assert!(schedule.contains_day_index(1));
        assert!(schedule.contains_day_index(3));
        assert!(!schedule.contains_day_index(4));
        assert!(!schedule.contains_day_index(-1));
    }

    #[test]
    fn test_single_day_trip_has_one_day() {
        let schedule = Schedule::new(date(2024, 5, 1), date(2024, 5, 1)).unwrap();
        assert!(schedule.contains_day_index(1));
        assert!(!schedule.contains_day_index(2));
    }

    #[test]
    fn test_routes_grouped_and_sorted() {
        let view = PlanView::from(plan(vec![route(1, 2, 2), route(2, 1, 1), route(3, 2, 1)]));
        let day_two = &view.details[&date(2024, 5, 2)];
        assert_eq!(day_two.iter().map(|r| r.route_id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(view.details[&date(2024, 5, 1)].len(), 1);
    }

    #[test]
    fn test_has_writer() {
        let plan = plan(vec![]);
        assert!(plan.has_writer(Uuid::nil()));
        assert!(!plan.has_writer(Uuid::new_v4()));
    }
}
