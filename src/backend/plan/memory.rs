/**
 * In-Memory Plan Store
 *
 * `MemoryStore` implements `PlanRepository` and `UserDirectory` over plain
 * maps behind one `tokio::sync::Mutex`. Every method holds the mutex for its
 * whole body, which gives it the same all-or-nothing behaviour a database
 * transaction gives `PgPlanRepository`.
 *
 * Used by tests and by servers started without `DATABASE_URL`.
 */

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::auth::users::{User, UserDirectory};
use crate::backend::plan::error::RepositoryError;
use crate::backend::plan::repository::{NewPlan, PlanInfo, PlanRepository};
use crate::shared::{NewRoute, Plan, Route, RouteBatch, Schedule, Tag, Writer};

#[derive(Debug, Clone)]
struct StoredPlan {
    title: String,
    description: Option<String>,
    is_public: bool,
    schedule: Schedule,
    stella: Option<String>,
    tag_ids: Vec<i64>,
    writers: Vec<Uuid>,
    likes: HashSet<Uuid>,
}

#[derive(Debug, Default)]
struct MemoryData {
    plans: BTreeMap<i64, StoredPlan>,
    routes: BTreeMap<i64, Route>,
    tags: BTreeMap<i64, String>,
    users: HashMap<Uuid, User>,
    next_plan_id: i64,
    next_route_id: i64,
    next_tag_id: i64,
}

impl MemoryData {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn tag_id(&mut self, name: &str) -> i64 {
        if let Some((id, _)) = self.tags.iter().find(|(_, existing)| existing.as_str() == name) {
            return *id;
        }
        let id = Self::next_id(&mut self.next_tag_id);
        self.tags.insert(id, name.to_string());
        id
    }

    fn plan_mut(&mut self, plan_id: i64) -> Result<&mut StoredPlan, RepositoryError> {
        self.plans
            .get_mut(&plan_id)
            .ok_or_else(|| RepositoryError::missing("plan", plan_id))
    }

    fn snapshot(&self, plan_id: i64, requester: Option<Uuid>) -> Option<Plan> {
        let stored = self.plans.get(&plan_id)?;

        let writers = stored
            .writers
            .iter()
            .map(|user_id| Writer {
                user_id: *user_id,
                name: self
                    .users
                    .get(user_id)
                    .map(|user| user.username.clone())
                    .unwrap_or_default(),
            })
            .collect();

        let tags = stored
            .tag_ids
            .iter()
            .filter_map(|tag_id| {
                self.tags.get(tag_id).map(|name| Tag {
                    tag_id: *tag_id,
                    name: name.clone(),
                })
            })
            .collect();

        let mut routes: Vec<Route> = self
            .routes
            .values()
            .filter(|route| route.plan_id == plan_id)
            .cloned()
            .collect();
        routes.sort_by_key(|route| (route.day_index, route.order, route.route_id));

        Some(Plan {
            plan_id,
            title: stored.title.clone(),
            description: stored.description.clone(),
            is_public: stored.is_public,
            start_date: stored.schedule.start_date,
            end_date: stored.schedule.end_date,
            like_count: stored.likes.len() as i64,
            liked: requester.is_some_and(|user_id| stored.likes.contains(&user_id)),
            stella: stored.stella.clone(),
            tags,
            writers,
            routes,
        })
    }
}

/// Plan repository and user directory held in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user to the directory
    pub async fn register_user(&self, username: &str, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.data.lock().await.users.insert(user.id, user.clone());
        user
    }

    /// Number of routes across all plans
    pub async fn route_count(&self) -> usize {
        self.data.lock().await.routes.len()
    }
}

#[async_trait]
impl PlanRepository for MemoryStore {
    async fn get_plan_by_id(&self, plan_id: i64, requester: Option<Uuid>) -> Result<Option<Plan>, RepositoryError> {
        Ok(self.data.lock().await.snapshot(plan_id, requester))
    }

    async fn get_route_by_id(&self, route_id: i64) -> Result<Option<Route>, RepositoryError> {
        Ok(self.data.lock().await.routes.get(&route_id).cloned())
    }

    async fn insert_plan(&self, plan: NewPlan, creator: Uuid) -> Result<i64, RepositoryError> {
        let mut data = self.data.lock().await;
        let tag_ids = plan.tags.iter().map(|name| data.tag_id(name)).collect();
        let plan_id = MemoryData::next_id(&mut data.next_plan_id);
        data.plans.insert(
            plan_id,
            StoredPlan {
                title: plan.title,
                description: plan.description,
                is_public: plan.is_public,
                schedule: plan.schedule,
                stella: None,
                tag_ids,
                writers: vec![creator],
                likes: HashSet::new(),
            },
        );
        Ok(plan_id)
    }

    async fn update_basic_info(&self, plan_id: i64, info: PlanInfo) -> Result<(), RepositoryError> {
        let mut data = self.data.lock().await;
        let plan = data.plan_mut(plan_id)?;
        plan.title = info.title;
        plan.description = info.description;
        plan.is_public = info.is_public;
        Ok(())
    }

    async fn update_schedule(&self, plan_id: i64, schedule: Schedule) -> Result<u64, RepositoryError> {
        let mut data = self.data.lock().await;
        data.plan_mut(plan_id)?.schedule = schedule;

        let last_day = schedule.last_day_index();
        let before = data.routes.len();
        data.routes
            .retain(|_, route| route.plan_id != plan_id || i64::from(route.day_index) <= last_day);
        Ok((before - data.routes.len()) as u64)
    }

    async fn insert_route(&self, route: NewRoute) -> Result<Route, RepositoryError> {
        let mut data = self.data.lock().await;
        if !data.plans.contains_key(&route.plan_id) {
            return Err(RepositoryError::missing("plan", route.plan_id));
        }
        let route = Route {
            route_id: MemoryData::next_id(&mut data.next_route_id),
            plan_id: route.plan_id,
            attraction_id: route.attraction_id,
            day_index: route.day_index,
            order: route.order,
            visit_time: route.visit_time,
            memo: route.memo,
        };
        data.routes.insert(route.route_id, route.clone());
        Ok(route)
    }

    async fn apply_route_batch(&self, plan_id: i64, batch: &RouteBatch) -> Result<(), RepositoryError> {
        let mut data = self.data.lock().await;
        for placement in &batch.placements {
            if let Some(route) = data
                .routes
                .get_mut(&placement.route_id)
                .filter(|route| route.plan_id == plan_id)
            {
                route.day_index = placement.day_index;
                route.order = placement.order;
            }
        }
        for route_id in &batch.deletions {
            if data.routes.get(route_id).is_some_and(|route| route.plan_id == plan_id) {
                data.routes.remove(route_id);
            }
        }
        Ok(())
    }

    async fn update_route_info(
        &self,
        route_id: i64,
        visit_time: Option<NaiveTime>,
        memo: Option<String>,
    ) -> Result<(), RepositoryError> {
        let mut data = self.data.lock().await;
        let route = data
            .routes
            .get_mut(&route_id)
            .ok_or_else(|| RepositoryError::missing("route", route_id))?;
        route.visit_time = visit_time;
        route.memo = memo;
        Ok(())
    }

    async fn insert_plan_writer(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().await;
        let plan = data.plan_mut(plan_id)?;
        if plan.writers.contains(&user_id) {
            return Ok(false);
        }
        plan.writers.push(user_id);
        Ok(true)
    }

    async fn delete_plan_writer(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().await;
        let plan = data.plan_mut(plan_id)?;
        let before = plan.writers.len();
        plan.writers.retain(|writer| *writer != user_id);
        Ok(plan.writers.len() < before)
    }

    async fn get_plan_writers_count(&self, plan_id: i64) -> Result<i64, RepositoryError> {
        let data = self.data.lock().await;
        Ok(data
            .plans
            .get(&plan_id)
            .map(|plan| plan.writers.len() as i64)
            .unwrap_or(0))
    }

    async fn delete_plan(&self, plan_id: i64) -> Result<(), RepositoryError> {
        let mut data = self.data.lock().await;
        data.plans.remove(&plan_id);
        data.routes.retain(|_, route| route.plan_id != plan_id);
        Ok(())
    }

    async fn like_plan(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().await;
        Ok(data.plan_mut(plan_id)?.likes.insert(user_id))
    }

    async fn unlike_plan(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().await;
        Ok(data.plan_mut(plan_id)?.likes.remove(&user_id))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let data = self.data.lock().await;
        Ok(data.users.values().find(|user| user.email == email).cloned())
    }
}
