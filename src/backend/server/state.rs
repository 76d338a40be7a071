/**
 * Application State Management
 *
 * `AppState` is the central state container handed to the router. It holds
 * the plan coordinator (which owns the repository, the user directory and
 * the plan lock), the configuration and the optional database pool.
 *
 * # State Extraction
 *
 * Handlers extract the coordinator with `State<Arc<PlanCoordinator>>`
 * through the `FromRef` implementation; the middleware reads the config from
 * the full state.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::auth::users::PgUserDirectory;
use crate::backend::lock::{InMemoryLeaseStore, LeaseStore, PgLeaseStore, PlanLock};
use crate::backend::plan::{MemoryStore, PgPlanRepository, PlanCoordinator};
use crate::backend::server::config::ServerConfig;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Plan operations
    pub coordinator: Arc<PlanCoordinator>,

    /// Server configuration (JWT secret, lease TTL, ...)
    pub config: Arc<ServerConfig>,

    /// Database connection pool
    ///
    /// `None` when the server runs on in-memory storage.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// State backed by PostgreSQL for plans, users and leases
    pub fn with_database(config: ServerConfig, pool: PgPool) -> Self {
        let store: Arc<dyn LeaseStore> = Arc::new(PgLeaseStore::new(pool.clone()));
        let coordinator = PlanCoordinator::new(
            Arc::new(PgPlanRepository::new(pool.clone())),
            Arc::new(PgUserDirectory::new(pool.clone())),
            PlanLock::new(store, config.lock_ttl),
        );
        Self {
            coordinator: Arc::new(coordinator),
            config: Arc::new(config),
            db_pool: Some(pool),
        }
    }

    /// State backed by in-memory stores
    ///
    /// Returns the `MemoryStore` as well so callers can seed users.
    pub fn in_memory(config: ServerConfig) -> (Self, MemoryStore) {
        let store = MemoryStore::new();
        let coordinator = PlanCoordinator::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            PlanLock::new(Arc::new(InMemoryLeaseStore::new()), config.lock_ttl),
        );
        let state = Self {
            coordinator: Arc::new(coordinator),
            config: Arc::new(config),
            db_pool: None,
        };
        (state, store)
    }
}

impl FromRef<AppState> for Arc<PlanCoordinator> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.coordinator.clone()
    }
}
