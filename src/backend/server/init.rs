/**
 * Server Initialization
 *
 * Builds the application state from the configuration, starts the lease
 * sweeper and assembles the router.
 *
 * # Initialization Process
 *
 * 1. Connect to PostgreSQL if configured (falls back to in-memory storage)
 * 2. Wire the repository, user directory and lease store into the coordinator
 * 3. Spawn the periodic sweep of expired leases
 * 4. Create the router
 */

use axum::Router;

use crate::backend::lock::PlanLock;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!(
        port = config.port,
        lock_ttl_secs = config.lock_ttl.as_secs(),
        "Initializing TripCollab backend server"
    );

    let app_state = match load_database(&config).await {
        Some(pool) => AppState::with_database(config, pool),
        None => AppState::in_memory(config).0,
    };

    spawn_lease_sweeper(
        app_state.coordinator.lock().clone(),
        app_state.config.sweep_interval,
    );

    let app = create_router(app_state);
    tracing::info!("Router configured with periodic lease sweep");
    app
}

/// Periodically delete expired leases
///
/// Expired leases are already invisible to the lock protocol; this only
/// reclaims storage.
pub fn spawn_lease_sweeper(lock: PlanLock, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match lock.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Purged expired plan leases"),
                Err(e) => tracing::error!("Failed to purge expired plan leases: {}", e),
            }
        }
    })
}
