//! Database test fixtures and utilities
//!
//! PostgreSQL tests only run when `DATABASE_URL` is set. `TestDatabase::new`
//! returns `None` otherwise, and callers return early.

use sqlx::PgPool;

/// Connect to the test database, if one is configured
pub async fn create_test_pool() -> Option<PgPool> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    Some(
        PgPool::connect(&database_url)
            .await
            .expect("Failed to create test database pool"),
    )
}

/// Run database migrations for testing
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Remove all test data while preserving the schema
pub async fn cleanup_test_data(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("TRUNCATE TABLE plan_locks, plan_likes, routes, plan_tags, tags, plan_writers, plans, users CASCADE")
        .execute(pool)
        .await?;
    Ok(())
}

/// Test database fixture
pub struct TestDatabase {
    pool: PgPool,
}

impl TestDatabase {
    /// Connect, migrate and clean; `None` when `DATABASE_URL` is unset
    pub async fn new() -> Option<Self> {
        let Some(pool) = create_test_pool().await else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };
        run_migrations(&pool).await.expect("Failed to run migrations");
        cleanup_test_data(&pool).await.expect("Failed to clean test data");
        Some(Self { pool })
    }

    /// Get the database pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
