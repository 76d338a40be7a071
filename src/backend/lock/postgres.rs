/**
 * PostgreSQL Lease Store
 *
 * Implements `LeaseStore` on the `plan_locks` table. Each row is one lease
 * (`lock_key`, `holder`, `expires_at`). Every operation is a single statement,
 * so PostgreSQL's row locking provides the atomicity the lease protocol needs:
 *
 * - set-if-absent is an upsert that only overwrites an expired row
 * - reads, renewals and compare-and-delete all ignore expired rows
 *
 * Expired rows are invisible to the protocol; the periodic sweep started by
 * the server deletes them.
 */

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::backend::lock::store::{LeaseError, LeaseStore};

/// Lease store backed by the `plan_locks` table
#[derive(Debug, Clone)]
pub struct PgLeaseStore {
    pool: PgPool,
}

impl PgLeaseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn ttl_millis(ttl: Duration) -> f64 {
    ttl.as_millis() as f64
}

#[async_trait]
impl LeaseStore for PgLeaseStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, LeaseError> {
        let row = sqlx::query(
            r#"
            INSERT INTO plan_locks (lock_key, holder, expires_at)
            VALUES ($1, $2, now() + ($3::float8 * interval '1 millisecond'))
            ON CONFLICT (lock_key) DO UPDATE
            SET holder = EXCLUDED.holder, expires_at = EXCLUDED.expires_at
            WHERE plan_locks.expires_at <= now()
            RETURNING holder
            "#
        )
        .bind(key)
        .bind(value)
        .bind(ttl_millis(ttl))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, LeaseError> {
        let row = sqlx::query(
            r#"
            SELECT holder FROM plan_locks
            WHERE lock_key = $1 AND expires_at > now()
            "#
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get::<String, _>("holder")))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, LeaseError> {
        let result = sqlx::query(
            r#"
            UPDATE plan_locks
            SET expires_at = now() + ($2::float8 * interval '1 millisecond')
            WHERE lock_key = $1 AND expires_at > now()
            "#
        )
        .bind(key)
        .bind(ttl_millis(ttl))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_if_owned_by(&self, key: &str, value: &str) -> Result<bool, LeaseError> {
        let result = sqlx::query(
            r#"
            DELETE FROM plan_locks
            WHERE lock_key = $1 AND holder = $2 AND expires_at > now()
            "#
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self) -> Result<u64, LeaseError> {
        let result = sqlx::query("DELETE FROM plan_locks WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
