/**
 * Plan Lock Protocol
 *
 * `PlanLock` turns a `LeaseStore` into a per-plan mutex with a fixed lease
 * duration. The lease key is `plan-lock:{plan_id}` and the value is the
 * holder's user id.
 *
 * # State Machine
 *
 * - **Unlocked → Locked(u)**: `acquire(plan, u)` via set-if-absent
 * - **Locked(u) → Locked(u), TTL renewed**: `acquire(plan, u)` again; the
 *   current value is read and compared, then `expire` refreshes the TTL
 * - **Locked(u) → Locked(v)**: impossible while the lease is live
 * - **Locked(u) → Unlocked**: `release(plan, u)` (compare-and-delete) or TTL
 *   expiry, which has no callback
 *
 * `holder` is a pure read and never changes state. Nothing here blocks:
 * every call is a single round-trip and contention is reported to the caller.
 */

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::backend::lock::store::{LeaseError, LeaseStore};

/// Lease duration used when none is configured
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(180);

const LOCK_PREFIX: &str = "plan-lock:";

/// Lease key of a plan
pub fn lock_key(plan_id: i64) -> String {
    format!("{}{}", LOCK_PREFIX, plan_id)
}

/// Per-plan lease protocol over a `LeaseStore`
#[derive(Clone)]
pub struct PlanLock {
    store: Arc<dyn LeaseStore>,
    ttl: Duration,
}

impl std::fmt::Debug for PlanLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanLock").field("ttl", &self.ttl).finish()
    }
}

impl PlanLock {
    pub fn new(store: Arc<dyn LeaseStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Current holder of the plan's lease
    pub async fn holder(&self, plan_id: i64) -> Result<Option<Uuid>, LeaseError> {
        let key = lock_key(plan_id);
        match self.store.get(&key).await? {
            Some(value) => decode_holder(&key, &value).map(Some),
            None => Ok(None),
        }
    }

    /// Take or renew the lease for `user_id`
    ///
    /// Returns `false` when another user holds a live lease.
    pub async fn acquire(&self, plan_id: i64, user_id: Uuid) -> Result<bool, LeaseError> {
        let key = lock_key(plan_id);
        let value = user_id.to_string();

        if self.store.get(&key).await?.as_deref() == Some(value.as_str()) {
            if self.store.expire(&key, self.ttl).await? {
                tracing::debug!(plan_id, %user_id, "renewed plan lease");
                return Ok(true);
            }
            // Expired between the read and the renewal: fall through and retake it.
        }

        let acquired = self.store.set_if_absent(&key, &value, self.ttl).await?;
        if acquired {
            tracing::debug!(plan_id, %user_id, ttl_secs = self.ttl.as_secs(), "acquired plan lease");
        } else {
            tracing::debug!(plan_id, %user_id, "plan lease held by another user");
        }
        Ok(acquired)
    }

    /// Release the lease if `user_id` still holds it
    pub async fn release(&self, plan_id: i64, user_id: Uuid) -> Result<bool, LeaseError> {
        let released = self
            .store
            .delete_if_owned_by(&lock_key(plan_id), &user_id.to_string())
            .await?;
        tracing::debug!(plan_id, %user_id, released, "release plan lease");
        Ok(released)
    }

    /// Release the lease at the end of an edit session run for `holder`
    ///
    /// Same compare-and-delete as [`PlanLock::release`]. A lease that expired
    /// or moved to someone else while the session ran is left untouched.
    pub async fn release_on_behalf(&self, plan_id: i64, holder: Uuid) -> Result<bool, LeaseError> {
        let released = self.release(plan_id, holder).await?;
        if !released {
            tracing::warn!(
                plan_id,
                %holder,
                "edit session finished after its lease was lost; leaving current lease in place"
            );
        }
        Ok(released)
    }

    /// Release the plan's lease whoever holds it
    ///
    /// Used once the plan itself is deleted. Returns the holder that was
    /// removed, if any.
    pub async fn clear(&self, plan_id: i64) -> Result<Option<Uuid>, LeaseError> {
        let Some(holder) = self.holder(plan_id).await? else {
            return Ok(None);
        };
        let released = self.release(plan_id, holder).await?;
        Ok(released.then_some(holder))
    }

    /// Drop expired leases from the backing store
    pub async fn purge_expired(&self) -> Result<u64, LeaseError> {
        self.store.purge_expired().await
    }
}

fn decode_holder(key: &str, value: &str) -> Result<Uuid, LeaseError> {
    Uuid::parse_str(value).map_err(|_| LeaseError::CorruptValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
