//! Plan Lock Module
//!
//! Lease-based mutual exclusion for plan editing sessions.
//!
//! # Architecture
//!
//! - **`store`** - `LeaseStore` trait (set-if-absent, get, expire,
//!   compare-and-delete) and the in-memory implementation
//! - **`postgres`** - `LeaseStore` on the `plan_locks` table
//! - **`plan_lock`** - `PlanLock`, the per-plan lease protocol
//!
//! # Module Structure
//!
//! ```text
//! lock/
//! ├── mod.rs        - Module exports and documentation
//! ├── store.rs      - LeaseStore trait and InMemoryLeaseStore
//! ├── postgres.rs   - PgLeaseStore
//! └── plan_lock.rs  - PlanLock protocol
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tripcollab::backend::lock::{InMemoryLeaseStore, PlanLock, DEFAULT_LOCK_TTL};
//!
//! # async fn example() -> Result<(), tripcollab::backend::lock::LeaseError> {
//! let lock = PlanLock::new(Arc::new(InMemoryLeaseStore::new()), DEFAULT_LOCK_TTL);
//! let user = uuid::Uuid::new_v4();
//! assert!(lock.acquire(7, user).await?);
//! assert_eq!(lock.holder(7).await?, Some(user));
//! # Ok(())
//! # }
//! ```

/// Lease store trait and in-memory backend
pub mod store;

/// PostgreSQL lease store
pub mod postgres;

/// Per-plan lease protocol
pub mod plan_lock;

pub use plan_lock::{lock_key, PlanLock, DEFAULT_LOCK_TTL};
pub use postgres::PgLeaseStore;
pub use store::{InMemoryLeaseStore, LeaseError, LeaseStore};
