//! Plan Module
//!
//! Collaborative editing of travel plans: permission checks, the repository
//! seam, the coordinator that composes them with the plan lock, and the HTTP
//! handlers in front of it.
//!
//! # Architecture
//!
//! - **`authority`** - Pure writer/read permission decisions
//! - **`repository`** - `PlanRepository` trait
//! - **`db`** - PostgreSQL repository
//! - **`memory`** - In-memory repository and user directory
//! - **`coordinator`** - `PlanCoordinator`, the public plan operations
//! - **`handlers`** - Axum handlers
//! - **`error`** - `PlanError` and `RepositoryError`
//!
//! # Module Structure
//!
//! ```text
//! plan/
//! ├── mod.rs          - Module exports and documentation
//! ├── authority.rs    - Access decisions
//! ├── repository.rs   - Storage trait
//! ├── db.rs           - PgPlanRepository
//! ├── memory.rs       - MemoryStore
//! ├── coordinator.rs  - PlanCoordinator
//! ├── handlers.rs     - HTTP handlers
//! └── error.rs        - Error taxonomy
//! ```
//!
//! # Request Flow
//!
//! handler → coordinator → fresh snapshot from the repository → authority
//! check → lock check or renewal (for lease-gated operations) → repository
//! mutation in one transaction → refreshed plan view.

pub mod authority;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod repository;

pub use coordinator::PlanCoordinator;
pub use db::PgPlanRepository;
pub use error::{PlanError, RepositoryError};
pub use memory::MemoryStore;
pub use repository::PlanRepository;
