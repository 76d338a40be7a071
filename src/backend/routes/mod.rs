//! Route Configuration Module
//!
//! Configures the HTTP routes of the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation and layers
//! └── plan_routes.rs  - Plan API routes
//! ```
//!
//! # Authentication
//!
//! Every route passes through `auth_middleware`. Handlers that need a user
//! take the `AuthUser` extractor and answer 401 without one;
//! `GET /v1/plans/{plan_id}` takes `MaybeAuthUser` so public plans can be
//! read anonymously.

/// Main router creation
pub mod router;

/// Plan API routes
pub mod plan_routes;

pub use router::create_router;
