//! Backend Module
//!
//! All server-side code of TripCollab: the Axum HTTP server, the plan lock,
//! plan storage and the coordinator that ties them together. This module is
//! only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, initialization
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`plan`** - Plan authority, repository, coordinator and handlers
//! - **`lock`** - Lease store and the per-plan lock protocol
//! - **`auth`** - JWT verification and user lookups
//! - **`middleware`** - Request processing middleware
//! - **`error`** - Backend error type and its HTTP conversion
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── plan/           - Plan operations
//! ├── lock/           - Plan lock
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # Concurrency
//!
//! Requests run concurrently on the tokio runtime and share `AppState`
//! through `Arc`. Plans are never locked in process: exclusive edit sessions
//! come from the lease store's atomic operations, and every repository call
//! runs in its own database transaction.
//!
//! # Error Handling
//!
//! Handlers return `BackendError`, which renders as
//! `{"error", "code", "status"}` with the status of the failure kind.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Plan operations
pub mod plan;

/// Plan lock
pub mod lock;

/// Backend error types
pub mod error;

/// Authentication and user lookups
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use server::create_app;
