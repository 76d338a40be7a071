//! Shared Module
//!
//! Domain and wire types used by the server and by any client of the plan
//! API. Nothing in here depends on the `ssr` feature: these types only need
//! `serde`, `chrono` and `uuid`.
//!
//! # Overview
//!
//! - **`plan`** - `Plan` snapshots, writers, tags, schedules and the client view
//! - **`route`** - `Route` stops and the batch types used for reordering
//! - **`requests`** - request/response bodies of the HTTP API
//! - **`error`** - validation errors raised by the types above

/// Plan data structures
pub mod plan;

/// Route data structures
pub mod route;

/// HTTP request and response payloads
pub mod requests;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use plan::{Plan, PlanView, Schedule, Tag, Writer};
pub use route::{NewRoute, Route, RouteBatch, RouteChange, RoutePlacement};
