//! TripCollab - Main Library
//!
//! TripCollab is the backend of a collaborative travel planner. Several users
//! edit one shared itinerary (a *plan* made of ordered, day-indexed *routes*)
//! and the server keeps that route list consistent while they do.
//!
//! # Overview
//!
//! The central problem is coordinating concurrent edits of a single plan:
//!
//! - A per-plan lease (a distributed mutex with a TTL) guards route
//!   reordering sessions and blocks destructive schedule changes
//! - Membership-based authorization decides who may take the lease
//! - Mutation operations keep day indexes inside the plan's date range and
//!   append new stops at the end of their day
//!
//! # Module Structure
//!
//! - **`shared`** - Domain and wire types (plans, routes, requests)
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and routing
//!   - Lease store and plan lock protocol
//!   - Plan repository (PostgreSQL or in-memory) and coordinator
//!   - JWT bearer authentication
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use tripcollab::backend::server::{config::ServerConfig, init::create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(config).await;
//! // Serve `app` with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Requests are handled concurrently on the tokio runtime. There is no
//! in-process lock table: mutual exclusion between collaborators comes only
//! from the atomic operations of the lease store.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
