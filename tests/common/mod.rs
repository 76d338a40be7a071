//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - In-memory app construction with seeded users and tokens
//! - HTTP request helpers driving the router with `oneshot`
//! - Database test fixtures (only when `DATABASE_URL` is set)
//! - Custom assertion macros

#![allow(dead_code)]

pub mod assertions;
pub mod auth_helpers;
pub mod database;

pub use auth_helpers::*;
pub use database::*;
