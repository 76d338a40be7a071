//! Middleware Module
//!
//! HTTP middleware that runs before the plan handlers.
//!
//! - **`auth`** - Bearer token verification and the `AuthUser` /
//!   `MaybeAuthUser` extractors
//! - **`json`** - `JsonBody`, a JSON extractor rejecting with `BackendError`
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//! use tripcollab::backend::middleware::auth_middleware;
//!
//! let router = router.layer(from_fn_with_state(app_state.clone(), auth_middleware));
//! ```

pub mod auth;

pub mod json;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser, MaybeAuthUser};
pub use json::JsonBody;
