/**
 * Authentication Middleware
 *
 * Verifies an optional bearer token on every request. A valid token attaches
 * an `AuthenticatedUser` to the request extensions; a missing token lets the
 * request through anonymously; a malformed or invalid token is rejected with
 * 401. Handlers pick the user up with the `AuthUser` (required) or
 * `MaybeAuthUser` (optional) extractors.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::sessions::user_id_from_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

fn unauthorized(message: &str) -> BackendError {
    BackendError::handler(StatusCode::UNAUTHORIZED, message)
}

/// Authentication middleware
///
/// This middleware:
/// 1. Reads the `Authorization` header, if any
/// 2. Verifies the `Bearer` token against the configured secret
/// 3. Attaches the user to request extensions for use in handlers
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return Ok(next.run(request).await);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            tracing::warn!("Invalid Authorization header format");
            unauthorized("Invalid Authorization header")
        })?;

    let (user_id, claims) = user_id_from_token(token, &app_state.config.jwt_secret).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// Axum extractor for a required authenticated user
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                unauthorized("Authentication required")
            })
    }
}

/// Axum extractor for an optional authenticated user
#[derive(Clone, Debug)]
pub struct MaybeAuthUser(pub Option<AuthenticatedUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|user| user.user_id)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}
