/**
 * JSON Body Extractor
 *
 * `axum::Json` with its rejection turned into `BackendError`, so a body that
 * is missing, not JSON or the wrong shape gets the same
 * `{"error", "code", "status"}` response as every other failure.
 */

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::backend::error::BackendError;

/// JSON request body
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = BackendError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await.map_err(|rejection| {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            BackendError::from(rejection)
        })?;
        Ok(JsonBody(value))
    }
}
