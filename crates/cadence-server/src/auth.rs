//! Request-scoped credential extraction.
//!
//! Every authenticated handler takes an [`Owner`] argument: the owner id
//! recovered from the request's bearer token. There is no ambient auth
//! state -- handlers only ever see the credential extracted for the
//! request they are serving.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated owner id for a request.
pub struct Owner(pub String);

#[async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let owner = state
            .verifier
            .verify(token)
            .map_err(|_| ApiError::Unauthorized)?;
        Ok(Owner(owner))
    }
}
