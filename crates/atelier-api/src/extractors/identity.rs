//! `Identity` extractor — pulls the gateway-injected principal and
//! builds the request context.
//!
//! Session issuance and token validation happen upstream; by the time a
//! request reaches this service, the gateway has already authenticated
//! it and stamped the principal into `x-user-id`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use atelier_core::error::AppError;
use atelier_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated principal.
const USER_ID_HEADER: &str = "x-user-id";

/// Extracted principal context available in handlers.
#[derive(Debug, Clone)]
pub struct Identity(pub RequestContext);

impl std::ops::Deref for Identity {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError(AppError::authentication("Missing identity header"))
            })?;

        let user_id = Uuid::parse_str(raw)
            .map_err(|_| ApiError(AppError::authentication("Malformed identity header")))?;

        Ok(Identity(RequestContext::new(user_id)))
    }
}
