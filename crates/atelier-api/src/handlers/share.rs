//! Share management handlers (authenticated, owner-scoped).

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use atelier_core::error::AppError;
use atelier_service::share::CreateShareRequest;

use crate::dto::request::CreateShareBody;
use crate::dto::response::ShareResponse;
use crate::error::ApiError;
use crate::extractors::Identity;
use crate::state::AppState;

/// GET /api/shares
pub async fn list_shares(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<serde_json::Value>, ApiError> {
    let base_url = &state.config.server.public_base_url;
    let shares: Vec<ShareResponse> = state
        .share_service
        .list_shares(&identity)
        .await?
        .into_iter()
        .map(|share| ShareResponse::new(share, base_url))
        .collect();

    Ok(Json(serde_json::json!({ "success": true, "data": shares })))
}

/// POST /api/shares
///
/// Creating a share for a node that already has an active one returns
/// the existing share — an informational path, never a hard failure.
pub async fn create_share(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<CreateShareBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let share = state
        .share_service
        .create_share(
            &identity,
            CreateShareRequest {
                node_id: body.node_id,
                title: body.title,
                expires_at: body.expires_at,
            },
        )
        .await?;

    let data = ShareResponse::new(share, &state.config.server.public_base_url);
    Ok(Json(serde_json::json!({ "success": true, "data": data })))
}

/// DELETE /api/shares/{id}
pub async fn revoke_share(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.share_service.revoke_share(&identity, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Share revoked" } }),
    ))
}
