//! Public share viewer handlers (unauthenticated, read-only).
//!
//! `/share/{token}` resolves the root of the shared subtree;
//! `/share/{token}/{node_id}` resolves a nested listing. Descendance of
//! `node_id` from the share root is validated on every request — a
//! client-supplied id is never trusted beyond that check.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::SharedListingQuery;
use crate::state::AppState;

/// GET /share/{token}
pub async fn view_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<SharedListingQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let listing = state
        .access_service
        .traverse(&token, None, query.cursor.as_deref(), query.limit)
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": listing })))
}

/// GET /share/{token}/{node_id}
pub async fn view_share_node(
    State(state): State<AppState>,
    Path((token, node_id)): Path<(String, Uuid)>,
    Query(query): Query<SharedListingQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let listing = state
        .access_service
        .traverse(&token, Some(node_id), query.cursor.as_deref(), query.limit)
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": listing })))
}
