//! Node CRUD and path handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use atelier_core::error::AppError;
use atelier_service::node::{CreateNodeRequest, UpdateNodeRequest};

use crate::dto::request::{CreateNodeBody, UpdateNodeBody};
use crate::dto::response::NodePathResponse;
use crate::error::ApiError;
use crate::extractors::{Identity, ListingQuery};
use crate::state::AppState;

/// GET /api/nodes
pub async fn list_nodes(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListingQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = state
        .node_service
        .list(
            &identity,
            query.parent_id,
            query.cursor.as_deref(),
            query.limit,
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": page })))
}

/// POST /api/nodes
pub async fn create_node(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<CreateNodeBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let node = state
        .node_service
        .create(
            &identity,
            CreateNodeRequest {
                parent_id: body.parent_id,
                name: body.name,
                is_folder: body.is_folder,
                content: body.content,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": node })))
}

/// GET /api/nodes/{id}
pub async fn get_node(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let node = state.node_service.get(&identity, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": node })))
}

/// GET /api/nodes/{id}/path
pub async fn get_node_path(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let path = state.path_service.resolve(&identity, id).await?;
    let breadcrumbs = state.path_service.breadcrumbs(&identity, id).await?;

    let data = NodePathResponse { path, breadcrumbs };
    Ok(Json(serde_json::json!({ "success": true, "data": data })))
}

/// PUT /api/nodes/{id}
pub async fn update_node(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNodeBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let node = state
        .node_service
        .update(
            &identity,
            id,
            UpdateNodeRequest {
                name: body.name,
                content: body.content,
                parent_id: body.parent_id,
                expected_updated_at: body.expected_updated_at,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": node })))
}

/// DELETE /api/nodes/{id}
pub async fn delete_node(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.node_service.delete(&identity, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Node deleted" } }),
    ))
}
