//! Node CRUD operations with validation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use atelier_core::config::vfs::VfsConfig;
use atelier_core::error::AppError;
use atelier_core::types::{ListCursor, Page, PageParams};
use atelier_entity::node::name;
use atelier_entity::node::{Node, NodeChange, NewNode};
use atelier_entity::store::NodeStore;

use crate::context::RequestContext;

/// Manages node CRUD operations.
#[derive(Clone)]
pub struct NodeService {
    /// Node store backend.
    store: Arc<dyn NodeStore>,
    /// Tree limits.
    config: VfsConfig,
}

/// Request to create a new node.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateNodeRequest {
    /// Parent node ID (None for root-level).
    pub parent_id: Option<Uuid>,
    /// Node name.
    pub name: String,
    /// Whether the node is a folder.
    pub is_folder: bool,
    /// Initial content (files only; defaults to empty).
    pub content: Option<String>,
}

/// Request to mutate a node: rename, content edit, and/or move.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct UpdateNodeRequest {
    /// New name, if renaming.
    pub name: Option<String>,
    /// New content, if editing.
    pub content: Option<String>,
    /// New parent, if moving: `Some(None)` moves to the root level.
    pub parent_id: Option<Option<Uuid>>,
    /// Optimistic-concurrency token from the last read.
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl NodeService {
    /// Creates a new node service.
    pub fn new(store: Arc<dyn NodeStore>, config: VfsConfig) -> Self {
        Self { store, config }
    }

    /// Lists immediate children of a parent (None = root level) in the
    /// stable order: folders first, then ascending name.
    ///
    /// `cursor` is the opaque continuation token from a previous page. A
    /// token that no longer decodes degrades to the first page rather
    /// than failing the listing.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Page<Node>, AppError> {
        if let Some(parent_id) = parent_id {
            let parent = self.get(ctx, parent_id).await?;
            if !parent.is_folder {
                return Err(AppError::validation("Cannot list children of a file"));
            }
        }

        let cursor = cursor.and_then(|raw| match ListCursor::decode(raw) {
            Ok(cursor) => Some(cursor),
            Err(_) => {
                debug!(user_id = %ctx.user_id, "Undecodable cursor, restarting from first page");
                None
            }
        });
        let page = PageParams::new(cursor, limit.unwrap_or(self.config.default_page_size))
            .clamped(self.config.max_page_size);

        self.store.list_children(ctx.user_id, parent_id, &page).await
    }

    /// Gets a node by ID. Absent and not-owned are the same error.
    pub async fn get(&self, ctx: &RequestContext, node_id: Uuid) -> Result<Node, AppError> {
        self.store
            .find_by_id(ctx.user_id, node_id)
            .await?
            .ok_or_else(|| AppError::not_found("Node not found"))
    }

    /// Creates a new node.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateNodeRequest,
    ) -> Result<Node, AppError> {
        name::validate(&req.name, self.config.max_name_length)?;

        let content = if req.is_folder {
            if req.content.is_some() {
                return Err(AppError::validation("Folders cannot carry content"));
            }
            None
        } else {
            let content = req.content.unwrap_or_default();
            self.check_content_size(&content)?;
            Some(content)
        };

        let node = self
            .store
            .insert(&NewNode {
                owner_id: ctx.user_id,
                parent_id: req.parent_id,
                name: req.name,
                is_folder: req.is_folder,
                content,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            node_id = %node.id,
            name = %node.name,
            is_folder = node.is_folder,
            "Node created"
        );

        Ok(node)
    }

    /// Renames, edits, and/or moves a node.
    ///
    /// Self-parenting is rejected before touching the store; deeper cycle
    /// and depth violations are enforced by the store atomically with the
    /// write and surface as `Cycle`/`Depth` errors.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        node_id: Uuid,
        req: UpdateNodeRequest,
    ) -> Result<Node, AppError> {
        if req.name.is_none() && req.content.is_none() && req.parent_id.is_none() {
            return Err(AppError::validation("No changes requested"));
        }
        if req.parent_id == Some(Some(node_id)) {
            return Err(AppError::cycle("A node cannot be its own parent"));
        }
        if let Some(new_name) = &req.name {
            name::validate(new_name, self.config.max_name_length)?;
        }

        let current = self.get(ctx, node_id).await?;
        if let Some(content) = &req.content {
            if current.is_folder {
                return Err(AppError::validation("Folders cannot carry content"));
            }
            self.check_content_size(content)?;
        }

        let node = self
            .store
            .apply_change(
                ctx.user_id,
                node_id,
                &NodeChange {
                    name: req.name,
                    content: req.content,
                    parent_id: req.parent_id,
                    expected_updated_at: req.expected_updated_at,
                },
            )
            .await?;

        info!(
            user_id = %ctx.user_id,
            node_id = %node.id,
            moved = req.parent_id.is_some(),
            "Node updated"
        );

        Ok(node)
    }

    /// Deletes a node and all its descendants. Destructive and
    /// irreversible; the UI confirms before calling.
    pub async fn delete(&self, ctx: &RequestContext, node_id: Uuid) -> Result<(), AppError> {
        let deleted = self.store.delete(ctx.user_id, node_id).await?;
        if !deleted {
            return Err(AppError::not_found("Node not found"));
        }

        info!(user_id = %ctx.user_id, node_id = %node_id, "Node deleted (with descendants)");
        Ok(())
    }

    fn check_content_size(&self, content: &str) -> Result<(), AppError> {
        if content.len() > self.config.max_content_bytes {
            return Err(AppError::validation(format!(
                "Content exceeds {} bytes",
                self.config.max_content_bytes
            )));
        }
        Ok(())
    }
}
