//! Path resolution: node id to canonical slash-path.

use std::sync::Arc;

use uuid::Uuid;

use atelier_core::error::AppError;
use atelier_entity::node::Node;
use atelier_entity::node::name::SEPARATOR;
use atelier_entity::store::NodeStore;

use crate::context::RequestContext;

/// Resolves canonical paths and breadcrumb trails.
#[derive(Clone)]
pub struct PathService {
    /// Node store backend.
    store: Arc<dyn NodeStore>,
}

impl PathService {
    /// Creates a new path service.
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Resolves the canonical path of a node, root-to-leaf.
    ///
    /// The walk is bounded by the tree's depth invariant and fails fast
    /// on a broken parent link instead of looping.
    pub async fn resolve(&self, ctx: &RequestContext, node_id: Uuid) -> Result<String, AppError> {
        let chain = self.breadcrumbs(ctx, node_id).await?;
        let mut path = String::new();
        for node in &chain {
            path.push(SEPARATOR);
            path.push_str(&node.name);
        }
        Ok(path)
    }

    /// Returns the ancestor chain from the root down to the node itself.
    pub async fn breadcrumbs(
        &self,
        ctx: &RequestContext,
        node_id: Uuid,
    ) -> Result<Vec<Node>, AppError> {
        self.store
            .ancestors(ctx.user_id, node_id)
            .await?
            .ok_or_else(|| AppError::not_found("Node not found"))
    }
}
