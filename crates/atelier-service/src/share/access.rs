//! Public share access — token validation and scope-limited traversal.
//!
//! Everything here is reachable without authentication. All failure
//! modes (unknown token, deactivated, expired, node outside the shared
//! subtree) collapse into the same error so callers learn nothing about
//! what exists beyond the scope they were granted.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use atelier_core::error::AppError;
use atelier_core::types::{ListCursor, Page, PageParams};
use atelier_entity::node::Node;
use atelier_entity::share::Share;
use atelier_entity::store::{NodeStore, ShareStore};

/// A listing served through a share token.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SharedListing {
    /// The share granting access.
    pub share: Share,
    /// The node being viewed (share root or a validated descendant).
    pub node: Node,
    /// Children of the viewed node, when it is a folder.
    pub children: Option<Page<Node>>,
}

/// Handles public share resolution and traversal.
#[derive(Clone)]
pub struct AccessService {
    /// Node store, for subtree lookups.
    node_store: Arc<dyn NodeStore>,
    /// Share store, for token lookups.
    share_store: Arc<dyn ShareStore>,
}

impl AccessService {
    /// Creates a new access service.
    pub fn new(node_store: Arc<dyn NodeStore>, share_store: Arc<dyn ShareStore>) -> Self {
        Self {
            node_store,
            share_store,
        }
    }

    /// Validates a share token and returns the share with its root node.
    ///
    /// Expiry is evaluated here, at read time; an expired share behaves
    /// exactly like a deactivated or unknown one.
    pub async fn resolve(&self, token: &str) -> Result<(Share, Node), AppError> {
        let share = self
            .share_store
            .find_by_token(token)
            .await?
            .filter(|share| share.is_valid(Utc::now()))
            .ok_or_else(Self::invalid)?;

        // The shared node can be gone while the share row survives
        // (deactivation is preferred over deletion). Same outcome.
        let node = self
            .node_store
            .find_by_id(share.owner_id, share.node_id)
            .await?
            .ok_or_else(Self::invalid)?;

        Ok((share, node))
    }

    /// Traverses the shared subtree.
    ///
    /// Without `within_node_id`, returns the shared root (and, for a
    /// folder, its first page of children). With it, the node must prove
    /// descendance from the share root before anything is listed — a
    /// guessed sibling or ancestor id fails exactly like an unknown
    /// token.
    pub async fn traverse(
        &self,
        token: &str,
        within_node_id: Option<Uuid>,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<SharedListing, AppError> {
        let (share, root) = self.resolve(token).await?;

        let node = match within_node_id {
            None => root,
            Some(node_id) if node_id == root.id => root,
            Some(node_id) => {
                let chain = self
                    .node_store
                    .ancestors(share.owner_id, node_id)
                    .await?
                    .ok_or_else(Self::invalid)?;
                if !chain.iter().any(|ancestor| ancestor.id == root.id) {
                    return Err(Self::invalid());
                }
                chain.into_iter().next_back().expect("chain is non-empty")
            }
        };

        let children = if node.is_folder {
            let cursor = cursor.and_then(|raw| ListCursor::decode(raw).ok());
            let page = match limit {
                Some(limit) => PageParams::new(cursor, limit),
                None => PageParams {
                    cursor,
                    ..PageParams::default()
                },
            };
            Some(
                self.node_store
                    .list_children(share.owner_id, Some(node.id), &page)
                    .await?,
            )
        } else {
            None
        };

        Ok(SharedListing {
            share,
            node,
            children,
        })
    }

    fn invalid() -> AppError {
        AppError::share_invalid("Unknown, expired, or out-of-scope share link")
    }
}
