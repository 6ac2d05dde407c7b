//! Store contracts implemented by every persistence backend.
//!
//! Services depend on these traits, never on a concrete backend, so the
//! Postgres store and the in-memory store are interchangeable. Every
//! method is owner-scoped where a caller identity exists; a node that is
//! absent and a node the owner cannot see produce the same `None`.
//!
//! Structural integrity (acyclicity, depth bound) is part of the
//! contract: `insert` and `apply_change` MUST run the checks from
//! [`crate::node::tree`] atomically with the write, so a concurrent
//! mutation can never slip a cycle between check and commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use atelier_core::result::AppResult;
use atelier_core::types::{Page, PageParams};

use crate::node::{Node, NodeChange, NewNode};
use crate::share::{NewShare, Share};

/// Persistence contract for tree nodes.
#[async_trait]
pub trait NodeStore: Send + Sync + 'static {
    /// Fetch a node by id, scoped to its owner.
    async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Node>>;

    /// List immediate children of `parent_id` (`None` = root level) in the
    /// stable listing order: folders first, then ascending name. The
    /// cursor in `page` is a keyset position; items strictly after it are
    /// returned.
    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        page: &PageParams,
    ) -> AppResult<Page<Node>>;

    /// Insert a new node, enforcing the depth bound and sibling-name
    /// uniqueness atomically with the write.
    async fn insert(&self, data: &NewNode) -> AppResult<Node>;

    /// Apply a partial change (rename, content edit, move), enforcing
    /// acyclicity and the depth bound atomically with the write. A stale
    /// `expected_updated_at` fails with a conflict.
    async fn apply_change(
        &self,
        owner_id: Uuid,
        id: Uuid,
        change: &NodeChange,
    ) -> AppResult<Node>;

    /// Delete a node and, transitively, all descendants. Returns whether
    /// anything was deleted.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool>;

    /// Return the chain from the root down to the node itself (inclusive),
    /// root-first. Returns `None` when the node is absent. A chain that
    /// does not reach a true root is an internal error, never a loop.
    async fn ancestors(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Vec<Node>>>;
}

/// Persistence contract for shares.
#[async_trait]
pub trait ShareStore: Send + Sync + 'static {
    /// Insert a new share. Fails with a conflict when an active share for
    /// the same node already exists.
    async fn insert(&self, data: &NewShare) -> AppResult<Share>;

    /// Fetch a share by id, scoped to its owner.
    async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Share>>;

    /// Fetch the active share for a node, if any.
    async fn find_active_by_node(&self, owner_id: Uuid, node_id: Uuid)
    -> AppResult<Option<Share>>;

    /// Fetch a share by its public token. Validity (active, unexpired) is
    /// the caller's concern; this is a pure lookup.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Share>>;

    /// List shares created by an owner, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Share>>;

    /// Deactivate a share, stamping `expires_at` so every read path
    /// agrees it is gone. Idempotent; returns whether the share existed.
    async fn deactivate(&self, owner_id: Uuid, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;
}
