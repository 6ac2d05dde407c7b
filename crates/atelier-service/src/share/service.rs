//! Share CRUD service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use atelier_core::config::vfs::VfsConfig;
use atelier_core::error::{AppError, ErrorKind};
use atelier_entity::share::{NewShare, Share};
use atelier_entity::store::{NodeStore, ShareStore};

use super::token;
use crate::context::RequestContext;

/// Manages share creation, listing, and revocation.
#[derive(Clone)]
pub struct ShareService {
    /// Node store, for ownership checks.
    node_store: Arc<dyn NodeStore>,
    /// Share store backend.
    share_store: Arc<dyn ShareStore>,
    /// Token length configuration.
    config: VfsConfig,
}

/// Request to create a new share.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateShareRequest {
    /// The node to share.
    pub node_id: Uuid,
    /// Optional display label.
    pub title: Option<String>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        node_store: Arc<dyn NodeStore>,
        share_store: Arc<dyn ShareStore>,
        config: VfsConfig,
    ) -> Self {
        Self {
            node_store,
            share_store,
            config,
        }
    }

    /// Creates a share for a node the caller owns.
    ///
    /// At most one active share exists per node: when a valid one is
    /// already there, it is returned as-is instead of erroring. An active
    /// share that has silently expired is retired and replaced.
    pub async fn create_share(
        &self,
        ctx: &RequestContext,
        req: CreateShareRequest,
    ) -> Result<Share, AppError> {
        self.node_store
            .find_by_id(ctx.user_id, req.node_id)
            .await?
            .ok_or_else(|| AppError::not_found("Node not found"))?;

        let now = Utc::now();
        if req.expires_at.is_some_and(|expires_at| expires_at <= now) {
            return Err(AppError::validation("Share expiry must be in the future"));
        }

        if let Some(existing) = self
            .share_store
            .find_active_by_node(ctx.user_id, req.node_id)
            .await?
        {
            if existing.is_valid(now) {
                info!(
                    user_id = %ctx.user_id,
                    share_id = %existing.id,
                    "Returning existing active share"
                );
                return Ok(existing);
            }
            // Expired but still flagged active: retire it so the fresh
            // share can take the one-active-per-node slot.
            self.share_store
                .deactivate(ctx.user_id, existing.id, now)
                .await?;
        }

        let new_share = NewShare {
            node_id: req.node_id,
            owner_id: ctx.user_id,
            token: token::generate(self.config.share_token_length),
            title: req.title,
            expires_at: req.expires_at,
        };

        let share = match self.share_store.insert(&new_share).await {
            Ok(share) => share,
            // Lost a race to a concurrent create: the winner's share is
            // the one active share for this node, so hand it back.
            Err(e) if e.kind == ErrorKind::Conflict => self
                .share_store
                .find_active_by_node(ctx.user_id, req.node_id)
                .await?
                .ok_or(e)?,
            Err(e) => return Err(e),
        };

        info!(
            user_id = %ctx.user_id,
            share_id = %share.id,
            node_id = %share.node_id,
            "Share created"
        );

        Ok(share)
    }

    /// Lists shares created by the caller, newest first.
    pub async fn list_shares(&self, ctx: &RequestContext) -> Result<Vec<Share>, AppError> {
        self.share_store.list_by_owner(ctx.user_id).await
    }

    /// Gets a share by ID (owner only).
    pub async fn get_share(&self, ctx: &RequestContext, share_id: Uuid) -> Result<Share, AppError> {
        self.share_store
            .find_by_id(ctx.user_id, share_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share not found"))
    }

    /// Revokes (deactivates) a share. Idempotent: revoking an already
    /// inactive share succeeds.
    pub async fn revoke_share(&self, ctx: &RequestContext, share_id: Uuid) -> Result<(), AppError> {
        let existed = self
            .share_store
            .deactivate(ctx.user_id, share_id, Utc::now())
            .await?;
        if !existed {
            return Err(AppError::not_found("Share not found"));
        }

        info!(user_id = %ctx.user_id, share_id = %share_id, "Share revoked");
        Ok(())
    }
}
