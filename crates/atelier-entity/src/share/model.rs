//! Share entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A share granting public read access to a node and, for folders, its
/// whole subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Share {
    /// Unique share identifier.
    pub id: Uuid,
    /// The shared node (root of the shared subtree if a folder).
    pub node_id: Uuid,
    /// User who created the share. Always the node owner.
    pub owner_id: Uuid,
    /// The sole public credential. Unguessable, URL-safe, never mutated.
    pub token: String,
    /// Optional display label, independent of the node's name.
    pub title: Option<String>,
    /// Whether the share is currently active. Deactivation is preferred
    /// over deletion so the audit trail survives.
    pub is_active: bool,
    /// When the share expires. `None` means never.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
}

impl Share {
    /// Check if the share is valid at `now`. Expiry is evaluated at read
    /// time; an expired share behaves exactly like a deactivated one.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at > now,
            None => true,
        }
    }
}

/// Data required to create a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShare {
    /// The node being shared.
    pub node_id: Uuid,
    /// The share creator (node owner).
    pub owner_id: Uuid,
    /// Freshly generated token.
    pub token: String,
    /// Optional display label.
    pub title: Option<String>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}
