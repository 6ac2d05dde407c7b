//! Node entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file or folder in the workspace tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Node {
    /// Unique node identifier.
    pub id: Uuid,
    /// The node owner.
    pub owner_id: Uuid,
    /// Parent node ID (null for root-level nodes).
    pub parent_id: Option<Uuid>,
    /// Node name. Never empty, never contains `/`.
    pub name: String,
    /// Whether this node is a folder.
    pub is_folder: bool,
    /// File content. Always `None` for folders, never `None` for files.
    pub content: Option<String>,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Check if this is a root-level node (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Ordering key under the listing order: folders first, then name.
    pub fn sort_key(&self) -> (bool, &str) {
        (!self.is_folder, &self.name)
    }
}

/// Data required to create a new node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNode {
    /// The node owner.
    pub owner_id: Uuid,
    /// Parent node (None for root-level).
    pub parent_id: Option<Uuid>,
    /// Node name.
    pub name: String,
    /// Whether the node is a folder.
    pub is_folder: bool,
    /// File content (None for folders).
    pub content: Option<String>,
}

/// A partial mutation of an existing node.
///
/// `parent_id` is doubly optional: `None` leaves the parent untouched,
/// `Some(None)` moves the node to the root level, `Some(Some(id))` moves it
/// under `id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeChange {
    /// New name, if renaming.
    pub name: Option<String>,
    /// New content, if editing. Rejected for folders.
    pub content: Option<String>,
    /// New parent, if moving.
    pub parent_id: Option<Option<Uuid>>,
    /// Optimistic-concurrency token: when present, the mutation only
    /// applies if the stored `updated_at` still matches, otherwise it
    /// fails with a conflict instead of silently overwriting.
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl NodeChange {
    /// Whether this change mutates anything at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none() && self.parent_id.is_none()
    }

    /// Whether this change re-parents the node.
    pub fn is_move(&self) -> bool {
        self.parent_id.is_some()
    }
}
