//! In-memory implementation of the store contracts.
//!
//! Backs the service-level test suites and ephemeral single-process
//! deployments. Semantics mirror the PostgreSQL store exactly: the same
//! integrity functions run under the world write lock, which makes the
//! check and the write atomic; listing uses the same byte ordering the
//! Postgres store gets from `COLLATE "C"`.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use atelier_core::error::AppError;
use atelier_core::result::AppResult;
use atelier_core::types::{ListCursor, Page, PageParams};
use atelier_entity::node::tree;
use atelier_entity::node::{Node, NodeChange, NewNode};
use atelier_entity::share::{NewShare, Share};
use atelier_entity::store::{NodeStore, ShareStore};

#[derive(Debug, Default)]
struct World {
    nodes: HashMap<Uuid, Node>,
    shares: HashMap<Uuid, Share>,
}

/// In-memory store implementing both [`NodeStore`] and [`ShareStore`].
#[derive(Debug)]
pub struct MemoryStore {
    world: RwLock<World>,
    max_depth: usize,
}

impl MemoryStore {
    /// Create an empty store with the given depth bound.
    pub fn new(max_depth: usize) -> Self {
        Self {
            world: RwLock::new(World::default()),
            max_depth,
        }
    }
}

impl World {
    /// Chain from the root down to `id` (inclusive), root-first.
    fn chain_of(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Vec<Node>>> {
        let Some(node) = self.nodes.get(&id).filter(|n| n.owner_id == owner_id) else {
            return Ok(None);
        };

        let mut chain = vec![node.clone()];
        let mut seen = HashSet::from([id]);
        let mut cursor = node.parent_id;
        while let Some(parent_id) = cursor {
            if !seen.insert(parent_id) {
                return Err(AppError::internal(
                    "Ancestor walk revisited a node (cycle in stored tree)",
                ));
            }
            let Some(parent) = self.nodes.get(&parent_id) else {
                return Err(AppError::internal(
                    "Ancestor chain does not reach a root (broken parent link)",
                ));
            };
            chain.push(parent.clone());
            cursor = parent.parent_id;
        }
        chain.reverse();
        tree::ensure_rooted(&chain)?;
        Ok(Some(chain))
    }

    /// Validate a proposed parent: present, owned, and a folder. Returns
    /// its root-first chain.
    fn require_parent(&self, owner_id: Uuid, parent_id: Uuid) -> AppResult<Vec<Node>> {
        let chain = self
            .chain_of(owner_id, parent_id)?
            .ok_or_else(|| AppError::not_found("Parent folder not found"))?;
        if !chain.last().is_some_and(|p| p.is_folder) {
            return Err(AppError::validation("Parent node is not a folder"));
        }
        Ok(chain)
    }

    /// Height of the subtree rooted at `id` (0 for a leaf).
    fn subtree_height(&self, id: Uuid) -> usize {
        self.nodes
            .values()
            .filter(|n| n.parent_id == Some(id))
            .map(|child| 1 + self.subtree_height(child.id))
            .max()
            .unwrap_or(0)
    }

    /// All ids in the subtree rooted at `id`, the root included.
    fn subtree_ids(&self, id: Uuid) -> Vec<Uuid> {
        let mut ids = vec![id];
        let mut i = 0;
        while i < ids.len() {
            let current = ids[i];
            ids.extend(
                self.nodes
                    .values()
                    .filter(|n| n.parent_id == Some(current))
                    .map(|n| n.id),
            );
            i += 1;
        }
        ids
    }

    fn sibling_name_taken(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        exclude: Option<Uuid>,
    ) -> bool {
        self.nodes.values().any(|n| {
            n.owner_id == owner_id
                && n.parent_id == parent_id
                && n.name == name
                && Some(n.id) != exclude
        })
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Node>> {
        let world = self.world.read().expect("store lock poisoned");
        Ok(world
            .nodes
            .get(&id)
            .filter(|n| n.owner_id == owner_id)
            .cloned())
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        page: &PageParams,
    ) -> AppResult<Page<Node>> {
        let world = self.world.read().expect("store lock poisoned");

        let mut children: Vec<Node> = world
            .nodes
            .values()
            .filter(|n| n.owner_id == owner_id && n.parent_id == parent_id)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        if let Some(cursor) = &page.cursor {
            children.retain(|n| n.sort_key() > cursor.sort_key());
        }
        children.truncate(page.limit as usize);

        Ok(Page::new(children, page.limit, |n| ListCursor {
            last_name: n.name.clone(),
            last_is_folder: n.is_folder,
        }))
    }

    async fn insert(&self, data: &NewNode) -> AppResult<Node> {
        let mut world = self.world.write().expect("store lock poisoned");

        let parent_depth = match data.parent_id {
            Some(parent_id) => Some(world.require_parent(data.owner_id, parent_id)?.len() - 1),
            None => None,
        };
        tree::check_depth(parent_depth, 0, self.max_depth)?;

        if world.sibling_name_taken(data.owner_id, data.parent_id, &data.name, None) {
            return Err(AppError::conflict(format!(
                "A sibling named '{}' already exists",
                data.name
            )));
        }

        let now = Utc::now();
        let node = Node {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            is_folder: data.is_folder,
            content: data.content.clone(),
            created_at: now,
            updated_at: now,
        };
        world.nodes.insert(node.id, node.clone());
        Ok(node)
    }

    async fn apply_change(
        &self,
        owner_id: Uuid,
        id: Uuid,
        change: &NodeChange,
    ) -> AppResult<Node> {
        let mut world = self.world.write().expect("store lock poisoned");

        let current = world
            .nodes
            .get(&id)
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Node not found"))?;

        if let Some(expected) = change.expected_updated_at {
            if current.updated_at != expected {
                return Err(AppError::conflict("Node changed since it was last read"));
            }
        }
        if change.content.is_some() && current.is_folder {
            return Err(AppError::validation("Folders cannot carry content"));
        }

        let new_parent_id = match change.parent_id {
            Some(new_parent) => {
                let height = world.subtree_height(id);
                match new_parent {
                    Some(parent_id) => {
                        let chain = world.require_parent(owner_id, parent_id)?;
                        tree::check_move(id, &chain.iter().map(|n| n.id).collect::<Vec<_>>())?;
                        tree::check_depth(Some(chain.len() - 1), height, self.max_depth)?;
                    }
                    None => tree::check_depth(None, height, self.max_depth)?,
                }
                new_parent
            }
            None => current.parent_id,
        };

        let new_name = change.name.clone().unwrap_or_else(|| current.name.clone());
        if world.sibling_name_taken(owner_id, new_parent_id, &new_name, Some(id)) {
            return Err(AppError::conflict(format!(
                "A sibling named '{new_name}' already exists"
            )));
        }

        let node = world.nodes.get_mut(&id).expect("node fetched above");
        node.name = new_name;
        if let Some(content) = &change.content {
            node.content = Some(content.clone());
        }
        node.parent_id = new_parent_id;
        node.updated_at = Utc::now();
        Ok(node.clone())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut world = self.world.write().expect("store lock poisoned");

        if !world
            .nodes
            .get(&id)
            .is_some_and(|n| n.owner_id == owner_id)
        {
            return Ok(false);
        }

        let doomed = world.subtree_ids(id);
        for node_id in &doomed {
            world.nodes.remove(node_id);
        }
        // Mirror the FK cascade: shares die with their node.
        world
            .shares
            .retain(|_, share| !doomed.contains(&share.node_id));
        Ok(true)
    }

    async fn ancestors(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Vec<Node>>> {
        let world = self.world.read().expect("store lock poisoned");
        world.chain_of(owner_id, id)
    }
}

#[async_trait]
impl ShareStore for MemoryStore {
    async fn insert(&self, data: &NewShare) -> AppResult<Share> {
        let mut world = self.world.write().expect("store lock poisoned");

        if world
            .shares
            .values()
            .any(|s| s.node_id == data.node_id && s.is_active)
        {
            return Err(AppError::conflict(
                "An active share already exists for this node",
            ));
        }

        let share = Share {
            id: Uuid::new_v4(),
            node_id: data.node_id,
            owner_id: data.owner_id,
            token: data.token.clone(),
            title: data.title.clone(),
            is_active: true,
            expires_at: data.expires_at,
            created_at: Utc::now(),
        };
        world.shares.insert(share.id, share.clone());
        Ok(share)
    }

    async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Share>> {
        let world = self.world.read().expect("store lock poisoned");
        Ok(world
            .shares
            .get(&id)
            .filter(|s| s.owner_id == owner_id)
            .cloned())
    }

    async fn find_active_by_node(
        &self,
        owner_id: Uuid,
        node_id: Uuid,
    ) -> AppResult<Option<Share>> {
        let world = self.world.read().expect("store lock poisoned");
        Ok(world
            .shares
            .values()
            .find(|s| s.node_id == node_id && s.owner_id == owner_id && s.is_active)
            .cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Share>> {
        let world = self.world.read().expect("store lock poisoned");
        Ok(world.shares.values().find(|s| s.token == token).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Share>> {
        let world = self.world.read().expect("store lock poisoned");
        let mut shares: Vec<Share> = world
            .shares
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(shares)
    }

    async fn deactivate(&self, owner_id: Uuid, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut world = self.world.write().expect("store lock poisoned");
        match world
            .shares
            .get_mut(&id)
            .filter(|s| s.owner_id == owner_id)
        {
            Some(share) => {
                share.is_active = false;
                share.expires_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::error::ErrorKind;

    fn new_node(owner_id: Uuid, parent_id: Option<Uuid>, name: &str, is_folder: bool) -> NewNode {
        NewNode {
            owner_id,
            parent_id,
            name: name.to_string(),
            is_folder,
            content: (!is_folder).then(String::new),
        }
    }

    #[tokio::test]
    async fn test_delete_cascades_to_descendants_and_shares() {
        let store = MemoryStore::new(32);
        let owner = Uuid::new_v4();

        let root = NodeStore::insert(&store, &new_node(owner, None, "root", true))
            .await
            .unwrap();
        let sub = NodeStore::insert(&store, &new_node(owner, Some(root.id), "sub", true))
            .await
            .unwrap();
        let file = NodeStore::insert(&store, &new_node(owner, Some(sub.id), "f.sw", false))
            .await
            .unwrap();

        ShareStore::insert(
            &store,
            &NewShare {
                node_id: sub.id,
                owner_id: owner,
                token: "token-token-token-token0".to_string(),
                title: None,
                expires_at: None,
            },
        )
        .await
        .unwrap();

        assert!(NodeStore::delete(&store, owner, root.id).await.unwrap());
        for id in [root.id, sub.id, file.id] {
            assert!(NodeStore::find_by_id(&store, owner, id).await.unwrap().is_none());
        }
        assert!(
            store
                .find_by_token("token-token-token-token0")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_integrity_checks_are_atomic_with_the_write() {
        let store = MemoryStore::new(32);
        let owner = Uuid::new_v4();

        let a = NodeStore::insert(&store, &new_node(owner, None, "a", true))
            .await
            .unwrap();
        let b = NodeStore::insert(&store, &new_node(owner, Some(a.id), "b", true))
            .await
            .unwrap();

        let err = store
            .apply_change(
                owner,
                a.id,
                &NodeChange {
                    parent_id: Some(Some(b.id)),
                    ..NodeChange::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cycle);

        // The failed move must not have touched the tree.
        let a_after = NodeStore::find_by_id(&store, owner, a.id).await.unwrap().unwrap();
        assert_eq!(a_after.parent_id, None);
    }
}
