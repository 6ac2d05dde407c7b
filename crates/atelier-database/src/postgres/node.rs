//! Node store implementation for PostgreSQL.
//!
//! Structural mutations run inside a transaction holding a per-owner
//! advisory lock, so the integrity walk and the write are atomic: two
//! interleaved moves on the same tree cannot weave a cycle past the
//! check. Listing uses keyset pagination over `(is_folder DESC, name)`
//! with `COLLATE "C"` so SQL ordering matches the in-memory store's byte
//! ordering.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use atelier_core::error::{AppError, ErrorKind};
use atelier_core::result::AppResult;
use atelier_core::types::{ListCursor, Page, PageParams};
use atelier_entity::node::tree;
use atelier_entity::node::{Node, NodeChange, NewNode};
use atelier_entity::store::NodeStore;

/// Sibling-name unique index, violated on duplicate names under one parent.
const SIBLING_NAME_KEY: &str = "nodes_sibling_name_key";

/// Store for node CRUD and tree queries backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgNodeStore {
    pool: PgPool,
    max_depth: usize,
}

impl PgNodeStore {
    /// Create a new node store.
    pub fn new(pool: PgPool, max_depth: usize) -> Self {
        Self { pool, max_depth }
    }

    /// Serialize structural mutations per owner for the duration of the
    /// current transaction.
    async fn lock_tree(tx: &mut Transaction<'_, Postgres>, owner_id: Uuid) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(owner_id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock tree", e))?;
        Ok(())
    }

    /// Walk from `id` up to its root inside the given transaction,
    /// returning the chain root-first (the node itself included).
    async fn chain_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        id: Uuid,
        max_depth: usize,
    ) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            "WITH RECURSIVE chain AS ( \
                SELECT n.*, 0 AS lvl FROM nodes n WHERE n.id = $1 AND n.owner_id = $2 \
                UNION ALL \
                SELECT p.*, c.lvl + 1 FROM nodes p \
                INNER JOIN chain c ON p.id = c.parent_id \
                WHERE c.lvl <= $3 \
             ) SELECT id, owner_id, parent_id, name, is_folder, content, created_at, updated_at \
               FROM chain ORDER BY lvl DESC",
        )
        .bind(id)
        .bind(owner_id)
        .bind(max_depth as i64)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to walk ancestors", e))
    }

    /// Height of the subtree rooted at `id` (0 for a leaf), inside the
    /// given transaction.
    async fn subtree_height_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        max_depth: usize,
    ) -> AppResult<usize> {
        let height: i64 = sqlx::query_scalar(
            "WITH RECURSIVE sub AS ( \
                SELECT id, 0 AS h FROM nodes WHERE id = $1 \
                UNION ALL \
                SELECT n.id, s.h + 1 FROM nodes n \
                INNER JOIN sub s ON n.parent_id = s.id \
                WHERE s.h <= $2 \
             ) SELECT COALESCE(MAX(h), 0)::bigint FROM sub",
        )
        .bind(id)
        .bind(max_depth as i64)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to measure subtree height", e)
        })?;
        Ok(height as usize)
    }

    /// Validate the proposed parent for an insert or move: it must exist,
    /// belong to the owner, and be a folder. Returns its depth.
    async fn require_parent_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        parent_id: Uuid,
        max_depth: usize,
    ) -> AppResult<Vec<Node>> {
        let chain = Self::chain_in_tx(tx, owner_id, parent_id, max_depth).await?;
        let Some(parent) = chain.last() else {
            return Err(AppError::not_found("Parent folder not found"));
        };
        if !parent.is_folder {
            return Err(AppError::validation("Parent node is not a folder"));
        }
        tree::ensure_rooted(&chain)?;
        Ok(chain)
    }

    fn map_insert_error(e: sqlx::Error, name: &str) -> AppError {
        match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(SIBLING_NAME_KEY) => {
                AppError::conflict(format!("A sibling named '{name}' already exists"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to write node", e),
        }
    }
}

#[async_trait]
impl NodeStore for PgNodeStore {
    async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM nodes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find node", e))
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        page: &PageParams,
    ) -> AppResult<Page<Node>> {
        let (cursor_name, cursor_is_folder) = match &page.cursor {
            Some(c) => (Some(c.last_name.clone()), c.last_is_folder),
            None => (None, false),
        };

        let nodes = sqlx::query_as::<_, Node>(
            "SELECT * FROM nodes \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
               AND ($3::text IS NULL \
                    OR (is_folder = FALSE AND $4 = TRUE) \
                    OR (is_folder = $4 AND name COLLATE \"C\" > $3)) \
             ORDER BY is_folder DESC, name COLLATE \"C\" ASC \
             LIMIT $5",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(cursor_name)
        .bind(cursor_is_folder)
        .bind(page.limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))?;

        Ok(Page::new(nodes, page.limit, |n| ListCursor {
            last_name: n.name.clone(),
            last_is_folder: n.is_folder,
        }))
    }

    async fn insert(&self, data: &NewNode) -> AppResult<Node> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        Self::lock_tree(&mut tx, data.owner_id).await?;

        let parent_depth = match data.parent_id {
            Some(parent_id) => {
                let chain =
                    Self::require_parent_in_tx(&mut tx, data.owner_id, parent_id, self.max_depth)
                        .await?;
                Some(chain.len() - 1)
            }
            None => None,
        };
        tree::check_depth(parent_depth, 0, self.max_depth)?;

        let node = sqlx::query_as::<_, Node>(
            "INSERT INTO nodes (owner_id, parent_id, name, is_folder, content) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(data.is_folder)
        .bind(&data.content)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_insert_error(e, &data.name))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit insert", e)
        })?;
        Ok(node)
    }

    async fn apply_change(
        &self,
        owner_id: Uuid,
        id: Uuid,
        change: &NodeChange,
    ) -> AppResult<Node> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        Self::lock_tree(&mut tx, owner_id).await?;

        let current = sqlx::query_as::<_, Node>(
            "SELECT * FROM nodes WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find node", e))?
        .ok_or_else(|| AppError::not_found("Node not found"))?;

        if let Some(expected) = change.expected_updated_at {
            if current.updated_at != expected {
                return Err(AppError::conflict(
                    "Node changed since it was last read",
                ));
            }
        }
        if change.content.is_some() && current.is_folder {
            return Err(AppError::validation("Folders cannot carry content"));
        }

        let new_parent_id = match change.parent_id {
            Some(new_parent) => {
                let height = Self::subtree_height_in_tx(&mut tx, id, self.max_depth).await?;
                match new_parent {
                    Some(parent_id) => {
                        let chain = Self::require_parent_in_tx(
                            &mut tx,
                            owner_id,
                            parent_id,
                            self.max_depth,
                        )
                        .await?;
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
        let new_content = match &change.content {
            Some(content) => Some(content.clone()),
            None => current.content.clone(),
        };

        let node = sqlx::query_as::<_, Node>(
            "UPDATE nodes SET name = $3, content = $4, parent_id = $5, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(&new_name)
        .bind(&new_content)
        .bind(new_parent_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_insert_error(e, &new_name))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit update", e)
        })?;
        Ok(node)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete node", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn ancestors(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Vec<Node>>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        let chain = Self::chain_in_tx(&mut tx, owner_id, id, self.max_depth).await?;
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit read", e)
        })?;

        if chain.is_empty() {
            return Ok(None);
        }
        tree::ensure_rooted(&chain)?;
        Ok(Some(chain))
    }
}
