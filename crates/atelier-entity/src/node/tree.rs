//! Pure tree-integrity rules.
//!
//! These functions hold the acyclicity and depth invariants in one
//! testable place. Every store backend runs them atomically with the
//! structural write: the Postgres store inside the mutating transaction,
//! the in-memory store under its write lock. A node's *depth* is its hop
//! count to a root (roots sit at depth 0); a subtree's *height* is the
//! hop count from its root to its deepest descendant.

use uuid::Uuid;

use atelier_core::error::AppError;
use atelier_core::result::AppResult;

use super::model::Node;

/// Reject a re-parenting that would make `node_id` its own ancestor.
///
/// `target_ancestors` is the id chain of the proposed parent walking
/// upward to a root (the proposed parent itself included). Setting the
/// parent to the node itself is the degenerate single-element case.
pub fn check_move(node_id: Uuid, target_ancestors: &[Uuid]) -> AppResult<()> {
    if target_ancestors.contains(&node_id) {
        return Err(AppError::cycle(
            "Cannot move a node into itself or one of its descendants",
        ));
    }
    Ok(())
}

/// Reject a placement that would push any node past the depth bound.
///
/// `parent_depth` is the depth of the target parent (`None` when placing
/// at root level), `subtree_height` the height of the subtree being
/// placed (0 for a single node).
pub fn check_depth(
    parent_depth: Option<usize>,
    subtree_height: usize,
    max_depth: usize,
) -> AppResult<()> {
    let new_depth = parent_depth.map_or(0, |d| d + 1);
    if new_depth + subtree_height > max_depth {
        return Err(AppError::depth(format!(
            "Placement would exceed the maximum tree depth of {max_depth}"
        )));
    }
    Ok(())
}

/// Verify that a root-first ancestor chain is complete and contiguous.
///
/// The chain must start at a true root and every link must point at its
/// predecessor. A violation means the store returned a broken chain
/// (orphaned node), which is a consistency violation, not a user error.
pub fn ensure_rooted(chain: &[Node]) -> AppResult<()> {
    let Some(first) = chain.first() else {
        return Err(AppError::internal("Empty ancestor chain"));
    };
    if first.parent_id.is_some() {
        return Err(AppError::internal(
            "Ancestor chain does not reach a root (broken parent link)",
        ));
    }
    for pair in chain.windows(2) {
        if pair[1].parent_id != Some(pair[0].id) {
            return Err(AppError::internal(
                "Ancestor chain is not contiguous (broken parent link)",
            ));
        }
    }
    Ok(())
}
