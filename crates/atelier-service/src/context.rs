//! Request context carrying the acting principal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Identity issuance lives outside this system; the HTTP layer extracts
/// the principal injected by the upstream gateway and passes it into
/// service methods so every operation knows *who* is acting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
