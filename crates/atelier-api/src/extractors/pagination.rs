//! Listing query parameters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query parameters for the authenticated child listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Parent node to list (absent = root level).
    pub parent_id: Option<Uuid>,
    /// Opaque continuation cursor from a previous page.
    pub cursor: Option<String>,
    /// Page size (clamped server-side).
    pub limit: Option<u32>,
}

/// Query parameters for public share listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedListingQuery {
    /// Opaque continuation cursor from a previous page.
    pub cursor: Option<String>,
    /// Page size (clamped server-side).
    pub limit: Option<u32>,
}
